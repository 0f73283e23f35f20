use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Selects posts joined with their author and group, the shape [`Post`] is
/// read from. Callers append their own filters and ordering.
pub(super) const SELECT_POSTS: &str = r#"
	SELECT
		posts.id,
		posts.text,
		posts.pub_date,
		posts.author_id,
		users.username AS author_username,
		posts.group_id,
		post_groups.slug AS group_slug,
		post_groups.title AS group_title,
		posts.image
	FROM posts
	INNER JOIN users ON users.id = posts.author_id
	LEFT JOIN post_groups ON post_groups.id = posts.group_id
"#;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub text: String,
	/// Set when the post is created, never changed afterwards.
	pub pub_date: DateTime<Utc>,
	pub author_id: i64,
	pub author_username: String,
	pub group_id: Option<i64>,
	pub group_slug: Option<String>,
	pub group_title: Option<String>,
	/// Path relative to the media root, always under `posts/`.
	pub image: Option<String>,
}

impl std::fmt::Display for Post {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.text)
	}
}

/// The fields a post is created from or updated with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostData {
	pub text: String,
	pub group_id: Option<i64>,
	pub image: Option<String>,
}

impl Post {
	pub async fn create(db: &SqlitePool, author_id: i64, data: &PostData) -> Result<Self, sqlx::Error> {
		Self::create_at(db, author_id, data, Utc::now()).await
	}

	pub async fn create_at(
		db: &SqlitePool,
		author_id: i64,
		data: &PostData,
		pub_date: DateTime<Utc>,
	) -> Result<Self, sqlx::Error> {
		let id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO posts (
				text,
				pub_date,
				author_id,
				group_id,
				image
			) VALUES (
				?,
				?,
				?,
				?,
				?
			) RETURNING id
			"#,
		)
		.bind(&data.text)
		.bind(pub_date)
		.bind(author_id)
		.bind(data.group_id)
		.bind(&data.image)
		.fetch_one(db)
		.await?;

		Self::by_id(db, id).await?.ok_or(sqlx::Error::RowNotFound)
	}

	pub async fn by_id(db: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as(&format!("{SELECT_POSTS} WHERE posts.id = ?"))
			.bind(id)
			.fetch_optional(db)
			.await
	}

	/// Replaces text and group. The image is only replaced when `data`
	/// carries a new one. `pub_date` is left untouched.
	pub async fn update(db: &SqlitePool, id: i64, data: &PostData) -> Result<Option<Self>, sqlx::Error> {
		let result = sqlx::query(
			r#"
			UPDATE posts
			SET
				text = ?,
				group_id = ?,
				image = COALESCE(?, image)
			WHERE id = ?
			"#,
		)
		.bind(&data.text)
		.bind(data.group_id)
		.bind(&data.image)
		.bind(id)
		.execute(db)
		.await?;

		if result.rows_affected() == 0 {
			return Ok(None);
		}

		Self::by_id(db, id).await
	}

	/// Deletes the post. Its comments are kept with a cleared post reference.
	pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
		let result = sqlx::query("DELETE FROM posts WHERE id = ?").bind(id).execute(db).await?;
		Ok(result.rows_affected() > 0)
	}

	pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
		sqlx::query_scalar("SELECT COUNT(*) FROM posts").fetch_one(db).await
	}

	pub async fn count_by_author(db: &SqlitePool, author_id: i64) -> Result<i64, sqlx::Error> {
		sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ?")
			.bind(author_id)
			.fetch_one(db)
			.await
	}
}
