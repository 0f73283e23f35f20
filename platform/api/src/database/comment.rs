use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Comment {
	pub id: i64,
	/// Cleared when the post is deleted.
	pub post_id: Option<i64>,
	pub author_id: i64,
	pub author_username: String,
	pub text: String,
	pub created: DateTime<Utc>,
}

impl std::fmt::Display for Comment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.text)
	}
}

const SELECT_COMMENTS: &str = r#"
	SELECT
		comments.id,
		comments.post_id,
		comments.author_id,
		users.username AS author_username,
		comments.text,
		comments.created
	FROM comments
	INNER JOIN users ON users.id = comments.author_id
"#;

impl Comment {
	pub async fn create(db: &SqlitePool, post_id: i64, author_id: i64, text: &str) -> Result<Self, sqlx::Error> {
		let id: i64 = sqlx::query_scalar(
			r#"
			INSERT INTO comments (
				post_id,
				author_id,
				text,
				created
			) VALUES (
				?,
				?,
				?,
				?
			) RETURNING id
			"#,
		)
		.bind(post_id)
		.bind(author_id)
		.bind(text)
		.bind(Utc::now())
		.fetch_one(db)
		.await?;

		Self::by_id(db, id).await?.ok_or(sqlx::Error::RowNotFound)
	}

	pub async fn by_id(db: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as(&format!("{SELECT_COMMENTS} WHERE comments.id = ?"))
			.bind(id)
			.fetch_optional(db)
			.await
	}

	/// Comments of a post, newest first.
	pub async fn for_post(db: &SqlitePool, post_id: i64) -> Result<Vec<Self>, sqlx::Error> {
		sqlx::query_as(&format!(
			"{SELECT_COMMENTS} WHERE comments.post_id = ? ORDER BY comments.created DESC, comments.id DESC"
		))
		.bind(post_id)
		.fetch_all(db)
		.await
	}
}
