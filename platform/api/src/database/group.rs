use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct Group {
	pub id: i64,
	pub title: String,
	pub slug: String,
	pub description: String,
}

impl std::fmt::Display for Group {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.title)
	}
}

impl Group {
	pub const MAX_TITLE_LENGTH: usize = 200;

	pub async fn create(db: &SqlitePool, title: &str, slug: &str, description: &str) -> Result<Self, sqlx::Error> {
		sqlx::query_as(
			r#"
			INSERT INTO post_groups (
				title,
				slug,
				description
			) VALUES (
				?,
				?,
				?
			) RETURNING *
			"#,
		)
		.bind(title)
		.bind(slug)
		.bind(description)
		.fetch_one(db)
		.await
	}

	pub async fn by_id(db: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as("SELECT * FROM post_groups WHERE id = ?")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	pub async fn by_slug(db: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as("SELECT * FROM post_groups WHERE slug = ?")
			.bind(slug)
			.fetch_optional(db)
			.await
	}

	/// All groups, as offered in the post form.
	pub async fn all(db: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
		sqlx::query_as("SELECT * FROM post_groups ORDER BY title, id").fetch_all(db).await
	}

	/// Deletes the group, its posts stay and lose their group.
	pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
		let result = sqlx::query("DELETE FROM post_groups WHERE id = ?")
			.bind(id)
			.execute(db)
			.await?;
		Ok(result.rows_affected() > 0)
	}
}
