use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct User {
	/// The unique identifier for the user.
	pub id: i64,
	/// The username of the user, unique.
	pub username: String,
	/// The time the user was created.
	#[serde(skip)]
	pub created_at: DateTime<Utc>,
}

impl User {
	pub async fn create(db: &SqlitePool, username: &str) -> Result<Self, sqlx::Error> {
		sqlx::query_as(
			r#"
			INSERT INTO users (
				username,
				created_at
			) VALUES (
				?,
				?
			) RETURNING *
			"#,
		)
		.bind(username)
		.bind(Utc::now())
		.fetch_one(db)
		.await
	}

	pub async fn get_or_create(db: &SqlitePool, username: &str) -> Result<Self, sqlx::Error> {
		match Self::by_username(db, username).await? {
			Some(user) => Ok(user),
			None => Self::create(db, username).await,
		}
	}

	pub async fn by_id(db: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as("SELECT * FROM users WHERE id = ?")
			.bind(id)
			.fetch_optional(db)
			.await
	}

	pub async fn by_username(db: &SqlitePool, username: &str) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as("SELECT * FROM users WHERE username = ?")
			.bind(username)
			.fetch_optional(db)
			.await
	}

	/// Removes the user together with their posts, comments and follow edges.
	pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
		let result = sqlx::query("DELETE FROM users WHERE id = ?").bind(id).execute(db).await?;
		Ok(result.rows_affected() > 0)
	}
}
