use sqlx::SqlitePool;

/// A directed edge, `user_id` follows `author_id`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Follow {
	pub id: i64,
	pub user_id: i64,
	pub author_id: i64,
}

impl Follow {
	/// Creates the edge unless it already exists. Returns the edge and whether
	/// it was created by this call.
	pub async fn get_or_create(db: &SqlitePool, user_id: i64, author_id: i64) -> Result<(Self, bool), sqlx::Error> {
		let result = sqlx::query(
			r#"
			INSERT INTO follows (
				user_id,
				author_id
			) VALUES (
				?,
				?
			) ON CONFLICT (user_id, author_id) DO NOTHING
			"#,
		)
		.bind(user_id)
		.bind(author_id)
		.execute(db)
		.await?;

		let follow = sqlx::query_as("SELECT * FROM follows WHERE user_id = ? AND author_id = ?")
			.bind(user_id)
			.bind(author_id)
			.fetch_one(db)
			.await?;

		Ok((follow, result.rows_affected() > 0))
	}

	pub async fn delete(db: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
		let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
			.bind(user_id)
			.bind(author_id)
			.execute(db)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	pub async fn exists(db: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
		sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?)")
			.bind(user_id)
			.bind(author_id)
			.fetch_one(db)
			.await
	}

	/// Ids of every author `user_id` follows.
	pub async fn followed_authors(db: &SqlitePool, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
		sqlx::query_scalar("SELECT author_id FROM follows WHERE user_id = ? ORDER BY author_id")
			.bind(user_id)
			.fetch_all(db)
			.await
	}

	pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
		sqlx::query_scalar("SELECT COUNT(*) FROM follows").fetch_one(db).await
	}
}
