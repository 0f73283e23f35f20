use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;

mod comment;
mod feed;
mod follow;
mod group;
mod post;
mod user;

pub use comment::*;
pub use feed::*;
pub use follow::*;
pub use group::*;
pub use post::*;
pub use user::*;

/// Opens the pool and brings the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(&config.uri)?
		.create_if_missing(true)
		.foreign_keys(true);

	let mut pool = SqlitePoolOptions::new().max_connections(config.max_connections.max(1));

	// Every connection to an in-memory database sees its own empty database.
	if config.uri.contains(":memory:") {
		pool = pool.max_connections(1).idle_timeout(None).max_lifetime(None);
	}

	let pool = pool.connect_with(options).await?;

	sqlx::migrate!("./migrations").run(&pool).await?;

	Ok(pool)
}
