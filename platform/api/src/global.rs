use bytes::Bytes;
use common::cache::TtlCache;
use common::context::Context;
use hyper::StatusCode;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::media::MediaStore;
use crate::pagination::Paginator;

/// A rendered response kept by the index cache.
#[derive(Debug, Clone)]
pub struct CachedResponse {
	pub status: StatusCode,
	pub body: Bytes,
}

pub struct GlobalState {
	pub config: AppConfig,
	pub db: SqlitePool,
	pub ctx: Context,
	pub media: MediaStore,
	pub paginator: Paginator,
	/// Full responses of the index feed, keyed by path and query.
	pub index_cache: TtlCache<String, CachedResponse>,
}

impl GlobalState {
	pub fn new(config: AppConfig, db: SqlitePool, ctx: Context) -> Self {
		Self {
			media: MediaStore::new(config.media.root.clone()),
			index_cache: TtlCache::new(config.cache.index_ttl()),
			paginator: Paginator::default(),
			config,
			db,
			ctx,
		}
	}

	pub fn ctx(&self) -> &Context {
		&self.ctx
	}
}
