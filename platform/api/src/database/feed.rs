use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::post::SELECT_POSTS;
use super::{Follow, Post};
use crate::pagination::{Page, Paginator};

/// Which posts a feed shows. Every feed is ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
	All,
	Group(i64),
	Author(i64),
	/// Posts by any of the listed authors. An empty list matches nothing.
	Authors(Vec<i64>),
}

impl Feed {
	/// The feed of authors followed by `user_id`.
	pub async fn following(db: &SqlitePool, user_id: i64) -> Result<Self, sqlx::Error> {
		Ok(Self::Authors(Follow::followed_authors(db, user_id).await?))
	}

	fn push_filter<'a>(&'a self, query: &mut QueryBuilder<'a, Sqlite>) {
		match self {
			Self::All => {}
			Self::Group(group_id) => {
				query.push(" WHERE posts.group_id = ").push_bind(*group_id);
			}
			Self::Author(author_id) => {
				query.push(" WHERE posts.author_id = ").push_bind(*author_id);
			}
			Self::Authors(author_ids) => {
				query.push(" WHERE posts.author_id IN (");
				let mut ids = query.separated(", ");
				for id in author_ids {
					ids.push_bind(*id);
				}
				ids.push_unseparated(")");
			}
		}
	}

	fn is_empty(&self) -> bool {
		matches!(self, Self::Authors(ids) if ids.is_empty())
	}

	pub async fn count(&self, db: &SqlitePool) -> Result<i64, sqlx::Error> {
		if self.is_empty() {
			return Ok(0);
		}

		let mut query = QueryBuilder::new("SELECT COUNT(*) FROM posts");
		self.push_filter(&mut query);
		query.build_query_scalar().fetch_one(db).await
	}

	pub async fn fetch(&self, db: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Post>, sqlx::Error> {
		if self.is_empty() {
			return Ok(Vec::new());
		}

		let mut query = QueryBuilder::new(SELECT_POSTS);
		self.push_filter(&mut query);
		query
			.push(" ORDER BY posts.pub_date DESC, posts.id DESC LIMIT ")
			.push_bind(limit)
			.push(" OFFSET ")
			.push_bind(offset);

		query.build_query_as().fetch_all(db).await
	}

	/// Resolves the raw `?page=` value against the feed and loads that page.
	pub async fn page(&self, db: &SqlitePool, paginator: Paginator, page: Option<&str>) -> Result<Page<Post>, sqlx::Error> {
		let count = self.count(db).await?;
		let window = paginator.window(count, page);
		let posts = self.fetch(db, window.limit, window.offset).await?;

		Ok(window.into_page(posts))
	}
}
