use bytes::Bytes;
use common::http::ext::{OptionExt, ResultExt};
use common::make_response;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;
use serde_json::json;

use super::error::Result;
use super::ext::RequestExt;
use super::full_path;
use super::views::{PostView, UserView};
use crate::database::{Feed, Follow, Group, User};
use crate::global::CachedResponse;

const DATABASE_ERROR: (StatusCode, &str) = (StatusCode::INTERNAL_SERVER_ERROR, "failed to query posts");

/// Every post, newest first. Whole responses are cached per path and query.
#[tracing::instrument(skip_all, fields(path = %req.uri()))]
pub async fn index(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;

	let key = full_path(&req);
	if let Some(cached) = global.index_cache.get(&key) {
		tracing::trace!("serving cached index");
		return Ok(cached_response(cached));
	}

	let page = Feed::All
		.page(&global.db, global.paginator, req.query_param("page").as_deref())
		.await
		.map_err_route(DATABASE_ERROR)?;

	let cached = CachedResponse {
		status: StatusCode::OK,
		body: Bytes::from(json!({ "page_obj": page.map(PostView::from) }).to_string()),
	};
	global.index_cache.insert(key, cached.clone());
	tracing::trace!(entries = global.index_cache.len(), "cached index");

	Ok(cached_response(cached))
}

fn cached_response(cached: CachedResponse) -> Response<Body> {
	let mut res = Response::new(Body::from(cached.body));
	*res.status_mut() = cached.status;
	res.headers_mut()
		.insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static("application/json"));
	res
}

pub async fn group_posts(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;

	let slug = req.param("slug").map_err_route((StatusCode::NOT_FOUND, "not_found"))?;
	let group = Group::by_slug(&global.db, slug)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query group"))?
		.map_err_route((StatusCode::NOT_FOUND, "not_found"))?;

	let page = Feed::Group(group.id)
		.page(&global.db, global.paginator, req.query_param("page").as_deref())
		.await
		.map_err_route(DATABASE_ERROR)?;

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"group": group,
			"page_obj": page.map(PostView::from),
		})
	))
}

/// An author's posts, with whether the requester follows them.
#[tracing::instrument(skip_all, fields(username = req.param("username").map(String::as_str)))]
pub async fn profile(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;
	let context = req.request_context();

	let username = req.param("username").map_err_route((StatusCode::NOT_FOUND, "not_found"))?;
	let author = User::by_username(&global.db, username)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query user"))?
		.map_err_route((StatusCode::NOT_FOUND, "not_found"))?;

	let page = Feed::Author(author.id)
		.page(&global.db, global.paginator, req.query_param("page").as_deref())
		.await
		.map_err_route(DATABASE_ERROR)?;

	let posts_count = page.count;
	let following = match context.auth() {
		Some(auth) => Follow::exists(&global.db, auth.user_id(), author.id)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query follows"))?,
		None => false,
	};

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"author": UserView::from(&author),
			"posts_count": posts_count,
			"following": following,
			"page_obj": page.map(PostView::from),
		})
	))
}

/// Posts by the authors the requester follows. Anonymous requesters get an
/// empty page.
pub async fn follow_index(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;
	let context = req.request_context();

	let feed = match context.auth() {
		Some(auth) => Feed::following(&global.db, auth.user_id())
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query follows"))?,
		None => Feed::Authors(Vec::new()),
	};

	let page = feed
		.page(&global.db, global.paginator, req.query_param("page").as_deref())
		.await
		.map_err_route(DATABASE_ERROR)?;

	Ok(make_response!(StatusCode::OK, json!({ "page_obj": page.map(PostView::from) })))
}
