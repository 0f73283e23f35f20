use common::http::ext::{OptionExt, ResultExt};
use common::http::redirect;
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;

use super::error::Result;
use super::ext::RequestExt;
use super::{full_path, profile_path};
use crate::database::{Follow, User};
use crate::global::GlobalState;

async fn load_author(global: &GlobalState, req: &Request<Body>) -> Result<User> {
	let username = req.param("username").map_err_route((StatusCode::NOT_FOUND, "not_found"))?;

	User::by_username(&global.db, username)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query user"))?
		.map_err_route((StatusCode::NOT_FOUND, "not_found"))
}

/// Follows the author. Following twice, or following yourself, changes nothing.
pub async fn profile_follow(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;
	let auth = req.request_context().require_auth(&full_path(&req))?.clone();
	let author = load_author(&global, &req).await?;

	if author.id != auth.user_id() {
		let (_, created) = Follow::get_or_create(&global.db, auth.user_id(), author.id)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to follow author"))?;

		tracing::debug!(user_id = auth.user_id(), author_id = author.id, created, "follow");
	}

	Ok(redirect(&profile_path(&author.username)))
}

pub async fn profile_unfollow(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;
	let auth = req.request_context().require_auth(&full_path(&req))?.clone();
	let author = load_author(&global, &req).await?;

	let deleted = Follow::delete(&global.db, auth.user_id(), author.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to unfollow author"))?;

	tracing::debug!(user_id = auth.user_id(), author_id = author.id, deleted, "unfollow");

	Ok(redirect(&profile_path(&author.username)))
}
