use std::sync::Arc;

use common::http::RouteError;
use hyper::http::header;
use hyper::Body;
use routerify::prelude::RequestExt as _;
use routerify::Middleware;

use crate::api::auth::{AuthData, AuthError};
use crate::api::error::ApiError;
use crate::api::ext::RequestExt as _;
use crate::api::request_context::RequestContext;
use crate::global::GlobalState;

/// Resolves the `Authorization` header into the request context. A request
/// without the header stays anonymous, a bad token fails the request.
pub fn auth_middleware(_: &Arc<GlobalState>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::pre(|req| async move {
		req.set_context(RequestContext::default());

		let Some(token) = req.headers().get(header::AUTHORIZATION) else {
			return Ok(req);
		};

		let global = req.get_global()?;

		let token = token.to_str().map_err(|_| AuthError::HeaderToStr)?;
		let auth = AuthData::from_header(&global.db, &global.config.jwt, token).await?;

		tracing::trace!(user_id = auth.user_id(), "authenticated request");
		req.set_context(RequestContext { auth: Some(auth) });

		Ok(req)
	})
}
