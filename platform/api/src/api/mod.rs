use std::sync::Arc;

use common::http::{redirect, RouteError};
use common::make_response;
use hyper::server::conn::Http;
use hyper::{Body, Request, Response, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use serde_json::json;
use tokio::net::TcpSocket;
use tokio::select;

use self::error::{ApiError, Result};
use crate::global::GlobalState;

pub mod auth;
pub mod error;
pub mod ext;
mod feeds;
mod follow;
pub mod form;
pub mod jwt;
mod media;
mod middleware;
mod posts;
pub mod request_context;
pub mod views;

/// `/auth/login/?next=<next>`, keeping slashes in `next` readable.
pub fn login_redirect(next: &str) -> Response<Body> {
	let next = urlencoding::encode(next).replace("%2F", "/");
	redirect(&format!("/auth/login/?next={next}"))
}

pub fn profile_path(username: &str) -> String {
	format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_path(id: i64) -> String {
	format!("/posts/{id}/")
}

/// Path and query of the request, as used for `next` and cache keys.
fn full_path(req: &Request<Body>) -> String {
	req.uri()
		.path_and_query()
		.map(|path| path.as_str().to_string())
		.unwrap_or_else(|| req.uri().path().to_string())
}

async fn not_found(_: Request<Body>) -> Result<Response<Body>> {
	Ok(make_response!(StatusCode::NOT_FOUND, json!({ "error": "not_found" })))
}

pub fn routes(global: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		.err_handler_with_info(common::http::error_handler::<ApiError>)
		// Sets the optional identity on every request, bad tokens are rejected here.
		.middleware(middleware::auth::auth_middleware(global))
		.get("/", feeds::index)
		.get("/group/:slug/", feeds::group_posts)
		.get("/profile/:username/", feeds::profile)
		.post("/profile/:username/follow/", follow::profile_follow)
		.post("/profile/:username/unfollow/", follow::profile_unfollow)
		.get("/follow/", feeds::follow_index)
		.get("/posts/:id/", posts::post_detail)
		.get("/create/", posts::post_create)
		.post("/create/", posts::post_create)
		.get("/posts/:id/edit/", posts::post_edit)
		.post("/posts/:id/edit/", posts::post_edit)
		.post("/posts/:id/comment/", posts::add_comment)
		.get("/media/posts/:file", media::post_image)
		.any(not_found)
		.build()
		.expect("failed to build router")
}

pub async fn run(global: Arc<GlobalState>) -> anyhow::Result<()> {
	let bind_address = global.config.api.bind_address;

	tracing::info!("listening on {}", bind_address);
	let socket = if bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(bind_address)?;
	let listener = socket.listen(1024)?;

	// The router only holds a weak reference to the global state, so open
	// keep-alive connections do not keep it alive past shutdown.
	let request_service = RequestServiceBuilder::new(routes(&global)).map_err(|err| anyhow::anyhow!("{err}"))?;

	loop {
		select! {
			_ = global.ctx().done() => {
				tracing::info!("api shutting down");
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let service = request_service.build(addr);

				tracing::debug!("accepted connection from {}", addr);

				tokio::spawn(async move {
					if let Err(err) = Http::new().serve_connection(socket, service).await {
						tracing::debug!(error = %err, "connection closed with error");
					}
				});
			},
		}
	}
}
