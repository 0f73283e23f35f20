use std::sync::Arc;
use std::time::Duration;

use common::context::Handler;
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use hyper::{Body, Client, Method, Request, Response, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use super::global::{mock_config, mock_global_state};
use crate::api;
use crate::api::jwt::AuthJwtPayload;
use crate::config::AppConfig;
use crate::database::User;
use crate::global::GlobalState;

mod follow;
mod media;
mod posts;

/// Smallest valid GIF.
const GIF: &[u8] = &[
	0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04, 0x01, 0x0a, 0x00, 0x01,
	0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x4c, 0x01, 0x00, 0x3b,
];

/// A running API server on a free port, backed by an in-memory database.
struct TestServer {
	global: Arc<GlobalState>,
	handler: Handler,
	handle: JoinHandle<anyhow::Result<()>>,
	client: Client<HttpConnector>,
	_media: TempDir,
}

impl TestServer {
	async fn start() -> Self {
		Self::start_with(|_| {}).await
	}

	async fn start_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
		let media = tempfile::tempdir().expect("failed to create media dir");
		let mut config = mock_config(media.path());
		configure(&mut config);

		let (global, handler) = mock_global_state(config).await;

		let handle = tokio::spawn(api::run(global.clone()));

		// We need to wait for the server to start
		tokio::time::sleep(Duration::from_millis(300)).await;

		Self {
			global,
			handler,
			handle,
			client: Client::new(),
			_media: media,
		}
	}

	async fn user(&self, username: &str) -> (User, String) {
		let user = User::create(&self.global.db, username).await.expect("failed to create user");
		let token = AuthJwtPayload::new(&self.global.config.jwt, user.id)
			.serialize(&self.global.config.jwt)
			.expect("failed to sign token");
		(user, token)
	}

	fn url(&self, path: &str) -> String {
		format!("http://{}{}", self.global.config.api.bind_address, path)
	}

	async fn send(&self, method: Method, path: &str, token: Option<&str>, content_type: Option<&str>, body: Body) -> Response<Body> {
		let mut req = Request::builder().method(method).uri(self.url(path));
		if let Some(token) = token {
			req = req.header(AUTHORIZATION, format!("Bearer {token}"));
		}
		if let Some(content_type) = content_type {
			req = req.header(CONTENT_TYPE, content_type);
		}

		self.client
			.request(req.body(body).expect("failed to build request"))
			.await
			.expect("failed to send request")
	}

	async fn get(&self, path: &str, token: Option<&str>) -> Response<Body> {
		self.send(Method::GET, path, token, None, Body::empty()).await
	}

	async fn post_form(&self, path: &str, token: Option<&str>, fields: &[(&str, &str)]) -> Response<Body> {
		let body = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(fields)
			.finish();

		self.send(
			Method::POST,
			path,
			token,
			Some("application/x-www-form-urlencoded"),
			Body::from(body),
		)
		.await
	}

	async fn post_multipart(
		&self,
		path: &str,
		token: Option<&str>,
		fields: &[(&str, &str)],
		file: Option<(&str, &str, &[u8])>,
	) -> Response<Body> {
		const BOUNDARY: &str = "yatube-test-boundary";

		let mut body = Vec::new();
		for (name, value) in fields {
			body.extend_from_slice(
				format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
			);
		}
		if let Some((name, file_name, data)) = file {
			body.extend_from_slice(
				format!(
					"--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
				)
				.as_bytes(),
			);
			body.extend_from_slice(data);
			body.extend_from_slice(b"\r\n");
		}
		body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

		self.send(
			Method::POST,
			path,
			token,
			Some(format!("multipart/form-data; boundary={BOUNDARY}").as_str()),
			Body::from(body),
		)
		.await
	}

	async fn shutdown(self) {
		let Self {
			global,
			handler,
			handle,
			client,
			_media,
		} = self;

		// The client uses Keep-Alive, so we need to drop it to release the global context
		drop(client);
		drop(global);

		tokio::time::timeout(Duration::from_secs(1), handler.cancel())
			.await
			.expect("failed to cancel context");

		tokio::time::timeout(Duration::from_secs(1), handle)
			.await
			.expect("api did not stop")
			.expect("api task panicked")
			.expect("api returned an error");
	}
}

async fn json_body(res: Response<Body>) -> Value {
	let bytes = hyper::body::to_bytes(res.into_body()).await.expect("failed to read body");
	serde_json::from_slice(&bytes).expect("body is not json")
}

#[track_caller]
fn assert_redirect(res: &Response<Body>, location: &str) {
	assert_eq!(res.status(), StatusCode::FOUND);
	assert_eq!(res.headers()[LOCATION], location);
}

/// The `text` of every post on a feed page.
fn page_texts(body: &Value) -> Vec<String> {
	body["page_obj"]["object_list"]
		.as_array()
		.expect("page has no object list")
		.iter()
		.map(|post| post["text"].as_str().expect("post has no text").to_string())
		.collect()
}
