use std::sync::Arc;

use common::http::ext::RequestGlobalExt;
use hyper::{Body, Request};
use routerify::prelude::RequestExt as _;

use super::error::Result;
use super::request_context::RequestContext;
use crate::global::GlobalState;

pub trait RequestExt {
	fn get_global(&self) -> Result<Arc<GlobalState>>;

	/// The identity resolved by the auth middleware, anonymous when unset.
	fn request_context(&self) -> RequestContext;

	/// A route parameter parsed as a numeric id.
	fn param_id(&self, name: &str) -> Option<i64>;

	/// The first value of a query string parameter.
	fn query_param(&self, name: &str) -> Option<String>;
}

impl RequestExt for Request<Body> {
	fn get_global(&self) -> Result<Arc<GlobalState>> {
		RequestGlobalExt::get_global(self)
	}

	fn request_context(&self) -> RequestContext {
		self.context::<RequestContext>().unwrap_or_default()
	}

	fn param_id(&self, name: &str) -> Option<i64> {
		self.param(name)?.parse().ok()
	}

	fn query_param(&self, name: &str) -> Option<String> {
		let query = self.uri().query()?;
		url::form_urlencoded::parse(query.as_bytes())
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.into_owned())
	}
}
