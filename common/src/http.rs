use std::fmt::{Debug, Display};
use std::panic::Location;

use hyper::header::{CONTENT_TYPE, LOCATION};
use hyper::{Body, Response, StatusCode};
use routerify::RequestInfo;
use serde_json::json;

/// Builds a JSON response from anything implementing `Display`, usually a
/// `serde_json::Value`.
#[macro_export]
macro_rules! make_response {
	($status:expr, $body:expr) => {
		hyper::Response::builder()
			.status($status)
			.header(hyper::header::CONTENT_TYPE, "application/json")
			.body(hyper::Body::from($body.to_string()))
			.expect("failed to build response")
	};
}

/// A `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> Response<Body> {
	let mut res = Response::new(Body::from(json!({ "redirect": location }).to_string()));
	*res.status_mut() = StatusCode::FOUND;

	match location.parse() {
		Ok(value) => {
			res.headers_mut().insert(LOCATION, value);
		}
		Err(err) => {
			tracing::warn!(location, error = %err, "redirect location is not a valid header value");
			*res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
		}
	}

	res.headers_mut()
		.insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static("application/json"));
	res
}

/// Error handler for `routerify::RouterBuilder::err_handler_with_info`.
pub async fn error_handler<E: std::error::Error + 'static>(
	err: Box<(dyn std::error::Error + Send + Sync + 'static)>,
	info: RequestInfo,
) -> Response<Body> {
	match err.downcast::<RouteError<E>>() {
		Ok(err) => {
			let location = err.location();

			err.span().in_scope(|| match err.should_log() {
				ShouldLog::Yes => {
					tracing::error!(path = %info.uri(), method = %info.method(), location = %location, error = ?err, "request failed")
				}
				ShouldLog::Debug => {
					tracing::debug!(path = %info.uri(), method = %info.method(), location = %location, error = ?err, "request failed")
				}
				ShouldLog::No => (),
			});

			err.response()
		}
		Err(err) => {
			tracing::error!(path = %info.uri(), method = %info.method(), error = ?err, "unhandled error");
			make_response!(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "internal_server_error" }))
		}
	}
}

/// A finished response that short circuits a handler, with an optional
/// source error kept around for logging.
pub struct RouteError<E> {
	source: Option<E>,
	location: &'static Location<'static>,
	span: tracing::Span,
	response: Response<Body>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldLog {
	Yes,
	Debug,
	No,
}

impl<E> RouteError<E> {
	pub fn span(&self) -> &tracing::Span {
		&self.span
	}

	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	pub fn status(&self) -> StatusCode {
		self.response.status()
	}

	pub fn response(self) -> Response<Body> {
		self.response
	}

	pub fn should_log(&self) -> ShouldLog {
		if self.response.status().is_server_error() {
			ShouldLog::Yes
		} else if self.source.is_some() {
			ShouldLog::Debug
		} else {
			ShouldLog::No
		}
	}

	pub fn with_source(mut self, source: Option<E>) -> Self {
		self.source = source;
		self
	}

	pub fn with_location(mut self, location: &'static Location<'static>) -> Self {
		self.location = location;
		self
	}

	#[track_caller]
	fn new(response: Response<Body>, source: Option<E>) -> Self {
		Self {
			source,
			span: tracing::Span::current(),
			location: Location::caller(),
			response,
		}
	}
}

impl<E> From<Response<Body>> for RouteError<E> {
	#[track_caller]
	fn from(res: Response<Body>) -> Self {
		Self::new(res, None)
	}
}

impl<E, S: AsRef<str>> From<(StatusCode, S)> for RouteError<E> {
	#[track_caller]
	fn from((status, message): (StatusCode, S)) -> Self {
		Self::new(make_response!(status, json!({ "error": message.as_ref() })), None)
	}
}

impl<E, S: AsRef<str>, T> From<(StatusCode, S, T)> for RouteError<E>
where
	T: Into<E>,
{
	#[track_caller]
	fn from((status, message, source): (StatusCode, S, T)) -> Self {
		Self::new(make_response!(status, json!({ "error": message.as_ref() })), Some(source.into()))
	}
}

impl<E: Debug> Debug for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError({}): {:?}", self.response.status(), err),
			None => write!(f, "RouteError({})", self.response.status()),
		}
	}
}

impl<E: Display> Display for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "{}: {}", self.response.status(), err),
			None => write!(f, "{}", self.response.status()),
		}
	}
}

impl<E: std::error::Error + 'static> std::error::Error for RouteError<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source.as_ref().map(|err| err as &(dyn std::error::Error + 'static))
	}
}

pub mod ext {
	use std::panic::Location;
	use std::sync::{Arc, Weak};

	use hyper::StatusCode;

	use super::RouteError;

	pub trait ResultExt<T, E, E2>: Sized {
		/// Replaces the error with the response built from `ctx`, keeping the
		/// original error as the source.
		fn map_err_route<C>(self, ctx: C) -> Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
			E2: From<E>;

		fn map_ignore_err_route<C>(self, ctx: C) -> Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>;
	}

	impl<T, E, E2> ResultExt<T, E, E2> for Result<T, E> {
		#[track_caller]
		fn map_err_route<C>(self, ctx: C) -> Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
			E2: From<E>,
		{
			let location = Location::caller();
			self.map_err(|err| {
				RouteError::from(ctx)
					.with_source(Some(err.into()))
					.with_location(location)
			})
		}

		#[track_caller]
		fn map_ignore_err_route<C>(self, ctx: C) -> Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
		{
			let location = Location::caller();
			self.map_err(|_| RouteError::from(ctx).with_location(location))
		}
	}

	pub trait OptionExt<T, E>: Sized {
		fn map_err_route<C>(self, ctx: C) -> Result<T, RouteError<E>>
		where
			RouteError<E>: From<C>;
	}

	impl<T, E> OptionExt<T, E> for Option<T> {
		#[track_caller]
		fn map_err_route<C>(self, ctx: C) -> Result<T, RouteError<E>>
		where
			RouteError<E>: From<C>,
		{
			let location = Location::caller();
			self.ok_or_else(|| RouteError::from(ctx).with_location(location))
		}
	}

	pub trait RequestGlobalExt<E> {
		/// Fetches the global state stored as router data.
		fn get_global<G: Sync + Send + 'static>(&self) -> Result<Arc<G>, RouteError<E>>;
	}

	impl<E, B> RequestGlobalExt<E> for hyper::Request<B>
	where
		Self: routerify::ext::RequestExt,
	{
		#[track_caller]
		fn get_global<G: Sync + Send + 'static>(&self) -> Result<Arc<G>, RouteError<E>> {
			use routerify::ext::RequestExt;

			self.data::<Weak<G>>()
				.and_then(Weak::upgrade)
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "global state unavailable"))
		}
	}
}
