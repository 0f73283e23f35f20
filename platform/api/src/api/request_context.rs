use common::http::RouteError;

use super::auth::AuthData;
use super::error::ApiError;
use super::login_redirect;

/// Per request state set by the middlewares.
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
	pub auth: Option<AuthData>,
}

impl RequestContext {
	pub fn auth(&self) -> Option<&AuthData> {
		self.auth.as_ref()
	}

	/// The requester, or a redirect to the login page that returns to `next`.
	#[track_caller]
	pub fn require_auth(&self, next: &str) -> Result<&AuthData, RouteError<ApiError>> {
		self.auth.as_ref().ok_or_else(|| RouteError::from(login_redirect(next)))
	}
}
