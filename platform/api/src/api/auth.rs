use common::http::RouteError;
use hyper::StatusCode;
use sqlx::SqlitePool;

use super::error::ApiError;
use super::jwt::AuthJwtPayload;
use crate::config::JwtConfig;
use crate::database::User;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("token must be ascii only")]
	HeaderToStr,
	#[error("token must be a bearer token")]
	NotBearerToken,
	#[error("invalid token")]
	InvalidToken,
	#[error("user not found")]
	UserNotFound,
	#[error("failed to fetch user")]
	FetchUser,
}

impl From<AuthError> for RouteError<ApiError> {
	#[track_caller]
	fn from(value: AuthError) -> Self {
		RouteError::from(match &value {
			AuthError::HeaderToStr | AuthError::NotBearerToken | AuthError::InvalidToken | AuthError::UserNotFound => {
				(StatusCode::UNAUTHORIZED, "invalid authentication token")
			}
			AuthError::FetchUser => (StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch user"),
		})
		.with_source(Some(ApiError::Auth(value)))
	}
}

/// The authenticated requester.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthData {
	pub user: User,
}

impl AuthData {
	/// Resolves the user behind the value of an `Authorization` header.
	pub async fn from_header(db: &SqlitePool, config: &JwtConfig, header: &str) -> Result<Self, AuthError> {
		let token = header.strip_prefix("Bearer ").ok_or(AuthError::NotBearerToken)?;

		let jwt = AuthJwtPayload::verify(config, token.trim()).ok_or(AuthError::InvalidToken)?;

		let user = User::by_id(db, jwt.user_id)
			.await
			.map_err(|err| {
				tracing::error!(error = %err, "failed to fetch user");
				AuthError::FetchUser
			})?
			.ok_or(AuthError::UserNotFound)?;

		Ok(Self { user })
	}

	pub fn user_id(&self) -> i64 {
		self.user.id
	}
}
