use common::http::RouteError;

use super::auth::AuthError;
use crate::media::MediaError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("failed to read http body: {0}")]
	ReadHttpBody(#[from] hyper::Error),
	#[error("failed to parse multipart body: {0}")]
	Multipart(#[from] multer::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("media error: {0}")]
	Media(#[from] MediaError),
	#[error("auth error: {0}")]
	Auth(#[from] AuthError),
}
