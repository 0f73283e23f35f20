use common::http::ext::OptionExt;
use common::http::RouteError;
use file_format::FileFormat;
use hyper::header::{CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;

use super::error::{ApiError, Result};
use super::ext::RequestExt;
use crate::media::MediaError;

/// Serves a stored post image.
pub async fn post_image(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;

	let file = req.param("file").map_err_route((StatusCode::NOT_FOUND, "not_found"))?;

	let data = match global.media.read_post_image(file).await {
		Ok(data) => data,
		Err(err @ (MediaError::NotFound(_) | MediaError::InvalidName(_))) => {
			return Err(RouteError::from((StatusCode::NOT_FOUND, "not_found", ApiError::Media(err))));
		}
		Err(err) => {
			return Err(RouteError::from((
				StatusCode::INTERNAL_SERVER_ERROR,
				"failed to read image",
				ApiError::Media(err),
			)));
		}
	};

	let format = FileFormat::from_bytes(&data);

	Response::builder()
		.status(StatusCode::OK)
		.header(CONTENT_TYPE, format.media_type())
		.header(CACHE_CONTROL, "public, max-age=86400")
		.body(Body::from(data))
		.map_err(|_| RouteError::from((StatusCode::INTERNAL_SERVER_ERROR, "failed to build response")))
}
