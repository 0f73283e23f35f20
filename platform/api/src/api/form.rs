use std::collections::{BTreeMap, HashMap};

use bytes::{Bytes, BytesMut};
use common::http::ext::ResultExt;
use common::http::RouteError;
use hyper::body::HttpBody;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Request, StatusCode};
use multer::{Constraints, SizeLimit};
use sqlx::SqlitePool;

use super::error::{ApiError, Result};
use crate::database::{Group, PostData};
use crate::media;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Largest text field, and largest urlencoded body.
pub const MAX_FIELD_SIZE: u64 = 64 * 1024;

/// Field name to error messages, serialized in field order.
pub type FormErrors = BTreeMap<&'static str, Vec<String>>;

/// An uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
	pub file_name: Option<String>,
	pub data: Bytes,
}

/// A submitted form body, either urlencoded or multipart.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawForm {
	pub fields: HashMap<String, String>,
	pub files: HashMap<String, Upload>,
}

impl RawForm {
	/// Reads the body of `req`. Multipart bodies may carry the files named in
	/// `file_fields`, each at most `max_file_size` bytes.
	pub async fn from_request(req: Request<Body>, file_fields: &[&'static str], max_file_size: u64) -> Result<Self> {
		let content_type = req
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default()
			.to_owned();

		if content_type.starts_with("multipart/form-data") {
			Self::from_multipart(req.into_body(), &content_type, file_fields, max_file_size).await
		} else {
			let body = read_limited(req.into_body(), MAX_FIELD_SIZE).await?;
			Ok(Self::from_urlencoded(&body))
		}
	}

	pub fn from_urlencoded(body: &[u8]) -> Self {
		let mut fields = HashMap::new();
		for (key, value) in url::form_urlencoded::parse(body) {
			fields.entry(key.into_owned()).or_insert_with(|| value.into_owned());
		}

		Self {
			fields,
			files: HashMap::new(),
		}
	}

	async fn from_multipart(body: Body, content_type: &str, file_fields: &[&'static str], max_file_size: u64) -> Result<Self> {
		let boundary =
			multer::parse_boundary(content_type).map_ignore_err_route((StatusCode::BAD_REQUEST, "invalid content-type header"))?;

		let mut limits = SizeLimit::new().per_field(MAX_FIELD_SIZE);
		for field in file_fields {
			limits = limits.for_field(*field, max_file_size);
		}

		let mut multipart = multer::Multipart::with_constraints(body, boundary, Constraints::new().size_limit(limits));
		let mut form = Self::default();

		while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
			let Some(name) = field.name().map(str::to_owned) else {
				continue;
			};

			if file_fields.contains(&name.as_str()) {
				let file_name = field.file_name().map(str::to_owned);
				let data = field.bytes().await.map_err(multipart_error)?;

				// Browsers send an empty part for a file input left blank.
				if data.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
					continue;
				}

				form.files.entry(name).or_insert(Upload { file_name, data });
			} else {
				let value = field.text().await.map_err(multipart_error)?;
				form.fields.entry(name).or_insert(value);
			}
		}

		Ok(form)
	}

	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields.get(name).map(String::as_str)
	}
}

/// Collects `body`, failing with 413 once it grows past `limit` bytes.
async fn read_limited(mut body: Body, limit: u64) -> Result<Bytes> {
	let too_large = || RouteError::from((StatusCode::PAYLOAD_TOO_LARGE, "request body is too large"));

	if body.size_hint().lower() > limit {
		return Err(too_large());
	}

	let mut buf = BytesMut::new();
	while let Some(chunk) = body.data().await {
		let chunk = chunk.map_err_route((StatusCode::BAD_REQUEST, "failed to read request body"))?;
		if (buf.len() + chunk.len()) as u64 > limit {
			return Err(too_large());
		}
		buf.extend_from_slice(&chunk);
	}

	Ok(buf.freeze())
}

#[track_caller]
fn multipart_error(err: multer::Error) -> RouteError<ApiError> {
	match err {
		multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
			RouteError::from((StatusCode::PAYLOAD_TOO_LARGE, "uploaded file is too large", err))
		}
		err => RouteError::from((StatusCode::BAD_REQUEST, "invalid multipart body", err)),
	}
}

/// The create and edit post form.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PostForm {
	pub text: String,
	pub group: Option<String>,
	pub image: Option<Upload>,
}

/// A [`PostForm`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPostForm {
	pub text: String,
	pub group_id: Option<i64>,
	pub image: Option<Upload>,
}

impl ValidPostForm {
	/// The data to persist, `image` being the stored path of the upload.
	pub fn into_post_data(self, image: Option<String>) -> PostData {
		PostData {
			text: self.text,
			group_id: self.group_id,
			image,
		}
	}
}

impl PostForm {
	pub const FILE_FIELDS: &'static [&'static str] = &["image"];

	pub fn from_raw(mut raw: RawForm) -> Self {
		Self {
			text: raw.fields.remove("text").unwrap_or_default(),
			group: raw.fields.remove("group").filter(|group| !group.trim().is_empty()),
			image: raw.files.remove("image"),
		}
	}

	/// The outer error is a failed group lookup, the inner one the field
	/// errors to show with the form.
	pub async fn validate(
		self,
		db: &SqlitePool,
	) -> std::result::Result<std::result::Result<ValidPostForm, (Self, FormErrors)>, sqlx::Error> {
		let mut errors = FormErrors::new();

		let text = self.text.trim();
		if text.is_empty() {
			errors.entry("text").or_default().push(REQUIRED.to_string());
		}

		let mut group_id = None;
		if let Some(group) = &self.group {
			let group = match group.trim().parse::<i64>() {
				Ok(id) => Group::by_id(db, id).await?,
				Err(_) => None,
			};

			match group {
				Some(group) => group_id = Some(group.id),
				None => errors.entry("group").or_default().push(INVALID_CHOICE.to_string()),
			}
		}

		if let Some(image) = &self.image {
			if !media::is_image(&image.data) {
				errors.entry("image").or_default().push(INVALID_IMAGE.to_string());
			}
		}

		if !errors.is_empty() {
			return Ok(Err((self, errors)));
		}

		Ok(Ok(ValidPostForm {
			text: text.to_string(),
			group_id,
			image: self.image,
		}))
	}
}

/// The comment form, only a required text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommentForm {
	pub text: String,
}

impl CommentForm {
	pub fn from_raw(mut raw: RawForm) -> Self {
		Self {
			text: raw.fields.remove("text").unwrap_or_default(),
		}
	}

	pub fn validate(&self) -> std::result::Result<&str, FormErrors> {
		let text = self.text.trim();
		if text.is_empty() {
			return Err(FormErrors::from([("text", vec![REQUIRED.to_string()])]));
		}

		Ok(text)
	}
}
