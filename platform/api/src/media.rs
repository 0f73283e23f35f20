use std::io::ErrorKind;
use std::path::PathBuf;

use file_format::{FileFormat, Kind};
use tokio::io::AsyncWriteExt;

/// Directory under the media root that post images live in.
pub const POSTS_PREFIX: &str = "posts";

const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
	#[error("invalid file name: {0}")]
	InvalidName(String),
	#[error("file not found: {0}")]
	NotFound(String),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

/// Stores post images on disk, below `<root>/posts/`.
#[derive(Debug, Clone)]
pub struct MediaStore {
	root: PathBuf,
}

/// Whether `data` looks like an image file.
pub fn is_image(data: &[u8]) -> bool {
	FileFormat::from_bytes(data).kind() == Kind::Image
}

/// Keeps `[A-Za-z0-9._-]`, turns everything else into `_` and drops leading
/// dots. Returns `None` when nothing usable is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
	let name = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);

	let sanitized: String = name
		.chars()
		.map(|c| match c {
			'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
			_ => '_',
		})
		.collect();

	let sanitized = sanitized.trim_start_matches('.');
	if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
		return None;
	}

	let mut sanitized = sanitized.to_string();
	if sanitized.len() > MAX_NAME_LENGTH {
		let (stem, ext) = split_extension(&sanitized);
		let ext = ext.map(|ext| format!(".{ext}")).unwrap_or_default();
		sanitized = format!("{}{ext}", &stem[..MAX_NAME_LENGTH.saturating_sub(ext.len()).min(stem.len())]);
	}

	Some(sanitized)
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
	match name.rsplit_once('.') {
		Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
		_ => (name, None),
	}
}

impl MediaStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Writes a post image and returns its path relative to the root, e.g.
	/// `posts/cat.png`. Taken names get a unique suffix, existing files are
	/// never overwritten.
	pub async fn save_post_image(&self, file_name: Option<&str>, data: &[u8]) -> Result<String, MediaError> {
		let dir = self.root.join(POSTS_PREFIX);
		tokio::fs::create_dir_all(&dir).await?;

		let format = FileFormat::from_bytes(data);
		let name = file_name
			.and_then(sanitize_file_name)
			.unwrap_or_else(|| format!("image.{}", format.extension()));

		let mut candidate = name.clone();
		loop {
			let file = tokio::fs::OpenOptions::new()
				.write(true)
				.create_new(true)
				.open(dir.join(&candidate))
				.await;

			match file {
				Ok(mut file) => {
					file.write_all(data).await?;
					file.flush().await?;

					tracing::debug!(name = %candidate, size = data.len(), "stored post image");
					return Ok(format!("{POSTS_PREFIX}/{candidate}"));
				}
				Err(err) if err.kind() == ErrorKind::AlreadyExists => {
					let (stem, ext) = split_extension(&name);
					let suffix = ulid::Ulid::new().to_string().to_lowercase();
					candidate = match ext {
						Some(ext) => format!("{stem}_{}.{ext}", &suffix[suffix.len() - 7..]),
						None => format!("{stem}_{}", &suffix[suffix.len() - 7..]),
					};
				}
				Err(err) => return Err(err.into()),
			}
		}
	}

	/// Reads a stored post image by its bare file name.
	pub async fn read_post_image(&self, file_name: &str) -> Result<Vec<u8>, MediaError> {
		if sanitize_file_name(file_name).as_deref() != Some(file_name) {
			return Err(MediaError::InvalidName(file_name.to_string()));
		}

		match tokio::fs::read(self.root.join(POSTS_PREFIX).join(file_name)).await {
			Ok(data) => Ok(data),
			Err(err) if err.kind() == ErrorKind::NotFound => Err(MediaError::NotFound(file_name.to_string())),
			Err(err) => Err(err.into()),
		}
	}
}
