use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::Value;
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::logging;

/// Prefix of every environment variable read by [`parse`].
///
/// Nested keys are separated by `__`, so `YATUBE_API__BIND_ADDRESS` sets
/// `api.bind_address`.
pub const ENV_PREFIX: &str = "YATUBE_";

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("config file not found: {0}")]
	MissingFile(String),
	#[error("invalid override for {key}: {reason}")]
	Override { key: String, reason: String },
	#[error("failed to load config: {0}")]
	Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
	fn from(err: figment::Error) -> Self {
		Self::Figment(Box::new(err))
	}
}

/// Values supplied on the command line, applied above every other source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliSource {
	/// Explicit config file, it is an error if it does not exist.
	pub config_file: Option<String>,

	/// Dotted key paths and their values.
	pub values: Vec<(String, Value)>,
}

impl CliSource {
	/// Sets `key` to `value` as is, without parsing it.
	pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.values.push((key.into(), value.into()));
		self
	}

	/// Parses `key=value` pairs, as given to a repeated `--set` flag. Values
	/// are typed the way TOML would type them, falling back to strings.
	pub fn with_assignments<'a>(mut self, assignments: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
		for assignment in assignments {
			let (key, raw) = assignment.split_once('=').ok_or_else(|| ConfigError::Override {
				key: assignment.to_string(),
				reason: "expected KEY=VALUE".to_string(),
			})?;
			let key = key.trim().to_string();
			let value = raw.parse::<Value>().map_err(|err| ConfigError::Override {
				key: key.clone(),
				reason: err.to_string(),
			})?;
			self.values.push((key, value));
		}

		Ok(self)
	}
}

/// Loads `C` from, lowest priority first: `C::default()`, a TOML file, the
/// `YATUBE_*` environment and the command line.
///
/// `default_file` is only read when it exists. Returns the config together
/// with the canonical path of the file that was loaded, if any.
pub fn parse<C>(cli: Option<CliSource>, default_file: Option<&str>) -> Result<(C, Option<String>), ConfigError>
where
	C: Default + Serialize + DeserializeOwned,
{
	let cli = cli.unwrap_or_default();

	let mut figment = Figment::from(Serialized::defaults(C::default()));

	let explicit_file = cli
		.config_file
		.clone()
		.or_else(|| std::env::var(format!("{ENV_PREFIX}CONFIG_FILE")).ok());

	let config_file = match (explicit_file, default_file) {
		(Some(path), _) => {
			if !Path::new(&path).is_file() {
				return Err(ConfigError::MissingFile(path));
			}
			Some(path)
		}
		(None, Some(path)) if Path::new(path).is_file() => Some(path.to_string()),
		(None, Some(path)) => {
			tracing::debug!(path, "config file not present, using defaults");
			None
		}
		(None, None) => None,
	};

	if let Some(path) = &config_file {
		figment = figment.merge(Toml::file(path));
	}

	figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

	for (key, value) in cli.values {
		figment = figment.merge(Serialized::default(&key, value));
	}

	let config = figment.extract()?;

	let config_file = config_file.map(|path| match std::fs::canonicalize(&path) {
		Ok(canonical) => canonical.display().to_string(),
		Err(_) => path,
	});

	Ok((config, config_file))
}
