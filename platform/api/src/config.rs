use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use common::config::{CliSource, LoggingConfig};

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
/// Yatube, a small blogging service
pub struct AppConfig {
	/// The config file that was loaded, if any
	#[serde(skip)]
	pub config_file: Option<String>,

	/// Name of this instance
	pub name: String,

	/// When set, create this user if needed, print a bearer token for them and exit
	pub issue_token: Option<String>,

	/// The logging config
	pub logging: LoggingConfig,

	/// API Config
	pub api: ApiConfig,

	/// Database Config
	pub database: DatabaseConfig,

	/// JWT Config
	pub jwt: JwtConfig,

	/// Response cache config
	pub cache: CacheConfig,

	/// Uploaded media config
	pub media: MediaConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,

	/// Upper bound of pooled connections
	pub max_connections: u32,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "sqlite://yatube.db".to_string(),
			max_connections: 8,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct JwtConfig {
	/// JWT secret
	pub secret: String,

	/// JWT issuer
	pub issuer: String,

	/// Seconds an issued token stays valid, 0 for no expiry
	pub token_lifetime: u64,
}

impl Default for JwtConfig {
	fn default() -> Self {
		Self {
			secret: "yatube".to_string(),
			issuer: "yatube".to_string(),
			token_lifetime: 60 * 60 * 24 * 30,
		}
	}
}

impl JwtConfig {
	pub fn token_lifetime(&self) -> Option<Duration> {
		(self.token_lifetime > 0).then(|| Duration::from_secs(self.token_lifetime))
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CacheConfig {
	/// Seconds a rendered index page is served from memory, 0 disables the cache
	pub index_ttl: u64,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self { index_ttl: 20 }
	}
}

impl CacheConfig {
	pub fn index_ttl(&self) -> Duration {
		Duration::from_secs(self.index_ttl)
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct MediaConfig {
	/// Directory uploaded files are stored under
	pub root: PathBuf,

	/// Largest accepted image upload, in bytes
	pub max_image_size: u64,
}

impl Default for MediaConfig {
	fn default() -> Self {
		Self {
			root: PathBuf::from("media"),
			max_image_size: 5 * 1024 * 1024,
		}
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			config_file: None,
			name: "yatube-api".to_string(),
			issue_token: None,
			logging: LoggingConfig::default(),
			api: ApiConfig::default(),
			database: DatabaseConfig::default(),
			jwt: JwtConfig::default(),
			cache: CacheConfig::default(),
			media: MediaConfig::default(),
		}
	}
}

impl AppConfig {
	pub const DEFAULT_CONFIG_FILE: &'static str = "config.toml";

	pub fn parse(cli: CliSource) -> Result<Self, common::config::ConfigError> {
		let (mut config, config_file) = common::config::parse::<Self>(Some(cli), Some(Self::DEFAULT_CONFIG_FILE))?;

		config.config_file = config_file;

		Ok(config)
	}
}
