//! Server configuration, read from `LIBRARY_*` environment variables.

use serde::Deserialize;

/// Runtime configuration.
///
/// - `LIBRARY_DATABASE_URL`: sqlite url (falls back to `DATABASE_URL`)
/// - `LIBRARY_HOST` / `LIBRARY_PORT`: bind address (default `0.0.0.0:8080`)
/// - `LIBRARY_MAX_CONNECTIONS`: pool size (default 5)
/// - `LIBRARY_ACQUIRE_TIMEOUT`: seconds to wait for a pooled connection (default 3)
/// - `LIBRARY_SEED_DEMO`: load the demo catalog on startup (default false)
/// - `LIBRARY_SESSION_COOKIE`: name of the session cookie
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub database_url: Option<String>,

	#[serde(default = "default_host")]
	pub host: String,

	#[serde(default = "default_port")]
	pub port: u16,

	#[serde(default = "default_max_connections")]
	pub max_connections: u32,

	#[serde(default = "default_acquire_timeout")]
	pub acquire_timeout: u64,

	#[serde(default)]
	pub seed_demo: bool,

	#[serde(default = "default_session_cookie")]
	pub session_cookie: String,
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	8080
}

fn default_max_connections() -> u32 {
	5
}

fn default_acquire_timeout() -> u64 {
	3
}

fn default_session_cookie() -> String {
	"library_session".to_string()
}

const DEFAULT_DATABASE_URL: &str = "sqlite://library.db";

impl Config {
	/// Loads `.env` if present, then reads the prefixed variables.
	pub fn from_env() -> Result<Self, envy::Error> {
		dotenvy::dotenv().ok();
		let mut config = envy::prefixed("LIBRARY_").from_env::<Config>()?;
		if config.database_url.is_none() {
			config.database_url = std::env::var("DATABASE_URL").ok();
		}
		Ok(config)
	}

	pub fn database_url(&self) -> &str {
		self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
	}

	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_url: None,
			host: default_host(),
			port: default_port(),
			max_connections: default_max_connections(),
			acquire_timeout: default_acquire_timeout(),
			seed_demo: false,
			session_cookie: default_session_cookie(),
		}
	}
}
