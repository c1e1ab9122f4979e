//! Tracker configuration.
//!
//! Configuration is written in TOML. Every key is optional:
//!
//! ```toml
//! seed = 3616
//!
//! [fetch]
//! base_url = "http://localhost:3000"
//! timeout_ms = 10000
//!
//! [feed]
//! path = "/tmp/location.ndjson"
//!
//! [runtime]
//! mailbox_capacity = 256
//! event_buffer = 64
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sithwatch_core::{DEFAULT_SEED, EntityId};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration for one tracker activation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
	/// Entity loaded into position 0 on activation.
	pub seed: EntityId,
	pub fetch: FetchConfig,
	pub feed: FeedConfig,
	pub runtime: RuntimeConfig,
}

/// Entity lookup service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
	/// Service root; records are read from `{base_url}/dark-jedis/{id}`.
	pub base_url: String,
	/// Per-request timeout in milliseconds.
	pub timeout_ms: u64,
}

/// Location feed settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
	/// Newline-delimited JSON source. Standard input when absent.
	pub path: Option<PathBuf>,
}

/// Queue sizing for the reducer actor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
	/// Capacity of the ordered event queue.
	pub mailbox_capacity: usize,
	/// Capacity of the change-notification broadcast buffer.
	pub event_buffer: usize,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			seed: DEFAULT_SEED,
			fetch: FetchConfig::default(),
			feed: FeedConfig::default(),
			runtime: RuntimeConfig::default(),
		}
	}
}

impl Default for FetchConfig {
	fn default() -> Self {
		Self {
			base_url: "http://localhost:3000".to_string(),
			timeout_ms: 10_000,
		}
	}
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			mailbox_capacity: 256,
			event_buffer: 64,
		}
	}
}

impl FetchConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	/// Parses `base_url`.
	pub fn base_url(&self) -> ConfigResult<Url> {
		let url = Url::parse(&self.base_url).map_err(|err| ConfigError::Invalid {
			field: "fetch.base_url",
			reason: err.to_string(),
		})?;
		if url.cannot_be_a_base() {
			return Err(ConfigError::Invalid {
				field: "fetch.base_url",
				reason: format!("{url} cannot be used as a base URL"),
			});
		}
		Ok(url)
	}
}

impl TrackerConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	/// Checks values that parse but cannot drive a tracker.
	pub fn validate(&self) -> ConfigResult<()> {
		self.fetch.base_url()?;
		if self.fetch.timeout_ms == 0 {
			return Err(ConfigError::Invalid {
				field: "fetch.timeout_ms",
				reason: "must be greater than zero".into(),
			});
		}
		if self.runtime.mailbox_capacity == 0 {
			return Err(ConfigError::Invalid {
				field: "runtime.mailbox_capacity",
				reason: "must be greater than zero".into(),
			});
		}
		if self.runtime.event_buffer == 0 {
			return Err(ConfigError::Invalid {
				field: "runtime.event_buffer",
				reason: "must be greater than zero".into(),
			});
		}
		Ok(())
	}
}
