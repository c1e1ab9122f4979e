//! Error types for the tracker runtime and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Why an entity lookup produced no record.
///
/// The loader logs these and leaves the slot loading; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
	/// The service answered with a non-success status.
	#[error("lookup returned status {0}")]
	Status(u16),

	/// The request could not be completed (connect, timeout, body read).
	#[error("transport error: {0}")]
	Transport(String),

	/// The body was not a valid entity record.
	#[error("invalid entity record: {0}")]
	Decode(String),

	/// The id is not known to the fetcher.
	#[error("no entity with id {0}")]
	NotFound(u64),
}

/// Errors from reading the location feed.
#[derive(Debug, Error)]
pub enum FeedError {
	/// Reading from the underlying stream failed.
	#[error("feed I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value parsed but is not usable.
	#[error("invalid {field}: {reason}")]
	Invalid {
		/// Dotted key of the offending field.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

/// Errors from the presentation-facing tracker handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackerError {
	/// The reducer has stopped; no further events are accepted.
	#[error("tracker stopped")]
	Stopped,

	/// The event queue is full; the request was not enqueued.
	#[error("tracker event queue full")]
	Busy,
}

impl From<sithwatch_worker::ActorSendError> for TrackerError {
	fn from(err: sithwatch_worker::ActorSendError) -> Self {
		match err {
			sithwatch_worker::ActorSendError::Closed => Self::Stopped,
			sithwatch_worker::ActorSendError::Full => Self::Busy,
		}
	}
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
