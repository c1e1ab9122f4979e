//! Runtime for the lineage tracker.
//!
//! A [`Tracker`] owns one reducer actor that applies window events and
//! location updates strictly in arrival order. After every change it
//! recomputes the warning vector, publishes a [`TrackerSnapshot`] for
//! on-demand reads, broadcasts [`TrackerEvent`]s and lets the loader issue
//! fetches for newly `Loading` positions. While any warning is up no new fetch
//! is issued.
//!
//! Collaborators plug in through [`EntityFetcher`] and [`LocationFeed`];
//! [`HttpEntityFetcher`] (feature `http`) and [`NdjsonLocationFeed`] are the
//! default adapters.

mod actor;
pub mod config;
mod error;
mod feed;
mod fetch;
mod loader;
mod tracker;

pub use actor::{TrackerCommand, TrackerEvent, TrackerSnapshot};
pub use config::{FeedConfig, FetchConfig, RuntimeConfig, TrackerConfig};
pub use error::{ConfigError, ConfigResult, FeedError, FetchError, TrackerError};
pub use feed::{LocationFeed, NdjsonLocationFeed};
#[cfg(feature = "http")]
pub use fetch::HttpEntityFetcher;
pub use fetch::{EntityFetcher, StaticEntityFetcher};
pub use tracker::{STOP_GRACE, Tracker};
