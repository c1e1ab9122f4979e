//! Location feed sources and the pump that forwards them to the reducer.

use async_trait::async_trait;
use sithwatch_core::Planet;
use sithwatch_worker::{MailboxSender, TaskClass};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::actor::TrackerCommand;
use crate::error::FeedError;

/// Live source of the monitored subject's location.
///
/// `Ok(None)` means the feed has ended; the last reported location stays in
/// effect. Channel receivers end once every sender is dropped.
#[async_trait]
pub trait LocationFeed: Send + 'static {
	async fn next_location(&mut self) -> Result<Option<Planet>, FeedError>;
}

#[async_trait]
impl<T> LocationFeed for Box<T>
where
	T: LocationFeed + ?Sized,
{
	async fn next_location(&mut self) -> Result<Option<Planet>, FeedError> {
		(**self).next_location().await
	}
}

#[async_trait]
impl LocationFeed for mpsc::UnboundedReceiver<Planet> {
	async fn next_location(&mut self) -> Result<Option<Planet>, FeedError> {
		Ok(self.recv().await)
	}
}

#[async_trait]
impl LocationFeed for mpsc::Receiver<Planet> {
	async fn next_location(&mut self) -> Result<Option<Planet>, FeedError> {
		Ok(self.recv().await)
	}
}

/// Reads one `{"id": .., "name": ..}` record per line.
///
/// Blank lines are ignored. Lines that do not parse are logged and skipped,
/// so one bad record never ends the feed.
pub struct NdjsonLocationFeed<R> {
	lines: Lines<R>,
	line_no: u64,
}

impl<R> NdjsonLocationFeed<R>
where
	R: AsyncBufRead + Unpin + Send + 'static,
{
	pub fn new(reader: R) -> Self {
		Self {
			lines: reader.lines(),
			line_no: 0,
		}
	}
}

#[async_trait]
impl<R> LocationFeed for NdjsonLocationFeed<R>
where
	R: AsyncBufRead + Unpin + Send + 'static,
{
	async fn next_location(&mut self) -> Result<Option<Planet>, FeedError> {
		while let Some(line) = self.lines.next_line().await? {
			self.line_no += 1;
			let record = line.trim();
			if record.is_empty() {
				continue;
			}
			match serde_json::from_str::<Planet>(record) {
				Ok(planet) => return Ok(Some(planet)),
				Err(error) => tracing::warn!(line = self.line_no, %error, "tracker.feed.malformed"),
			}
		}
		Ok(None)
	}
}

/// Forwards every feed value into the reducer mailbox until the feed ends,
/// fails, the mailbox closes or `cancel` fires.
pub(crate) fn spawn_feed_pump<F>(mut feed: F, mailbox: MailboxSender<TrackerCommand>, cancel: CancellationToken) -> JoinHandle<()>
where
	F: LocationFeed,
{
	sithwatch_worker::spawn(TaskClass::Feed, async move {
		loop {
			let next = tokio::select! {
				biased;
				_ = cancel.cancelled() => break,
				next = feed.next_location() => next,
			};
			match next {
				Ok(Some(planet)) => {
					tracing::trace!(planet = planet.id, "tracker.feed.location");
					if mailbox.send(TrackerCommand::Location(planet)).await.is_err() {
						break;
					}
				}
				Ok(None) => {
					tracing::debug!("tracker.feed.ended");
					break;
				}
				Err(error) => {
					tracing::warn!(%error, "tracker.feed.failed");
					break;
				}
			}
		}
	})
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use pretty_assertions::assert_eq;
	use sithwatch_worker::Mailbox;

	use super::*;

	fn planet(id: u64, name: &str) -> Planet {
		Planet { id, name: name.to_string() }
	}

	#[tokio::test]
	async fn ndjson_feed_skips_blank_and_malformed_lines() {
		let input: &[u8] = b"{\"id\":7,\"name\":\"Coruscant\"}\n\n   \nnot json\n{\"id\":8}\n{\"id\":9,\"name\":\"Tatooine\"}\n";
		let mut feed = NdjsonLocationFeed::new(input);
		assert_eq!(feed.next_location().await.expect("readable"), Some(planet(7, "Coruscant")));
		assert_eq!(feed.next_location().await.expect("readable"), Some(planet(9, "Tatooine")));
		assert_eq!(feed.next_location().await.expect("readable"), None);
	}

	#[tokio::test]
	async fn ndjson_feed_accepts_a_final_line_without_newline() {
		let input: &[u8] = b"{\"id\":58,\"name\":\"Naboo\"}";
		let mut feed = NdjsonLocationFeed::new(input);
		assert_eq!(feed.next_location().await.expect("readable"), Some(planet(58, "Naboo")));
		assert_eq!(feed.next_location().await.expect("readable"), None);
	}

	#[tokio::test]
	async fn channel_feed_ends_once_its_senders_are_gone() {
		let (feed_tx, mut feed_rx) = mpsc::channel(4);
		feed_tx.send(planet(4, "Mustafar")).await.expect("receiver alive");
		drop(feed_tx);
		assert_eq!(feed_rx.next_location().await.expect("channel feeds do not fail"), Some(planet(4, "Mustafar")));
		assert_eq!(feed_rx.next_location().await.expect("channel feeds do not fail"), None);
	}

	#[tokio::test]
	async fn pump_forwards_locations_in_order_then_stops() {
		let (feed_tx, feed_rx) = mpsc::unbounded_channel();
		let (tx, rx) = Mailbox::bounded(8).split();
		let pump = spawn_feed_pump(feed_rx, tx, CancellationToken::new());

		feed_tx.send(planet(1, "Dathomir")).expect("pump alive");
		feed_tx.send(planet(2, "Korriban")).expect("pump alive");
		drop(feed_tx);

		tokio::time::timeout(Duration::from_secs(1), pump).await.expect("pump ends with the feed").expect("pump does not panic");
		assert!(matches!(rx.recv().await, Some(TrackerCommand::Location(p)) if p.id == 1));
		assert!(matches!(rx.recv().await, Some(TrackerCommand::Location(p)) if p.id == 2));
	}

	#[tokio::test]
	async fn pump_stops_on_cancel() {
		let (_feed_tx, feed_rx) = mpsc::unbounded_channel::<Planet>();
		let (tx, _rx) = Mailbox::bounded(8).split();
		let cancel = CancellationToken::new();
		let pump = spawn_feed_pump(feed_rx, tx, cancel.clone());

		cancel.cancel();
		tokio::time::timeout(Duration::from_secs(1), pump).await.expect("pump honours cancel").expect("pump does not panic");
	}

	#[tokio::test]
	async fn pump_stops_when_mailbox_closes() {
		let (feed_tx, feed_rx) = mpsc::unbounded_channel();
		let (tx, _rx) = Mailbox::bounded(8).split();
		tx.close();
		let pump = spawn_feed_pump(feed_rx, tx, CancellationToken::new());

		feed_tx.send(planet(3, "Moraband")).expect("pump alive");
		tokio::time::timeout(Duration::from_secs(1), pump).await.expect("pump ends on closed mailbox").expect("pump does not panic");
	}
}
