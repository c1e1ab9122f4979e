//! Lazy fetching for `Loading` positions.

use std::sync::Arc;

use sithwatch_core::{EntityId, SlotIndex, WINDOW_LEN, Window, WindowEvent};
use sithwatch_worker::{MailboxSender, TaskClass};
use tokio_util::sync::CancellationToken;

use crate::actor::TrackerCommand;
use crate::fetch::EntityFetcher;

/// Issues one fetch per `Loading` position and feeds completions back as
/// [`WindowEvent::DataLoaded`].
///
/// Each position remembers the id its last fetch was issued for. A position
/// gets a new fetch only when it is loading an id different from that record;
/// leaving `Loading` forgets it. While fetches are suppressed nothing is
/// recorded, so suppressed positions are picked up once suppression lifts.
/// A failed fetch keeps its record and is therefore never retried.
pub(crate) struct LoaderCascade {
	fetcher: Arc<dyn EntityFetcher>,
	issued: [Option<EntityId>; WINDOW_LEN],
}

impl LoaderCascade {
	pub(crate) fn new(fetcher: Arc<dyn EntityFetcher>) -> Self {
		Self {
			fetcher,
			issued: [None; WINDOW_LEN],
		}
	}

	/// Updates the per-position records against `window` and returns the
	/// fetches that are due.
	pub(crate) fn plan(&mut self, window: &Window, suppressed: bool) -> Vec<(SlotIndex, EntityId)> {
		let mut due = Vec::new();
		for (index, slot) in window.iter() {
			let record = &mut self.issued[index.get()];
			let Some(id) = slot.loading_id() else {
				*record = None;
				continue;
			};
			if *record == Some(id) || suppressed {
				continue;
			}
			*record = Some(id);
			due.push((index, id));
		}
		due
	}

	/// Plans against `window` and spawns every due fetch. Returns how many
	/// were issued.
	pub(crate) fn sync(&mut self, window: &Window, suppressed: bool, mailbox: &MailboxSender<TrackerCommand>, cancel: &CancellationToken) -> usize {
		let due = self.plan(window, suppressed);
		for &(index, id) in &due {
			self.issue(index, id, mailbox.clone(), cancel.child_token());
		}
		if suppressed {
			let waiting = window.loading().filter(|(index, id)| self.issued[index.get()] != Some(*id)).count();
			if waiting > 0 {
				tracing::debug!(waiting, "tracker.fetch.suppressed");
			}
		}
		due.len()
	}

	fn issue(&self, index: SlotIndex, id: EntityId, mailbox: MailboxSender<TrackerCommand>, cancel: CancellationToken) {
		tracing::debug!(index = index.get(), id, "tracker.fetch.issue");
		let fetcher = Arc::clone(&self.fetcher);
		sithwatch_worker::spawn(TaskClass::Fetch, async move {
			let result = tokio::select! {
				biased;
				_ = cancel.cancelled() => return,
				result = fetcher.fetch(id) => result,
			};
			match result {
				Ok(entity) => {
					let event = WindowEvent::DataLoaded {
						index,
						entity: Arc::new(entity),
					};
					if mailbox.send(TrackerCommand::Window(event)).await.is_err() {
						tracing::debug!(index = index.get(), id, "tracker.fetch.dropped");
					}
				}
				Err(error) => tracing::warn!(index = index.get(), id, %error, "tracker.fetch.failed"),
			}
		});
	}
}
