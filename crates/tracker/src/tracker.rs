use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use sithwatch_core::{ButtonGate, Entity, Planet, ScrollDirection, Slot, SlotIndex, WarningVector, Window, WindowEvent};
use sithwatch_worker::{ActorEventReceiver, ActorHandle, ActorSpec, ShutdownMode, ShutdownReport, TaskClass, spawn_actor};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::actor::{TrackerActor, TrackerCommand, TrackerEvent, TrackerSnapshot};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::feed::{LocationFeed, spawn_feed_pump};
use crate::fetch::EntityFetcher;
use crate::loader::LoaderCascade;

/// Upper bound on draining queued events in [`Tracker::stop`].
pub const STOP_GRACE: Duration = Duration::from_secs(2);

/// One tracker activation.
///
/// Owns the reducer actor and the location feed pump. Reads are served from
/// the last published snapshot and never wait on the reducer. Dropping the
/// handle cancels the activation; [`Tracker::stop`] and [`Tracker::abort`]
/// also wait for it.
pub struct Tracker {
	actor: ActorHandle<TrackerCommand, TrackerEvent>,
	snapshot: Arc<ArcSwap<TrackerSnapshot>>,
	feed_cancel: CancellationToken,
	feed: Option<JoinHandle<()>>,
}

impl Tracker {
	/// Seeds the window, spawns the reducer and starts pumping `feed`.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime context.
	pub fn start<F, L>(config: &TrackerConfig, fetcher: F, feed: L) -> Self
	where
		F: EntityFetcher,
		L: LocationFeed,
	{
		let window = Window::seeded(config.seed);
		let snapshot = Arc::new(ArcSwap::from_pointee(TrackerSnapshot::initial(window.clone())));
		let loader = LoaderCascade::new(Arc::new(fetcher));
		let actor = TrackerActor::new(window, loader, Arc::clone(&snapshot));

		let spec = ActorSpec::new("tracker", TaskClass::Reducer, actor)
			.mailbox_capacity(config.runtime.mailbox_capacity)
			.event_buffer(config.runtime.event_buffer)
			.coalesce_when(|queued: &TrackerCommand, incoming: &TrackerCommand| queued.is_location() && incoming.is_location());
		let actor = spawn_actor(spec);

		let feed_cancel = CancellationToken::new();
		let feed = spawn_feed_pump(feed, actor.sender(), feed_cancel.clone());
		tracing::info!(seed = config.seed, "tracker.start");

		Self {
			actor,
			snapshot,
			feed_cancel,
			feed: Some(feed),
		}
	}

	/// Stops the feed pump, lets already queued events drain and waits for
	/// the reducer to exit. In-flight fetches are aborted once it does. The
	/// reducer is cancelled if draining takes longer than [`STOP_GRACE`].
	pub async fn stop(self) -> ShutdownReport {
		self.finish(ShutdownMode::Graceful { timeout: STOP_GRACE }).await
	}

	/// Like [`Tracker::stop`] but discards queued events.
	pub async fn abort(self) -> ShutdownReport {
		self.finish(ShutdownMode::Immediate).await
	}

	async fn finish(mut self, mode: ShutdownMode) -> ShutdownReport {
		self.feed_cancel.cancel();
		if let Some(feed) = self.feed.take()
			&& let Err(err) = feed.await
			&& err.is_panic()
		{
			tracing::error!(error = %err, "tracker.feed.panicked");
		}
		let report = self.actor.shutdown(mode).await;
		tracing::info!(exit = ?report.exit(), timed_out = report.timed_out(), "tracker.stop");
		report
	}

	/// Whether the reducer is still accepting events.
	pub fn is_running(&self) -> bool {
		!self.actor.is_finished()
	}

	/// Enqueues a `ScrollUp`. The reducer ignores it when the top is not a
	/// loaded entity with a master.
	pub fn request_scroll_up(&self) -> Result<(), TrackerError> {
		self.enqueue(WindowEvent::ScrollUp)
	}

	/// Enqueues a `ScrollDown`. The reducer ignores it when the bottom is not
	/// a loaded entity with an apprentice.
	pub fn request_scroll_down(&self) -> Result<(), TrackerError> {
		self.enqueue(WindowEvent::ScrollDown)
	}

	/// Presses the scroll button for `direction`: enqueues the scroll only
	/// when the button is enabled. Returns whether a request was enqueued.
	pub fn scroll(&self, direction: ScrollDirection) -> Result<bool, TrackerError> {
		if self.is_button_disabled(direction) {
			tracing::debug!(%direction, "tracker.scroll.disabled");
			return Ok(false);
		}
		match direction {
			ScrollDirection::Up => self.request_scroll_up()?,
			ScrollDirection::Down => self.request_scroll_down()?,
		}
		Ok(true)
	}

	/// Feeds a completed lookup into the ordered event queue.
	pub fn report_data_loaded(&self, index: SlotIndex, entity: impl Into<Arc<Entity>>) -> Result<(), TrackerError> {
		self.enqueue(WindowEvent::DataLoaded {
			index,
			entity: entity.into(),
		})
	}

	fn enqueue(&self, event: WindowEvent) -> Result<(), TrackerError> {
		self.actor.try_send(TrackerCommand::Window(event))?;
		Ok(())
	}

	/// The last published state.
	pub fn snapshot(&self) -> Arc<TrackerSnapshot> {
		self.snapshot.load_full()
	}

	pub fn window(&self) -> Window {
		self.snapshot.load().window.clone()
	}

	pub fn slot(&self, index: SlotIndex) -> Slot {
		self.snapshot.load().window.slot(index).clone()
	}

	pub fn warnings(&self) -> WarningVector {
		self.snapshot.load().warnings
	}

	pub fn warning(&self, index: SlotIndex) -> bool {
		self.warnings().get(index)
	}

	pub fn any_warning(&self) -> bool {
		self.warnings().any()
	}

	pub fn is_button_disabled(&self, direction: ScrollDirection) -> bool {
		let snapshot = self.snapshot.load();
		ButtonGate::is_disabled(&snapshot.window, &snapshot.warnings, direction)
	}

	/// Latest location of the monitored subject, once the feed has reported one.
	pub fn location(&self) -> Option<Planet> {
		self.snapshot.load().location.clone()
	}

	/// Change notifications from now on.
	pub fn subscribe(&self) -> ActorEventReceiver<TrackerEvent> {
		self.actor.subscribe()
	}
}

impl Drop for Tracker {
	fn drop(&mut self) {
		self.feed_cancel.cancel();
	}
}
