//! The reducer actor: sole owner of the window, the warning evaluator and the
//! loader bookkeeping.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use sithwatch_core::{Planet, WarningEvaluator, WarningVector, Window, WindowEvent};
use sithwatch_worker::{Actor, ActorContext, ActorFlow};

use crate::loader::LoaderCascade;

/// Commands drained by the reducer, one at a time in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCommand {
	/// A window event from the presentation layer or a fetch completion.
	Window(WindowEvent),
	/// A new value from the location feed. A queued location is replaced in
	/// place by a newer one.
	Location(Planet),
}

impl TrackerCommand {
	pub fn is_location(&self) -> bool {
		matches!(self, Self::Location(_))
	}
}

/// Change notifications broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
	WindowChanged(Window),
	/// Emitted only when the vector's content differs from the previous one.
	WarningsChanged(WarningVector),
	LocationChanged(Planet),
}

/// Read-only view published after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSnapshot {
	pub window: Window,
	pub warnings: WarningVector,
	pub location: Option<Planet>,
}

impl TrackerSnapshot {
	pub(crate) fn initial(window: Window) -> Self {
		Self {
			window,
			warnings: WarningVector::CLEAR,
			location: None,
		}
	}
}

pub(crate) struct TrackerActor {
	window: Window,
	evaluator: WarningEvaluator,
	loader: LoaderCascade,
	snapshot: Arc<ArcSwap<TrackerSnapshot>>,
}

impl TrackerActor {
	pub(crate) fn new(window: Window, loader: LoaderCascade, snapshot: Arc<ArcSwap<TrackerSnapshot>>) -> Self {
		Self {
			window,
			evaluator: WarningEvaluator::new(),
			loader,
			snapshot,
		}
	}

	fn sync_loader(&mut self, ctx: &ActorContext<TrackerCommand, TrackerEvent>) {
		let cancel = ctx.child_token();
		self.loader.sync(&self.window, self.evaluator.any(), &ctx.mailbox(), &cancel);
	}

	fn publish(&self) {
		self.snapshot.store(Arc::new(TrackerSnapshot {
			window: self.window.clone(),
			warnings: self.evaluator.current(),
			location: self.evaluator.location().cloned(),
		}));
	}
}

fn event_name(event: &WindowEvent) -> &'static str {
	match event {
		WindowEvent::ScrollUp => "scroll_up",
		WindowEvent::ScrollDown => "scroll_down",
		WindowEvent::DataLoaded { .. } => "data_loaded",
	}
}

#[async_trait]
impl Actor for TrackerActor {
	type Cmd = TrackerCommand;
	type Evt = TrackerEvent;

	async fn on_start(&mut self, ctx: &mut ActorContext<TrackerCommand, TrackerEvent>) {
		self.publish();
		self.sync_loader(ctx);
	}

	async fn on_stop(&mut self, _ctx: &mut ActorContext<TrackerCommand, TrackerEvent>) {
		tracing::debug!(loading = self.window.loading().count(), warned = self.evaluator.current().any(), "tracker.actor.stopped");
	}

	async fn handle(&mut self, cmd: TrackerCommand, ctx: &mut ActorContext<TrackerCommand, TrackerEvent>) -> Result<ActorFlow, String> {
		let mut window_changed = false;
		let mut location_changed = None;

		match cmd {
			TrackerCommand::Window(event) => match self.window.reduce(&event) {
				Some(next) => {
					tracing::debug!(event = event_name(&event), "tracker.window.changed");
					self.window = next;
					window_changed = true;
				}
				None => tracing::trace!(event = event_name(&event), "tracker.window.unchanged"),
			},
			TrackerCommand::Location(planet) => {
				if self.evaluator.set_location(planet.clone()) {
					tracing::debug!(planet = planet.id, name = %planet.name, "tracker.location.changed");
					location_changed = Some(planet);
				}
			}
		}

		if !window_changed && location_changed.is_none() {
			return Ok(ActorFlow::Continue);
		}

		let warnings = self.evaluator.refresh(&self.window);
		if let Some(warnings) = warnings {
			if warnings.any() {
				tracing::info!(flags = ?warnings.flags(), "tracker.warning.raised");
			} else {
				tracing::info!("tracker.warning.cleared");
			}
		}

		// Readers see the new state before subscribers hear about it.
		self.publish();
		if window_changed {
			ctx.emit(TrackerEvent::WindowChanged(self.window.clone()));
		}
		if let Some(planet) = location_changed {
			ctx.emit(TrackerEvent::LocationChanged(planet));
		}
		if let Some(warnings) = warnings {
			ctx.emit(TrackerEvent::WarningsChanged(warnings));
		}

		self.sync_loader(ctx);
		Ok(ActorFlow::Continue)
	}
}
