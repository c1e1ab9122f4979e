use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::TaskClass;
use crate::mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender, SendOutcome};

mod join_ctrl;

use join_ctrl::JoinCtrl;

/// Continuation directive from one command handling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorFlow {
	/// Continue processing commands.
	Continue,
	/// Stop the actor.
	Stop,
}

/// Why an actor stopped running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorExit {
	/// The handler returned [`ActorFlow::Stop`].
	Stopped,
	/// Every queued command was drained after the mailbox closed.
	MailboxClosed,
	/// The actor was cancelled.
	Cancelled,
	/// `handle` returned an error. The actor does not restart.
	HandlerFailed(String),
	/// The actor task panicked.
	Panicked,
}

impl ActorExit {
	pub fn is_failure(&self) -> bool {
		matches!(self, Self::HandlerFailed(_) | Self::Panicked)
	}
}

/// Error returned when a command cannot be delivered to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActorSendError {
	/// The actor's mailbox is closed.
	#[error("actor mailbox closed")]
	Closed,
	/// The actor's mailbox is full.
	#[error("actor mailbox full")]
	Full,
}

impl From<MailboxSendError> for ActorSendError {
	fn from(err: MailboxSendError) -> Self {
		match err {
			MailboxSendError::Closed => Self::Closed,
			MailboxSendError::Full => Self::Full,
		}
	}
}

/// Shutdown mode for actors.
#[derive(Debug, Clone, Copy)]
pub enum ShutdownMode {
	/// Cancel without draining queued commands.
	Immediate,
	/// Close the mailbox, let queued commands drain, cancel on timeout.
	Graceful { timeout: Duration },
}

/// Shutdown report for one actor.
#[derive(Debug, Clone)]
pub struct ShutdownReport {
	completed: bool,
	timed_out: bool,
	exit: Option<ActorExit>,
}

impl ShutdownReport {
	pub fn completed(&self) -> bool {
		self.completed
	}

	pub fn timed_out(&self) -> bool {
		self.timed_out
	}

	pub fn exit(&self) -> Option<&ActorExit> {
		self.exit.as_ref()
	}
}

/// State owner driven by commands from its mailbox.
///
/// Commands are handled strictly one at a time in mailbox order; `handle` is
/// never re-entered while a previous call is pending.
#[async_trait]
pub trait Actor: Send + 'static {
	type Cmd: Send + 'static;
	type Evt: Clone + Send + 'static;

	async fn on_start(&mut self, _ctx: &mut ActorContext<Self::Cmd, Self::Evt>) {}

	async fn on_stop(&mut self, _ctx: &mut ActorContext<Self::Cmd, Self::Evt>) {}

	async fn handle(&mut self, cmd: Self::Cmd, ctx: &mut ActorContext<Self::Cmd, Self::Evt>) -> Result<ActorFlow, String>;
}

/// Actor execution context: event emitter, self-addressed mailbox and
/// cancellation scope for child tasks.
pub struct ActorContext<Cmd, Evt> {
	events: broadcast::Sender<Evt>,
	mailbox: MailboxSender<Cmd>,
	cancel: CancellationToken,
}

impl<Cmd, Evt> ActorContext<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	/// Emits one event to subscribers. Events without subscribers are dropped.
	pub fn emit(&self, evt: Evt) {
		let _ = self.events.send(evt);
	}

	/// Returns a sender into this actor's own mailbox.
	///
	/// Child tasks use it to report results back as ordinary commands.
	pub fn mailbox(&self) -> MailboxSender<Cmd> {
		self.mailbox.clone()
	}

	/// Returns a token cancelled when the actor is cancelled or exits.
	pub fn child_token(&self) -> CancellationToken {
		self.cancel.child_token()
	}
}

type CoalesceEqFn<T> = dyn Fn(&T, &T) -> bool + Send + Sync;

/// Builder spec for one actor.
pub struct ActorSpec<A>
where
	A: Actor,
{
	name: String,
	class: TaskClass,
	actor: A,
	mailbox_capacity: usize,
	event_buffer: usize,
	coalesce_eq: Option<Box<CoalesceEqFn<A::Cmd>>>,
}

impl<A> ActorSpec<A>
where
	A: Actor,
{
	/// Creates a spec with a 128-slot mailbox and a 128-event broadcast buffer.
	pub fn new(name: impl Into<String>, class: TaskClass, actor: A) -> Self {
		Self {
			name: name.into(),
			class,
			actor,
			mailbox_capacity: 128,
			event_buffer: 128,
			coalesce_eq: None,
		}
	}

	/// Sets the mailbox capacity.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	#[must_use]
	pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		self.mailbox_capacity = capacity;
		self
	}

	/// Sets the event broadcast buffer capacity.
	///
	/// # Panics
	///
	/// Panics if `size` is zero.
	#[must_use]
	pub fn event_buffer(mut self, size: usize) -> Self {
		assert!(size > 0, "event buffer size must be > 0");
		self.event_buffer = size;
		self
	}

	/// Lets a queued command be replaced in place by a newer one when
	/// `eq_fn(queued, incoming)` holds.
	#[must_use]
	pub fn coalesce_when(mut self, eq_fn: impl Fn(&A::Cmd, &A::Cmd) -> bool + Send + Sync + 'static) -> Self {
		self.coalesce_eq = Some(Box::new(eq_fn));
		self
	}
}

/// Handle for one running actor. Dropping it cancels the actor.
pub struct ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	name: Arc<str>,
	tx: MailboxSender<Cmd>,
	events: broadcast::Sender<Evt>,
	cancel: CancellationToken,
	exit: Arc<Mutex<Option<ActorExit>>>,
	join_ctrl: Arc<JoinCtrl>,
}

impl<Cmd, Evt> Drop for ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	fn drop(&mut self) {
		self.cancel.cancel();
		self.tx.close();
	}
}

impl<Cmd, Evt> ActorHandle<Cmd, Evt>
where
	Cmd: Send + 'static,
	Evt: Clone + Send + 'static,
{
	/// Subscribes to actor events emitted from now on.
	pub fn subscribe(&self) -> crate::ActorEventReceiver<Evt> {
		self.events.subscribe()
	}

	/// Returns a cloneable sender into the actor's mailbox.
	pub fn sender(&self) -> MailboxSender<Cmd> {
		self.tx.clone()
	}

	/// Enqueues one command without waiting.
	pub fn try_send(&self, cmd: Cmd) -> Result<SendOutcome, ActorSendError> {
		Ok(self.tx.try_send(cmd)?)
	}

	/// Enqueues one command, waiting for mailbox capacity.
	pub async fn send(&self, cmd: Cmd) -> Result<SendOutcome, ActorSendError> {
		Ok(self.tx.send(cmd).await?)
	}

	/// Returns whether the actor task has exited.
	pub fn is_finished(&self) -> bool {
		self.exit.lock().is_some()
	}

	/// Returns the recorded exit, if the actor has stopped.
	pub fn exit(&self) -> Option<ActorExit> {
		self.exit.lock().clone()
	}

	/// Requests cancellation and closes the mailbox.
	pub fn cancel(&self) {
		self.cancel.cancel();
		self.tx.close();
	}

	/// Shuts the actor down and waits for its task to finish.
	pub async fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
		match mode {
			ShutdownMode::Immediate => {
				self.cancel();
				self.join_ctrl.join_forever().await;
				ShutdownReport {
					completed: true,
					timed_out: false,
					exit: self.exit(),
				}
			}
			ShutdownMode::Graceful { timeout } => {
				self.tx.close();
				let completed = self.join_ctrl.join_with_timeout(timeout).await;
				if !completed {
					tracing::warn!(actor = %self.name, "graceful shutdown timed out; cancelling");
					self.cancel.cancel();
				}
				ShutdownReport {
					completed,
					timed_out: !completed,
					exit: self.exit(),
				}
			}
		}
	}
}

/// Spawns one actor on the current tokio runtime.
///
/// # Panics
///
/// Panics when called outside a tokio runtime context.
pub fn spawn_actor<A>(spec: ActorSpec<A>) -> ActorHandle<A::Cmd, A::Evt>
where
	A: Actor,
{
	let mailbox = match spec.coalesce_eq {
		Some(eq_fn) => Mailbox::coalescing(spec.mailbox_capacity, eq_fn),
		None => Mailbox::bounded(spec.mailbox_capacity),
	};
	let (tx, rx) = mailbox.split();
	let (events, _) = broadcast::channel(spec.event_buffer);
	let cancel = CancellationToken::new();
	let exit = Arc::new(Mutex::new(None));
	let name: Arc<str> = Arc::from(spec.name);

	let ctx = ActorContext {
		events: events.clone(),
		mailbox: tx.clone(),
		cancel: cancel.child_token(),
	};
	let child = crate::spawn(spec.class, run_actor(spec.actor, rx, ctx));

	let task_name = Arc::clone(&name);
	let task_exit = Arc::clone(&exit);
	let task_tx = tx.clone();
	let class = spec.class;
	let watcher = crate::spawn(class, async move {
		let reason = match child.await {
			Ok(reason) => reason,
			Err(err) if err.is_panic() => ActorExit::Panicked,
			Err(_) => ActorExit::Cancelled,
		};
		task_tx.close();
		if reason.is_failure() {
			tracing::error!(actor = %task_name, class = class.as_str(), reason = ?reason, "worker.actor.exit");
		} else {
			tracing::debug!(actor = %task_name, class = class.as_str(), reason = ?reason, "worker.actor.exit");
		}
		*task_exit.lock() = Some(reason);
	});

	ActorHandle {
		name,
		tx,
		events,
		cancel,
		exit,
		join_ctrl: Arc::new(JoinCtrl::new(watcher)),
	}
}

async fn run_actor<A>(mut actor: A, rx: MailboxReceiver<A::Cmd>, mut ctx: ActorContext<A::Cmd, A::Evt>) -> ActorExit
where
	A: Actor,
{
	let token = ctx.cancel.clone();
	let started = tokio::select! {
		biased;
		_ = token.cancelled() => false,
		_ = actor.on_start(&mut ctx) => true,
	};
	if !started {
		return ActorExit::Cancelled;
	}

	let reason = loop {
		let cmd = tokio::select! {
			biased;
			_ = token.cancelled() => break ActorExit::Cancelled,
			msg = rx.recv() => {
				let Some(cmd) = msg else {
					break ActorExit::MailboxClosed;
				};
				cmd
			}
		};

		match actor.handle(cmd, &mut ctx).await {
			Ok(ActorFlow::Continue) => {}
			Ok(ActorFlow::Stop) => break ActorExit::Stopped,
			Err(err) => break ActorExit::HandlerFailed(err),
		}
	};

	actor.on_stop(&mut ctx).await;
	// Child tasks spawned under this actor never outlive it.
	token.cancel();
	reason
}
