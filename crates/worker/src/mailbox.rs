use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Outcome from enqueueing a mailbox message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
	/// Message was appended to the back of the queue.
	Enqueued,
	/// A queued message matching the coalesce predicate was replaced in place.
	Coalesced,
}

/// Mailbox send error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MailboxSendError {
	/// Mailbox is closed.
	#[error("mailbox closed")]
	Closed,
	/// Queue is full and a non-waiting send was used.
	#[error("mailbox full")]
	Full,
}

type CoalesceEqFn<T> = dyn Fn(&T, &T) -> bool + Send + Sync;

struct MailboxState<T> {
	queue: VecDeque<T>,
	closed: bool,
}

struct MailboxInner<T> {
	capacity: usize,
	coalesce_eq: Option<Arc<CoalesceEqFn<T>>>,
	state: Mutex<MailboxState<T>>,
	notify_recv: Notify,
	notify_send: Notify,
}

/// Bounded FIFO command queue.
///
/// Messages are delivered strictly in the order they were enqueued. When a
/// coalesce predicate is configured, a new message that matches a message
/// still waiting in the queue replaces it at its original position instead of
/// being appended; this holds even when the queue is full. Non-matching
/// messages are never dropped: [`MailboxSender::try_send`] reports
/// [`MailboxSendError::Full`] and [`MailboxSender::send`] waits for capacity.
pub struct Mailbox<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Multi-producer mailbox sender.
pub struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox receiver.
pub struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Mailbox<T> {
	/// Creates a bounded mailbox without coalescing.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn bounded(capacity: usize) -> Self {
		Self::build(capacity, None)
	}

	/// Creates a bounded mailbox where a queued message `q` is replaced by an
	/// incoming message `m` whenever `eq_fn(q, m)` holds.
	///
	/// # Panics
	///
	/// Panics if `capacity` is zero.
	pub fn coalescing(capacity: usize, eq_fn: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
		Self::build(capacity, Some(Arc::new(eq_fn)))
	}

	fn build(capacity: usize, coalesce_eq: Option<Arc<CoalesceEqFn<T>>>) -> Self {
		assert!(capacity > 0, "mailbox capacity must be > 0");
		Self {
			inner: Arc::new(MailboxInner {
				capacity,
				coalesce_eq,
				state: Mutex::new(MailboxState {
					queue: VecDeque::with_capacity(capacity),
					closed: false,
				}),
				notify_recv: Notify::new(),
				notify_send: Notify::new(),
			}),
		}
	}

	/// Splits the mailbox into its sender and receiver halves.
	pub fn split(self) -> (MailboxSender<T>, MailboxReceiver<T>) {
		let tx = MailboxSender {
			inner: Arc::clone(&self.inner),
		};
		(tx, MailboxReceiver { inner: self.inner })
	}
}

impl<T> MailboxSender<T> {
	/// Closes the mailbox. The receiver drains queued items, then sees `None`.
	pub fn close(&self) {
		self.inner.state.lock().closed = true;
		self.inner.notify_recv.notify_waiters();
		self.inner.notify_send.notify_waiters();
	}

	/// Returns whether the mailbox has been closed.
	pub fn is_closed(&self) -> bool {
		self.inner.state.lock().closed
	}

	/// Enqueues without waiting.
	pub fn try_send(&self, msg: T) -> Result<SendOutcome, MailboxSendError> {
		let mut state = self.inner.state.lock();
		match self.enqueue(&mut state, msg) {
			Ok(outcome) => {
				drop(state);
				self.inner.notify_recv.notify_one();
				Ok(outcome)
			}
			Err((err, _)) => Err(err),
		}
	}

	/// Enqueues, waiting for capacity when the queue is full.
	pub async fn send(&self, mut msg: T) -> Result<SendOutcome, MailboxSendError> {
		loop {
			// Registered before the capacity check so a concurrent pop cannot
			// slip its wakeup in between.
			let notified = self.inner.notify_send.notified();
			{
				let mut state = self.inner.state.lock();
				match self.enqueue(&mut state, msg) {
					Ok(outcome) => {
						drop(state);
						self.inner.notify_recv.notify_one();
						return Ok(outcome);
					}
					Err((MailboxSendError::Full, returned)) => msg = returned,
					Err((err, _)) => return Err(err),
				}
			}
			notified.await;
		}
	}

	/// Returns current queue depth.
	pub fn len(&self) -> usize {
		self.inner.state.lock().queue.len()
	}

	/// Returns `true` when nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns queue capacity.
	pub fn capacity(&self) -> usize {
		self.inner.capacity
	}

	fn enqueue(&self, state: &mut MailboxState<T>, msg: T) -> Result<SendOutcome, (MailboxSendError, T)> {
		if state.closed {
			return Err((MailboxSendError::Closed, msg));
		}
		if let Some(eq_fn) = self.inner.coalesce_eq.as_ref()
			&& let Some(existing) = state.queue.iter_mut().find(|queued| eq_fn(queued, &msg))
		{
			*existing = msg;
			return Ok(SendOutcome::Coalesced);
		}
		if state.queue.len() >= self.inner.capacity {
			return Err((MailboxSendError::Full, msg));
		}
		state.queue.push_back(msg);
		Ok(SendOutcome::Enqueued)
	}
}

impl<T> MailboxReceiver<T> {
	/// Receives one message. Returns `None` once the mailbox is closed and drained.
	pub async fn recv(&self) -> Option<T> {
		loop {
			let notified = self.inner.notify_recv.notified();
			{
				let mut state = self.inner.state.lock();
				if let Some(msg) = state.queue.pop_front() {
					drop(state);
					self.inner.notify_send.notify_one();
					return Some(msg);
				}
				if state.closed {
					return None;
				}
			}
			notified.await;
		}
	}
}
