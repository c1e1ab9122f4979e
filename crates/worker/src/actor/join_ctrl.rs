use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Join coordination for the actor's exit watcher task.
///
/// The first caller awaits the handle while holding the lock; concurrent
/// callers queue on the lock and find `None` once the task has been reaped.
pub(super) struct JoinCtrl {
	handle: Mutex<Option<JoinHandle<()>>>,
}

impl JoinCtrl {
	pub(super) fn new(handle: JoinHandle<()>) -> Self {
		Self {
			handle: Mutex::new(Some(handle)),
		}
	}

	/// Waits until the task is done. Multiple callers are safe.
	pub(super) async fn join_forever(&self) {
		let mut guard = self.handle.lock().await;
		if let Some(handle) = guard.as_mut() {
			let _ = handle.await;
			*guard = None;
		}
	}

	/// Waits with a deadline. Returns `true` if the task is done.
	pub(super) async fn join_with_timeout(&self, timeout: Duration) -> bool {
		let deadline = tokio::time::Instant::now() + timeout;
		let Ok(mut guard) = tokio::time::timeout_at(deadline, self.handle.lock()).await else {
			return false;
		};
		let Some(handle) = guard.as_mut() else {
			return true;
		};
		if tokio::time::timeout_at(deadline, handle).await.is_err() {
			return false;
		}
		*guard = None;
		true
	}
}
