use std::future::Future;

use tokio::task::JoinHandle;

/// Execution classes used for task scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The state owner draining the ordered command queue. Never blocks.
	Reducer,
	/// One entity lookup. Completion is reported back as a command.
	Fetch,
	/// Long-lived pump reading the location feed.
	Feed,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Reducer => "reducer",
			Self::Fetch => "fetch",
			Self::Feed => "feed",
		}
	}
}

/// Spawns an async task on the current tokio runtime.
///
/// # Panics
///
/// Panics when called outside a tokio runtime context.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	tokio::runtime::Handle::current().spawn(fut)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn spawned_task_runs_to_completion() {
		let handle = spawn(TaskClass::Fetch, async { 40 + 2 });
		assert_eq!(handle.await.ok(), Some(42));
	}

	#[test]
	fn class_labels_are_stable() {
		assert_eq!(TaskClass::Reducer.as_str(), "reducer");
		assert_eq!(TaskClass::Fetch.as_str(), "fetch");
		assert_eq!(TaskClass::Feed.as_str(), "feed");
	}
}
