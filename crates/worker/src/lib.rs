//! Runtime primitives for the tracker.
//!
//! * [`TaskClass`] and [`spawn`]: classified task spawning with trace output.
//! * [`Mailbox`]: a bounded FIFO command queue whose senders can coalesce
//!   replaceable messages in place.
//! * [`Actor`] and [`spawn_actor`]: one actor instance that owns its state,
//!   drains a mailbox one command at a time and broadcasts events.

mod actor;
mod mailbox;
mod spawn;

pub use actor::{Actor, ActorContext, ActorExit, ActorFlow, ActorHandle, ActorSendError, ActorSpec, ShutdownMode, ShutdownReport, spawn_actor};
pub use mailbox::{Mailbox, MailboxReceiver, MailboxSendError, MailboxSender, SendOutcome};
pub use spawn::{TaskClass, spawn};

/// Event subscription receiver for actor broadcasts.
pub type ActorEventReceiver<Evt> = tokio::sync::broadcast::Receiver<Evt>;
