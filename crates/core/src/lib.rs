//! Core state for the lineage tracker.
//!
//! A [`Window`] is a fixed five-slot view into a chain of [`Entity`] records
//! linked by master/apprentice references. Position 0 is the master-ward
//! ("up") end and position 4 the apprentice-ward ("down") end. The window only
//! changes through [`WindowEvent`]s applied one at a time by
//! [`Window::reduce`], which returns a whole new window value.
//!
//! [`WarningEvaluator`] combines a window with the monitored subject's latest
//! [`Planet`] into a [`WarningVector`], and [`ButtonGate`] answers whether
//! scrolling in a [`ScrollDirection`] is currently allowed.
//!
//! Everything here is synchronous and free of I/O; the async loader and the
//! event queue live in `sithwatch-tracker`.

mod entity;
mod gate;
mod slot;
mod warning;
mod window;

pub use entity::{Entity, EntityId, Planet, Reference};
pub use gate::{ButtonGate, ScrollDirection};
pub use slot::{Slot, SlotIndex};
pub use warning::{WarningEvaluator, WarningVector};
pub use window::{DEFAULT_SEED, WINDOW_LEN, Window, WindowEvent};
