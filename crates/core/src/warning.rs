use crate::entity::Planet;
use crate::slot::{Slot, SlotIndex};
use crate::window::{WINDOW_LEN, Window};

/// Per-position warning flags, aligned with the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WarningVector([bool; WINDOW_LEN]);

impl WarningVector {
	pub const CLEAR: Self = Self([false; WINDOW_LEN]);

	/// Flags every loaded position whose homeworld is the subject's location.
	/// Without a known location nothing is flagged.
	pub fn evaluate(window: &Window, location: Option<&Planet>) -> Self {
		let Some(location) = location else {
			return Self::CLEAR;
		};
		Self(window.slots().each_ref().map(|slot| match slot {
			Slot::Loaded(entity) => entity.homeworld.id == location.id,
			Slot::Empty | Slot::Loading(_) => false,
		}))
	}

	pub fn from_flags(flags: [bool; WINDOW_LEN]) -> Self {
		Self(flags)
	}

	pub fn get(&self, index: SlotIndex) -> bool {
		self.0[index.get()]
	}

	/// `true` when any position is flagged.
	pub fn any(&self) -> bool {
		self.0.iter().any(|flag| *flag)
	}

	pub fn flags(&self) -> [bool; WINDOW_LEN] {
		self.0
	}
}

/// Tracks the latest location and gates warning notifications on content
/// changes.
///
/// The last notified vector starts out [`WarningVector::CLEAR`]; a recomputed
/// vector is only handed out when it differs from it by value.
#[derive(Debug, Clone, Default)]
pub struct WarningEvaluator {
	location: Option<Planet>,
	notified: WarningVector,
}

impl WarningEvaluator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the location. Returns `false` when the value is unchanged.
	pub fn set_location(&mut self, location: Planet) -> bool {
		if self.location.as_ref() == Some(&location) {
			return false;
		}
		self.location = Some(location);
		true
	}

	pub fn location(&self) -> Option<&Planet> {
		self.location.as_ref()
	}

	/// Recomputes against `window`. Returns the new vector only when its
	/// content differs from the last one returned.
	pub fn refresh(&mut self, window: &Window) -> Option<WarningVector> {
		let next = WarningVector::evaluate(window, self.location.as_ref());
		if next == self.notified {
			return None;
		}
		self.notified = next;
		Some(next)
	}

	/// The last notified vector.
	pub fn current(&self) -> WarningVector {
		self.notified
	}

	/// Aggregate flag of the last notified vector.
	pub fn any(&self) -> bool {
		self.notified.any()
	}
}
