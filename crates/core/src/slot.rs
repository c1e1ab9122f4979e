use std::fmt;
use std::sync::Arc;

use crate::entity::{Entity, EntityId};
use crate::window::WINDOW_LEN;

/// One display position of the window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot {
	/// Nothing is shown and nothing is being fetched.
	#[default]
	Empty,
	/// A fetch for this id is expected (or suppressed while a warning is up).
	Loading(EntityId),
	/// The entity record has arrived.
	Loaded(Arc<Entity>),
}

impl Slot {
	pub fn loaded(entity: Entity) -> Self {
		Self::Loaded(Arc::new(entity))
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading(_))
	}

	/// Returns the id this slot waits for, if it is loading.
	pub fn loading_id(&self) -> Option<EntityId> {
		match self {
			Self::Loading(id) => Some(*id),
			_ => None,
		}
	}

	/// Returns the loaded entity, if any.
	pub fn entity(&self) -> Option<&Entity> {
		match self {
			Self::Loaded(entity) => Some(entity.as_ref()),
			_ => None,
		}
	}

	/// Id of the entity shown or awaited here.
	pub fn id(&self) -> Option<EntityId> {
		match self {
			Self::Empty => None,
			Self::Loading(id) => Some(*id),
			Self::Loaded(entity) => Some(entity.id),
		}
	}
}

/// A valid window position, `0..WINDOW_LEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex {
	/// The master-ward end.
	pub const TOP: Self = Self(0);
	/// The apprentice-ward end.
	pub const BOTTOM: Self = Self(WINDOW_LEN as u8 - 1);

	/// Returns `None` when `index` is outside the window.
	pub const fn new(index: usize) -> Option<Self> {
		if index < WINDOW_LEN { Some(Self(index as u8)) } else { None }
	}

	pub const fn get(self) -> usize {
		self.0 as usize
	}

	/// The neighbour one step toward the master end.
	pub const fn master_ward(self) -> Option<Self> {
		if self.0 == 0 { None } else { Some(Self(self.0 - 1)) }
	}

	/// The neighbour one step toward the apprentice end.
	pub const fn apprentice_ward(self) -> Option<Self> {
		Self::new(self.0 as usize + 1)
	}

	/// Every position, top to bottom.
	pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
		(0..WINDOW_LEN as u8).map(Self)
	}
}

impl fmt::Display for SlotIndex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl TryFrom<usize> for SlotIndex {
	type Error = usize;

	fn try_from(index: usize) -> Result<Self, Self::Error> {
		Self::new(index).ok_or(index)
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(0, Some(0))]
	#[case(4, Some(4))]
	#[case(5, None)]
	#[case(usize::MAX, None)]
	fn index_bounds(#[case] raw: usize, #[case] expected: Option<usize>) {
		assert_eq!(SlotIndex::new(raw).map(SlotIndex::get), expected);
	}

	#[test]
	fn neighbours_stop_at_the_ends() {
		assert_eq!(SlotIndex::TOP.master_ward(), None);
		assert_eq!(SlotIndex::BOTTOM.apprentice_ward(), None);
		assert_eq!(SlotIndex::new(2).and_then(SlotIndex::master_ward), SlotIndex::new(1));
		assert_eq!(SlotIndex::new(2).and_then(SlotIndex::apprentice_ward), SlotIndex::new(3));
	}

	#[test]
	fn all_walks_top_to_bottom() {
		let order: Vec<usize> = SlotIndex::all().map(SlotIndex::get).collect();
		assert_eq!(order, vec![0, 1, 2, 3, 4]);
	}

	#[test]
	fn slot_accessors() {
		assert_eq!(Slot::Empty.id(), None);
		assert_eq!(Slot::Loading(9).loading_id(), Some(9));
		assert!(Slot::Loading(9).entity().is_none());
		assert!(Slot::default().is_empty());
	}
}
