use std::ops::Index;
use std::sync::Arc;

use crate::entity::{Entity, EntityId};
use crate::slot::{Slot, SlotIndex};

/// Number of positions in the window.
pub const WINDOW_LEN: usize = 5;

/// Entity id placed at position 0 on activation unless configured otherwise.
pub const DEFAULT_SEED: EntityId = 3616;

/// State-changing events, applied strictly one at a time in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
	/// Move the view one master further up the chain.
	ScrollUp,
	/// Move the view one apprentice further down the chain.
	ScrollDown,
	/// A fetch for `index` completed with `entity`.
	DataLoaded { index: SlotIndex, entity: Arc<Entity> },
}

/// Fixed five-slot view into the lineage chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
	slots: [Slot; WINDOW_LEN],
}

impl Window {
	/// The activation state: `[Loading(seed), Empty, Empty, Empty, Empty]`.
	pub fn seeded(seed: EntityId) -> Self {
		Self {
			slots: [Slot::Loading(seed), Slot::Empty, Slot::Empty, Slot::Empty, Slot::Empty],
		}
	}

	pub fn from_slots(slots: [Slot; WINDOW_LEN]) -> Self {
		Self { slots }
	}

	pub fn slots(&self) -> &[Slot; WINDOW_LEN] {
		&self.slots
	}

	pub fn slot(&self, index: SlotIndex) -> &Slot {
		&self.slots[index.get()]
	}

	/// Positions paired with their slots, top to bottom.
	pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &Slot)> {
		SlotIndex::all().zip(self.slots.iter())
	}

	/// Positions currently waiting for a fetch, with the awaited ids.
	pub fn loading(&self) -> impl Iterator<Item = (SlotIndex, EntityId)> + '_ {
		self.iter().filter_map(|(index, slot)| slot.loading_id().map(|id| (index, id)))
	}

	/// The master id of the loaded top entity, when scrolling up is possible.
	pub fn up_target(&self) -> Option<EntityId> {
		self.slot(SlotIndex::TOP).entity().and_then(Entity::master_id)
	}

	/// The apprentice id of the loaded bottom entity, when scrolling down is possible.
	pub fn down_target(&self) -> Option<EntityId> {
		self.slot(SlotIndex::BOTTOM).entity().and_then(Entity::apprentice_id)
	}

	/// Applies one event and returns the next window, or `None` when the event
	/// leaves the window unchanged.
	pub fn reduce(&self, event: &WindowEvent) -> Option<Window> {
		let next = match event {
			WindowEvent::ScrollUp => self.scrolled_up()?,
			WindowEvent::ScrollDown => self.scrolled_down()?,
			WindowEvent::DataLoaded { index, entity } => self.with_loaded(*index, entity),
		};
		(next != *self).then_some(next)
	}

	fn scrolled_up(&self) -> Option<Window> {
		let master = self.up_target()?;
		let [s0, s1, s2, _, _] = &self.slots;
		Some(Self::from_slots([Slot::Empty, Slot::Loading(master), s0.clone(), s1.clone(), s2.clone()]))
	}

	fn scrolled_down(&self) -> Option<Window> {
		let apprentice = self.down_target()?;
		let [_, _, s2, s3, s4] = &self.slots;
		Some(Self::from_slots([s2.clone(), s3.clone(), s4.clone(), Slot::Loading(apprentice), Slot::Empty]))
	}

	/// Last write wins at `index`; neighbours that were `Empty` before the
	/// event start loading the linked ids. A non-empty neighbour is never
	/// touched, which keeps one fetch per position.
	fn with_loaded(&self, index: SlotIndex, entity: &Arc<Entity>) -> Window {
		let mut slots = self.slots.clone();
		slots[index.get()] = Slot::Loaded(Arc::clone(entity));

		if let Some(up) = index.master_ward()
			&& let Some(master) = entity.master_id()
			&& self.slot(up).is_empty()
		{
			slots[up.get()] = Slot::Loading(master);
		}
		if let Some(down) = index.apprentice_ward()
			&& let Some(apprentice) = entity.apprentice_id()
			&& self.slot(down).is_empty()
		{
			slots[down.get()] = Slot::Loading(apprentice);
		}

		Self::from_slots(slots)
	}
}

impl Default for Window {
	fn default() -> Self {
		Self::seeded(DEFAULT_SEED)
	}
}

impl Index<SlotIndex> for Window {
	type Output = Slot;

	fn index(&self, index: SlotIndex) -> &Slot {
		self.slot(index)
	}
}
