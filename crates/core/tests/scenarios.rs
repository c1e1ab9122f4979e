//! End-to-end reducer scenarios combining window, warnings and gating.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sithwatch_core::{ButtonGate, Entity, Planet, Reference, ScrollDirection, Slot, SlotIndex, WarningEvaluator, Window, WindowEvent};

fn lord(id: u64, homeworld: u64, master: Option<u64>, apprentice: Option<u64>) -> Arc<Entity> {
	Arc::new(Entity {
		id,
		name: format!("lord-{id}"),
		homeworld: Planet {
			id: homeworld,
			name: format!("planet-{homeworld}"),
		},
		master: Reference { id: master, url: None },
		apprentice: Reference { id: apprentice, url: None },
	})
}

fn load(window: &Window, index: usize, entity: Arc<Entity>) -> Window {
	let index = SlotIndex::new(index).expect("index in range");
	window.reduce(&WindowEvent::DataLoaded { index, entity }).unwrap_or_else(|| window.clone())
}

/// Loads whatever each `Loading` slot asks for until nothing is pending,
/// resolving ids through `chain`.
fn settle(mut window: Window, chain: &[Arc<Entity>]) -> Window {
	loop {
		let Some((index, id)) = window.loading().next() else {
			return window;
		};
		let entity = chain.iter().find(|e| e.id == id).cloned().expect("id in chain");
		window = load(&window, index.get(), entity);
	}
}

fn chain() -> Vec<Arc<Entity>> {
	vec![
		lord(1, 10, None, Some(2)),
		lord(2, 11, Some(1), Some(3)),
		lord(3, 12, Some(2), Some(4)),
		lord(4, 13, Some(3), Some(5)),
		lord(5, 14, Some(4), Some(6)),
		lord(6, 15, Some(5), Some(7)),
		lord(7, 16, Some(6), None),
	]
}

fn ids(window: &Window) -> Vec<Option<u64>> {
	window.slots().iter().map(Slot::id).collect()
}

#[test]
fn seed_fills_the_window_downward() {
	let window = settle(Window::seeded(3), &chain());
	assert_eq!(ids(&window), vec![Some(3), Some(4), Some(5), Some(6), Some(7)]);
	assert!(window.slots().iter().all(|slot| slot.entity().is_some()));
}

#[test]
fn scrolling_walks_the_chain_and_stops_at_both_ends() {
	let chain = chain();
	let mut window = settle(Window::seeded(3), &chain);

	let warnings = WarningEvaluator::new().current();
	assert!(!ButtonGate::is_disabled(&window, &warnings, ScrollDirection::Up));
	assert!(ButtonGate::is_disabled(&window, &warnings, ScrollDirection::Down), "7 has no apprentice");

	window = window.reduce(&WindowEvent::ScrollUp).expect("3 has a master");
	assert_eq!(ids(&window), vec![None, Some(2), Some(3), Some(4), Some(5)]);
	window = settle(window, &chain);
	// Loading 2 at position 1 cascades its master into the empty top slot.
	assert_eq!(ids(&window), vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);

	assert!(ButtonGate::is_disabled(&window, &warnings, ScrollDirection::Up), "1 has no master");
	assert_eq!(window.reduce(&WindowEvent::ScrollUp), None);

	window = window.reduce(&WindowEvent::ScrollDown).expect("5 has an apprentice");
	assert_eq!(ids(&window), vec![Some(3), Some(4), Some(5), Some(6), None]);
	window = settle(window, &chain);
	assert_eq!(ids(&window), vec![Some(3), Some(4), Some(5), Some(6), Some(7)]);
}

#[test]
fn location_match_raises_warning_and_locks_navigation() {
	let chain = chain();
	let window = settle(Window::seeded(2), &chain);
	let mut evaluator = WarningEvaluator::new();

	evaluator.set_location(Planet {
		id: 13,
		name: "planet-13".into(),
	});
	let vector = evaluator.refresh(&window).expect("lord 4 lives on planet 13");
	assert_eq!(vector.flags(), [false, false, true, false, false]);
	assert!(evaluator.any());
	assert!(ButtonGate::is_disabled(&window, &vector, ScrollDirection::Up));
	assert!(ButtonGate::is_disabled(&window, &vector, ScrollDirection::Down));

	evaluator.set_location(Planet {
		id: 99,
		name: "elsewhere".into(),
	});
	let cleared = evaluator.refresh(&window).expect("warning clears");
	assert!(!cleared.any());
	assert!(!ButtonGate::is_disabled(&window, &cleared, ScrollDirection::Up));
	assert!(!ButtonGate::is_disabled(&window, &cleared, ScrollDirection::Down));
}

#[test]
fn stale_result_lands_at_its_original_position() {
	// A fetch issued for position 1 before a scroll can still complete after
	// it; its entity is written to position 1 regardless of what moved there.
	let chain = chain();
	let window = Window::from_slots([Slot::Loaded(chain[2].clone()), Slot::Loading(4), Slot::Empty, Slot::Empty, Slot::Empty]);
	let scrolled = window.reduce(&WindowEvent::ScrollUp).expect("3 has a master");
	assert_eq!(ids(&scrolled), vec![None, Some(2), Some(3), Some(4), None]);

	let stale = load(&scrolled, 1, chain[3].clone());
	// The stale entity also cascades its master into the empty top slot.
	assert_eq!(ids(&stale), vec![Some(3), Some(4), Some(3), Some(4), None]);
}
