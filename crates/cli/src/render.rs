//! Plain-text rendering of tracker snapshots.

use std::fmt::Write;

use sithwatch_core::{ButtonGate, ScrollDirection, Slot};
use sithwatch_tracker::TrackerSnapshot;

/// One frame: location banner, five slot rows, then the button states.
/// Rows whose homeworld matches the location are marked with `!`.
pub fn render(snapshot: &TrackerSnapshot) -> String {
	let mut out = String::new();
	match &snapshot.location {
		Some(planet) => {
			let _ = writeln!(out, "subject on: {} (#{})", planet.name, planet.id);
		}
		None => out.push_str("subject on: unknown\n"),
	}

	for (index, slot) in snapshot.window.iter() {
		let mark = if snapshot.warnings.get(index) { '!' } else { ' ' };
		let _ = match slot {
			Slot::Empty => writeln!(out, "{mark}[{index}]"),
			Slot::Loading(id) => writeln!(out, "{mark}[{index}] loading #{id}"),
			Slot::Loaded(entity) => writeln!(out, "{mark}[{index}] {} (#{}), homeworld {}", entity.name, entity.id, entity.homeworld.name),
		};
	}

	let state = |direction| {
		if ButtonGate::is_disabled(&snapshot.window, &snapshot.warnings, direction) {
			"disabled"
		} else {
			"enabled"
		}
	};
	let _ = writeln!(out, "up: {}  down: {}", state(ScrollDirection::Up), state(ScrollDirection::Down));
	out
}
