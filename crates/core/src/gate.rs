use serde::{Deserialize, Serialize};

use crate::warning::WarningVector;
use crate::window::Window;

/// Navigation direction along the lineage chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScrollDirection {
	/// Toward masters (position 0).
	Up,
	/// Toward apprentices (position 4).
	Down,
}

/// Whether the scroll controls may be used.
pub struct ButtonGate;

impl ButtonGate {
	/// A direction is disabled when the end slot cannot continue the chain,
	/// or when any position carries a warning.
	pub fn is_disabled(window: &Window, warnings: &WarningVector, direction: ScrollDirection) -> bool {
		let navigable = match direction {
			ScrollDirection::Up => window.up_target().is_some(),
			ScrollDirection::Down => window.down_target().is_some(),
		};
		!navigable || warnings.any()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use rstest::rstest;

	use super::*;
	use crate::entity::{Entity, Planet, Reference};
	use crate::slot::Slot;

	fn lord(id: u64, master: Option<u64>, apprentice: Option<u64>) -> Slot {
		Slot::Loaded(Arc::new(Entity {
			id,
			name: format!("lord-{id}"),
			homeworld: Planet {
				id: 1,
				name: "Korriban".into(),
			},
			master: Reference { id: master, url: None },
			apprentice: Reference { id: apprentice, url: None },
		}))
	}

	fn navigable_both_ways() -> Window {
		Window::from_slots([
			lord(1, Some(0), Some(2)),
			lord(2, Some(1), Some(3)),
			lord(3, Some(2), Some(4)),
			lord(4, Some(3), Some(5)),
			lord(5, Some(4), Some(6)),
		])
	}

	#[rstest]
	#[case(ScrollDirection::Up)]
	#[case(ScrollDirection::Down)]
	fn enabled_when_the_chain_continues(#[case] direction: ScrollDirection) {
		assert!(!ButtonGate::is_disabled(&navigable_both_ways(), &WarningVector::CLEAR, direction));
	}

	#[rstest]
	#[case(ScrollDirection::Up)]
	#[case(ScrollDirection::Down)]
	fn any_warning_disables_both(#[case] direction: ScrollDirection) {
		let warnings = WarningVector::from_flags([false, false, true, false, false]);
		assert!(ButtonGate::is_disabled(&navigable_both_ways(), &warnings, direction));
	}

	#[test]
	fn initial_window_disables_both() {
		let window = Window::seeded(3616);
		assert!(ButtonGate::is_disabled(&window, &WarningVector::CLEAR, ScrollDirection::Up));
		assert!(ButtonGate::is_disabled(&window, &WarningVector::CLEAR, ScrollDirection::Down));
	}

	#[test]
	fn chain_ends_disable_their_direction_only() {
		let window = Window::from_slots([lord(1, None, Some(2)), Slot::Empty, Slot::Empty, Slot::Empty, lord(5, Some(4), Some(6))]);
		assert!(ButtonGate::is_disabled(&window, &WarningVector::CLEAR, ScrollDirection::Up));
		assert!(!ButtonGate::is_disabled(&window, &WarningVector::CLEAR, ScrollDirection::Down));
	}

	#[rstest]
	#[case("up", ScrollDirection::Up)]
	#[case("DOWN", ScrollDirection::Down)]
	fn parses_direction_names(#[case] raw: &str, #[case] expected: ScrollDirection) {
		assert_eq!(raw.parse::<ScrollDirection>().ok(), Some(expected));
		assert_eq!(expected.to_string(), raw.to_ascii_lowercase());
	}
}
