//! Terminal control input.
//!
//! Each line is a command (`up`, `down`, `quit`) or, when the location feed
//! shares standard input, a `{"id": .., "name": ..}` location record.

use std::io::BufRead;
use std::str::FromStr;

use sithwatch_core::{Planet, ScrollDirection};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
	Scroll(ScrollDirection),
	Quit,
	Location(Planet),
	Blank,
}

/// Parses one control line. Unknown words and malformed records are errors.
pub fn parse_line(line: &str) -> Result<Input, String> {
	let line = line.trim();
	if line.is_empty() {
		return Ok(Input::Blank);
	}
	if line.starts_with('{') {
		return serde_json::from_str(line).map(Input::Location).map_err(|err| format!("bad location record: {err}"));
	}
	match line.to_ascii_lowercase().as_str() {
		"q" | "quit" | "exit" => Ok(Input::Quit),
		"k" | "u" => Ok(Input::Scroll(ScrollDirection::Up)),
		"j" | "d" => Ok(Input::Scroll(ScrollDirection::Down)),
		word => ScrollDirection::from_str(word).map(Input::Scroll).map_err(|_| format!("unknown command {word:?}")),
	}
}

/// Reads `reader` line by line, forwarding commands to `controls` and
/// location records to `locations` when present. Ends at end of input or
/// once the control receiver is gone.
///
/// Blocks the calling thread; run it off the runtime.
pub fn route<R>(reader: R, controls: mpsc::UnboundedSender<Input>, locations: Option<mpsc::UnboundedSender<Planet>>) -> std::io::Result<()>
where
	R: BufRead,
{
	for line in reader.lines() {
		let line = line?;
		let input = match parse_line(&line) {
			Ok(input) => input,
			Err(reason) => {
				tracing::warn!(%reason, "control.ignored");
				continue;
			}
		};
		match input {
			Input::Blank => {}
			Input::Location(planet) => match &locations {
				Some(tx) => {
					let _ = tx.send(planet);
				}
				None => tracing::warn!(planet = planet.id, "control.location.ignored"),
			},
			other => {
				if controls.send(other).is_err() {
					break;
				}
			}
		}
	}
	Ok(())
}
