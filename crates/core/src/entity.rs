use serde::{Deserialize, Serialize};

/// Numeric identity of an entity in the lineage chain.
pub type EntityId = u64;

/// A planet, used both as an entity's homeworld and as the monitored
/// subject's current location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Planet {
	pub id: u64,
	pub name: String,
}

/// Link to a neighbouring entity. A `None` id ends the chain on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
	pub id: Option<EntityId>,
	#[serde(default)]
	pub url: Option<String>,
}

impl Reference {
	/// A reference to `id` without a URL.
	pub fn to(id: EntityId) -> Self {
		Self { id: Some(id), url: None }
	}

	/// A reference marking the end of the chain.
	pub fn none() -> Self {
		Self::default()
	}
}

/// One member of the lineage chain. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
	pub id: EntityId,
	pub name: String,
	pub homeworld: Planet,
	pub master: Reference,
	pub apprentice: Reference,
}

impl Entity {
	/// Id of the master-ward neighbour, if the chain continues upward.
	pub fn master_id(&self) -> Option<EntityId> {
		self.master.id
	}

	/// Id of the apprentice-ward neighbour, if the chain continues downward.
	pub fn apprentice_id(&self) -> Option<EntityId> {
		self.apprentice.id
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn decodes_lookup_record() {
		let json = r#"{
			"id": 3616,
			"name": "Darth Sidious",
			"homeworld": { "id": 7, "name": "Naboo" },
			"master": { "url": "http://localhost:3000/dark-jedis/2350", "id": 2350 },
			"apprentice": { "url": null, "id": null }
		}"#;
		let entity: Entity = serde_json::from_str(json).expect("record should decode");
		assert_eq!(entity.id, 3616);
		assert_eq!(entity.homeworld, Planet { id: 7, name: "Naboo".into() });
		assert_eq!(entity.master_id(), Some(2350));
		assert_eq!(entity.master.url.as_deref(), Some("http://localhost:3000/dark-jedis/2350"));
		assert_eq!(entity.apprentice_id(), None);
	}

	#[test]
	fn missing_url_defaults_to_none() {
		let reference: Reference = serde_json::from_str(r#"{ "id": 5 }"#).expect("reference should decode");
		assert_eq!(reference, Reference::to(5));
	}

	#[test]
	fn missing_homeworld_is_rejected() {
		let json = r#"{ "id": 1, "name": "x", "master": { "id": null }, "apprentice": { "id": null } }"#;
		assert!(serde_json::from_str::<Entity>(json).is_err());
	}
}
