//! Entity lookup collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sithwatch_core::{Entity, EntityId};

use crate::error::FetchError;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpEntityFetcher;

/// Point lookup of one entity record by id.
///
/// Called once per `Loading` position; the loader never retries a failure.
#[async_trait]
pub trait EntityFetcher: Send + Sync + 'static {
	async fn fetch(&self, id: EntityId) -> Result<Entity, FetchError>;
}

#[async_trait]
impl<T> EntityFetcher for Arc<T>
where
	T: EntityFetcher + ?Sized,
{
	async fn fetch(&self, id: EntityId) -> Result<Entity, FetchError> {
		(**self).fetch(id).await
	}
}

/// Fetcher answering from an in-memory table. Unknown ids fail with
/// [`FetchError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct StaticEntityFetcher {
	entities: HashMap<EntityId, Entity>,
}

impl StaticEntityFetcher {
	pub fn new(entities: impl IntoIterator<Item = Entity>) -> Self {
		Self {
			entities: entities.into_iter().map(|entity| (entity.id, entity)).collect(),
		}
	}

	/// Reads a JSON array of entity records.
	pub fn from_json(input: &str) -> Result<Self, FetchError> {
		let entities: Vec<Entity> = serde_json::from_str(input).map_err(|err| FetchError::Decode(err.to_string()))?;
		Ok(Self::new(entities))
	}

	pub fn len(&self) -> usize {
		self.entities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}
}

#[async_trait]
impl EntityFetcher for StaticEntityFetcher {
	async fn fetch(&self, id: EntityId) -> Result<Entity, FetchError> {
		self.entities.get(&id).cloned().ok_or(FetchError::NotFound(id))
	}
}
