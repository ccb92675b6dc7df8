use std::{sync::Arc, time::Duration};

use tokio::{sync::RwLock, time::Instant};

use crate::{adapters::repositories::ContentStore, domain::post::entity::Category, services::response::ServiceError};

struct Cached {
	categories: Vec<Category>,
	loaded_at: Instant,
}

/// Read-through cache of the category list shown on every page.
#[derive(Clone)]
pub struct CategoryCache {
	slot: Arc<RwLock<Option<Cached>>>,
	ttl: Duration,
}

impl CategoryCache {
	pub fn new(ttl: Duration) -> Self {
		Self {
			slot: Default::default(),
			ttl,
		}
	}

	pub async fn get(
		&self,
		store: &dyn ContentStore,
	) -> Result<Vec<Category>, ServiceError> {
		if let Some(cached) = self.slot.read().await.as_ref().filter(|cached| self.is_fresh(cached)) {
			return Ok(cached.categories.clone());
		}

		let mut slot = self.slot.write().await;
		// Another request may have refilled it while we waited for the lock.
		if let Some(cached) = slot.as_ref().filter(|cached| self.is_fresh(cached)) {
			return Ok(cached.categories.clone());
		}
		let categories = store.categories().await?;
		tracing::debug!(count = categories.len(), "category cache refreshed");
		*slot = Some(Cached {
			categories: categories.clone(),
			loaded_at: Instant::now(),
		});
		Ok(categories)
	}

	fn is_fresh(
		&self,
		cached: &Cached,
	) -> bool {
		cached.loaded_at.elapsed() < self.ttl
	}
}
