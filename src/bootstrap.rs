use std::sync::Arc;

use crate::adapters::repositories::{ContentStore, PostRepository};
use crate::common::category_cache::CategoryCache;
use crate::dependencies::{config, connection_pool};
use crate::services::response::ServiceError;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
	pub store: Arc<dyn ContentStore>,
	pub categories: CategoryCache,
	pub session_ttl: chrono::Duration,
}

impl AppState {
	pub fn new(
		store: Arc<dyn ContentStore>,
		category_cache_ttl: std::time::Duration,
		session_ttl: chrono::Duration,
	) -> Self {
		Self {
			store,
			categories: CategoryCache::new(category_cache_ttl),
			session_ttl,
		}
	}
}

pub struct Bootstrap;
impl Bootstrap {
	/// Connects to Postgres, brings the schema up to date and wires the state.
	pub async fn app_state() -> Result<AppState, ServiceError> {
		let config = config()?;
		let pool = connection_pool().await?;

		sqlx::migrate!("./migrations").run(pool).await?;
		tracing::info!("Database migrations applied");

		Ok(AppState::new(
			Arc::new(PostRepository::new(pool.clone())),
			config.category_cache_ttl(),
			config.session_ttl(),
		))
	}
}
