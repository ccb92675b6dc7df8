use std::sync::OnceLock;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;
use crate::services::response::ServiceError;

pub fn config() -> Result<&'static Config, ServiceError> {
	static CONFIG: OnceLock<Config> = OnceLock::new();
	let config = match CONFIG.get() {
		None => {
			let config = Config::new()?;

			CONFIG.get_or_init(|| config)
		}
		Some(config) => config,
	};
	Ok(config)
}

pub async fn connection_pool() -> Result<&'static PgPool, ServiceError> {
	static POOL: OnceLock<PgPool> = OnceLock::new();

	let p = match POOL.get() {
		None => {
			let config = config()?;
			let pool = PgPoolOptions::new()
				.max_connections(config.database_max_connections)
				.connect(&config.database_url)
				.await?;
			POOL.get_or_init(|| pool)
		}
		Some(pool) => pool,
	};
	Ok(p)
}
