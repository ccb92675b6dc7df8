use std::str::FromStr;

use crate::services::response::ServiceError;

pub struct Config {
	/// Which errors we want to log
	pub log_level: String,

	/// Port server is listening to
	pub server_ip_port: String,
	pub database_url: String,
	pub database_max_connections: u32,
	pub allow_origins: String,
	pub session_ttl_hours: i64,
	pub category_cache_ttl_secs: u64,
}

impl Config {
	pub fn new() -> Result<Config, ServiceError> {
		dotenv::dotenv().ok();
		let log_level = std::env::var("LOG_LEVEL").unwrap_or("warn".to_string());
		let server_ip_port = std::env::var("SERVER_IP_PORT").unwrap_or("0.0.0.0:80".into());
		let database_url =
			std::env::var("DATABASE_URL").map_err(|_| ServiceError::Config("DATABASE_URL must be set!".into()))?;
		let allow_origins = std::env::var("ALLOW_ORIGINS").unwrap_or("http://localhost:3000,http://localhost:3001".to_string());

		Ok(Config {
			log_level,
			server_ip_port,
			database_url,
			database_max_connections: parsed_var("DATABASE_MAX_CONNECTIONS", 30)?,
			allow_origins,
			session_ttl_hours: parsed_var("SESSION_TTL_HOURS", 24 * 14)?,
			category_cache_ttl_secs: parsed_var("CATEGORY_CACHE_TTL_SECS", 60)?,
		})
	}

	pub fn session_ttl(&self) -> chrono::Duration {
		chrono::Duration::hours(self.session_ttl_hours)
	}

	pub fn category_cache_ttl(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.category_cache_ttl_secs)
	}
}

fn parsed_var<T: FromStr>(
	name: &str,
	default: T,
) -> Result<T, ServiceError> {
	match std::env::var(name) {
		Ok(raw) => raw.parse().map_err(|_| ServiceError::Config(format!("{name} has an invalid value: {raw}"))),
		Err(_) => Ok(default),
	}
}
