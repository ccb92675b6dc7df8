use std::{net::SocketAddr, str::FromStr};

use axum::http::{header, HeaderValue, Method};

use blog::{bootstrap::Bootstrap, dependencies::config, routes::create_routes};
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	println!("Environment Variable Is Being Set...");
	dotenv::dotenv().ok();
	let config = config()?;

	// ! Tracing
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			// axum logs rejections from built-in extractors with the `axum::rejection`
			// target, at `TRACE` level. `axum::rejection=trace` enables showing those events
			format!("blog={},tower_http=debug,axum::rejection=trace", config.log_level).into()
		}))
		.with(tracing_subscriber::fmt::layer())
		.init();

	// ! Connection
	tracing::info!("Connections Are Being Pooled...");
	let state = Bootstrap::app_state().await?;

	let origins = config
		.allow_origins
		.split(',')
		.map(str::trim)
		.filter(|origin| !origin.is_empty())
		.map(HeaderValue::from_str)
		.collect::<Result<Vec<_>, _>>()?;

	let app = create_routes(state)
		.layer(
			CorsLayer::new()
				.allow_origin(AllowOrigin::list(origins))
				.allow_methods([Method::GET, Method::POST])
				.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
		)
		.layer(TraceLayer::new_for_http());

	let addr = SocketAddr::from_str(&config.server_ip_port)?;
	tracing::info!(%addr, "Start Web Server...");
	axum::Server::bind(&addr).serve(app.into_make_service()).await?;
	Ok(())
}
