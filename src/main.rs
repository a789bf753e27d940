// library system

mod catalog;
mod config;
mod error;
mod handlers;
mod session;
mod sql;
mod types;
mod views;

#[cfg(test)]
mod tests;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handlers::AppState;

fn init_tracing() {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info,library_web=debug,tower_http=debug".into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	init_tracing();

	let config = Config::from_env()?;

	// set up connection pool
	let pool = sql::connect(&config).await?;
	sql::bootstrap(&pool, config.seed_demo).await?;

	let app = handlers::router(AppState::new(pool, config.session_cookie.clone()));

	let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
	tracing::info!(address = %config.bind_address(), "Listening");
	axum::serve(listener, app).await?;

	Ok(())
}
