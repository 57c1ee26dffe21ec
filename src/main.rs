use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod retriever;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let matcher = web::Data::from(state.matcher);
    let aggregator = web::Data::from(state.aggregator);
    let locator = web::Data::from(state.locator);
    let router = web::Data::from(state.router);
    let environment = web::Data::from(state.environment);
    let cache = web::Data::new(state.cache);

    tracing::info!("Starting Eco Guardian care server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(matcher.clone())
            .app_data(aggregator.clone())
            .app_data(locator.clone())
            .app_data(router.clone())
            .app_data(environment.clone())
            .app_data(cache.clone())
            .configure(api::care::configure)
            .configure(api::environment::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
