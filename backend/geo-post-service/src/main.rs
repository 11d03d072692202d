use actix_web::{web, App, HttpServer};
use anyhow::Context;
use geo_post_service::config::Config;
use geo_post_service::db::connect_store;
use geo_post_service::handlers;
use geo_post_service::services::SearchCoordinator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        env = %config.app.env,
        backend = %config.database.backend,
        "Starting geo-post-service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = connect_store(&config.database)
        .await
        .context("failed to open post store")?;
    let coordinator = web::Data::new(SearchCoordinator::new(store, config.search.settings()));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(coordinator.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    tracing::info!("geo-post-service shut down");
    Ok(())
}
