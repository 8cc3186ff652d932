use std::net::SocketAddr;

use chrono::Utc;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::signal;
use warp::{reject::Rejection, Filter, Reply};

use crate::{
    config::Config,
    error,
    routes::{
        auth::auth_routes, context::Context, recipes::recipe_routes,
        rejection::handle_rejection,
    },
};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migrations failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server setup failed: {0}")]
    Setup(#[from] error::Error),

    #[error("Failed to bind server: {0}")]
    Bind(#[from] warp::Error),
}

fn health_route() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("health").and(warp::get()).map(|| {
        warp::reply::json(&json!({
            "status": "ok",
            "timestamp": Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
        }))
    })
}

/// The whole HTTP surface: `/health` plus the `/v1` API, with rejection
/// rendering, CORS for the configured client origin and request logging.
pub fn api(context: Context) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let cors = warp::cors()
        .allow_origin(context.config.client_url.as_str())
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type", "authorization"]);

    let v1 = warp::path("v1").and(recipe_routes(context.clone()).or(auth_routes(context)));

    health_route()
        .or(v1)
        .recover(handle_rejection)
        .with(cors)
        .with(warp::log("foody::http"))
}

pub async fn start_server(config: Config) -> Result<(), ServerError> {
    log::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    log::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let context = Context::new(pool, config)?;

    let (address, server) =
        warp::serve(api(context)).try_bind_with_graceful_shutdown(address, shutdown_signal())?;
    log::info!("Server running on {address}");

    server.await;
    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                log::error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
