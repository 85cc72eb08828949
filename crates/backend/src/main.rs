pub mod dashboards;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use shared::app_state::AppState;
use shared::data::{PostgrestReceiptClient, ReceiptSource};
use shared::realtime::{ReceiptChangeFeed, ReceiptChangeHub};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    tracing::info!(
        "Receipts store: {} (table {})",
        config.supabase.url,
        config.supabase.table
    );

    let source: Arc<dyn ReceiptSource> = Arc::new(PostgrestReceiptClient::new(&config.supabase)?);
    let changes = ReceiptChangeHub::new();
    let _listener =
        shared::realtime::start(&config.realtime, &config.supabase.table, changes.clone()).await;
    let _change_log = changes.subscribe(Box::new(|event| {
        tracing::info!("Receipt change: {:?} on {}", event.event_type, event.table);
    }));

    let state = AppState {
        source,
        changes,
        dashboard: config.dashboard.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure_routes(state)
        .fallback_service(ServeDir::new("dist"))
        .layer(middleware::from_fn(system::middleware::request_logger::request_logger))
        .layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], config.server.port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", config.server.port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
