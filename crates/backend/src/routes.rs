use axum::{routing::get, Router};

use crate::handlers;
use crate::shared::app_state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D402 RECEIPT ANALYTICS DASHBOARD
        // ========================================
        .route(
            "/api/d402/dashboard",
            get(handlers::d402_receipt_analytics::get_dashboard),
        )
        .route(
            "/api/d402/receipts",
            get(handlers::d402_receipt_analytics::list_receipts),
        )
        .route(
            "/api/d402/export",
            get(handlers::d402_receipt_analytics::export_csv),
        )
        .route(
            "/api/d402/events",
            get(handlers::d402_receipt_analytics::receipt_events),
        )
        .with_state(state)
}
