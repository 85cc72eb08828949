use std::sync::Arc;

use crate::shared::config::DashboardConfig;
use crate::shared::data::ReceiptSource;
use crate::shared::realtime::ReceiptChangeHub;

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ReceiptSource>,
    pub changes: ReceiptChangeHub,
    pub dashboard: DashboardConfig,
}
