//! Realtime updates of the receipts table.
//!
//! `pg_listener` turns Postgres notifications into [`ReceiptChangeEvent`]s and
//! publishes them on the [`ReceiptChangeHub`]; consumers subscribe to the hub
//! with a callback or read it as a stream (SSE handler).
//!
//! [`ReceiptChangeEvent`]: contracts::dashboards::d402_receipt_analytics::ReceiptChangeEvent

pub mod change_hub;
pub mod pg_listener;

pub use change_hub::{ChangeCallback, ReceiptChangeFeed, ReceiptChangeHub, ReceiptSubscription};

use tokio::task::JoinHandle;

use crate::shared::config::RealtimeConfig;

/// Start forwarding database notifications to `hub` if realtime is enabled.
///
/// Realtime is optional: a failure here is logged and the service keeps
/// running without push updates.
pub async fn start(
    config: &RealtimeConfig,
    table: &str,
    hub: ReceiptChangeHub,
) -> Option<JoinHandle<()>> {
    if !config.enabled {
        tracing::info!("Realtime updates disabled");
        return None;
    }
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("Realtime enabled but no database_url configured, push updates disabled");
        return None;
    };

    if config.install_trigger {
        if let Err(e) = pg_listener::install_notify_trigger(database_url, table, &config.channel).await {
            tracing::error!("Failed to install notify trigger on {}: {}", table, e);
        }
    }

    match pg_listener::spawn_pg_listener(database_url, &config.channel, hub).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::error!("Failed to start receipt change listener: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_without_database_url_is_disabled() {
        let config = RealtimeConfig {
            enabled: true,
            database_url: None,
            ..RealtimeConfig::default()
        };
        assert!(start(&config, "moneyreciept", ReceiptChangeHub::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_start_when_disabled() {
        let config = RealtimeConfig {
            enabled: false,
            ..RealtimeConfig::default()
        };
        assert!(start(&config, "moneyreciept", ReceiptChangeHub::new()).await.is_none());
    }
}
