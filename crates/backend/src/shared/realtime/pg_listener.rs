use contracts::dashboards::d402_receipt_analytics::ReceiptChangeEvent;
use sqlx::postgres::{PgConnection, PgListener};
use sqlx::{Connection, Executor};
use tokio::task::JoinHandle;

use super::change_hub::ReceiptChangeHub;

const NOTIFY_TRIGGER_SQL: &str = include_str!("../../../sql/d402_receipt_notify.sql");

/// Table and channel names are spliced into SQL, keep them plain identifiers
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

pub fn notify_trigger_sql(table: &str, channel: &str) -> anyhow::Result<String> {
    for name in [table, channel] {
        if !is_plain_identifier(name) {
            anyhow::bail!("Invalid identifier for notify trigger: {:?}", name);
        }
    }
    Ok(NOTIFY_TRIGGER_SQL
        .replace("{table}", table)
        .replace("{channel}", channel))
}

/// Create (or replace) the trigger publishing row changes of `table`
pub async fn install_notify_trigger(
    database_url: &str,
    table: &str,
    channel: &str,
) -> anyhow::Result<()> {
    let sql = notify_trigger_sql(table, channel)?;
    let mut conn = PgConnection::connect(database_url).await?;
    conn.execute(sql.as_str()).await?;
    conn.close().await?;
    tracing::info!("Notify trigger installed on {} (channel {})", table, channel);
    Ok(())
}

pub fn decode_notification(payload: &str) -> Result<ReceiptChangeEvent, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Listen on `channel` and forward every notification to the hub.
///
/// The task ends on the first connection error; there is no reconnect.
pub async fn spawn_pg_listener(
    database_url: &str,
    channel: &str,
    hub: ReceiptChangeHub,
) -> anyhow::Result<JoinHandle<()>> {
    let mut listener = PgListener::connect(database_url).await?;
    listener.listen(channel).await?;
    tracing::info!("Listening for receipt changes on channel {}", channel);

    let handle = tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(notification) => match decode_notification(notification.payload()) {
                    Ok(event) => {
                        let delivered = hub.publish(event.clone());
                        tracing::debug!(
                            "Receipt {:?} on {} delivered to {} subscribers",
                            event.event_type,
                            event.table,
                            delivered
                        );
                    }
                    Err(e) => {
                        tracing::warn!("Skipping malformed receipt notification: {}", e);
                    }
                },
                Err(e) => {
                    tracing::error!("Receipt change listener stopped: {}", e);
                    break;
                }
            }
        }
    });

    Ok(handle)
}
