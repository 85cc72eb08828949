use async_trait::async_trait;
use contracts::dashboards::d402_receipt_analytics::{Receipt, ReceiptFilter};
use serde::Deserialize;

use super::receipt_source::{DataAccessError, ReceiptSource};
use crate::shared::config::SupabaseConfig;

/// HTTP-клиент PostgREST (Supabase) для таблицы чеков
pub struct PostgrestReceiptClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    table: String,
    date_column: String,
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    details: Option<String>,
}

impl PostgrestReceiptClient {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            table: config.table.clone(),
            date_column: config.date_column.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

/// Query string for a window scan ordered by date, newest first
pub fn build_query(filter: &ReceiptFilter, date_column: &str) -> Vec<(String, String)> {
    let mut query = vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), format!("{}.desc", date_column)),
    ];
    if let Some(from) = filter.date_from {
        query.push((date_column.to_string(), format!("gte.{}", from.format("%Y-%m-%d"))));
    }
    if let Some(to) = filter.date_to {
        query.push((date_column.to_string(), format!("lte.{}", to.format("%Y-%m-%d"))));
    }
    query
}

/// Human readable message out of an error response body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => match err.details {
            Some(details) if !details.is_empty() => format!("{} ({})", err.message, details),
            _ => err.message,
        },
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.to_string(),
    }
}

/// Rows are decoded one by one: a row with a missing or broken `rcdt` is
/// skipped with a warning instead of failing the whole result set
fn decode_receipts(body: &str) -> Result<Vec<Receipt>, DataAccessError> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(500).collect();
        tracing::error!("Failed to parse receipts JSON: {}. Body: {}", e, preview);
        DataAccessError::Decode(e.to_string())
    })?;

    let total = rows.len();
    let receipts: Vec<Receipt> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<Receipt>(row) {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                tracing::warn!("Skipping malformed receipt row #{}: {}", index, e);
                None
            }
        })
        .collect();

    if receipts.len() < total {
        tracing::warn!("Skipped {} of {} receipt rows", total - receipts.len(), total);
    }
    Ok(receipts)
}

#[async_trait]
impl ReceiptSource for PostgrestReceiptClient {
    async fn fetch_receipts(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>, DataAccessError> {
        let url = self.table_url();
        let query = build_query(filter, &self.date_column);
        tracing::debug!("PostgREST request: GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", &self.anon_key))
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error fetching receipts: {}", e);
                DataAccessError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DataAccessError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::error!("Receipts request failed with status {}: {}", status, message);
            return Err(DataAccessError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let receipts = decode_receipts(&body)?;

        tracing::info!(
            "Fetched {} receipts (from: {:?}, to: {:?})",
            receipts.len(),
            filter.date_from,
            filter.date_to
        );
        Ok(receipts)
    }
}
