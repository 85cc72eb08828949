use contracts::dashboards::d402_receipt_analytics::{
    ReceiptDashboardRequest, ReceiptDashboardResponse,
};
use gloo_net::http::Request;

use crate::shared::api_utils::api_url;

const API_BASE: &str = "/api/d402";

fn dashboard_path(request: &ReceiptDashboardRequest) -> Result<String, String> {
    let query = serde_qs::to_string(request)
        .map_err(|e| format!("Failed to encode query: {}", e))?;
    if query.is_empty() {
        Ok(format!("{}/dashboard", API_BASE))
    } else {
        Ok(format!("{}/dashboard?{}", API_BASE, query))
    }
}

/// Получить данные дашборда за период.
///
/// Ошибка хранилища приходит как 502 с текстом в теле, его и показываем.
pub async fn get_dashboard(
    request: &ReceiptDashboardRequest,
) -> Result<ReceiptDashboardResponse, String> {
    let url = api_url(&dashboard_path(request)?);

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        return Err(if message.trim().is_empty() {
            format!("HTTP error: {}", status)
        } else {
            message
        });
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// URL of the Server-Sent Events stream with receipt changes
pub fn events_url() -> String {
    api_url(&format!("{}/events", API_BASE))
}
