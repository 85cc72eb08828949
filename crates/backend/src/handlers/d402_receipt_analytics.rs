use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d402_receipt_analytics::{
    ExportError, Receipt, ReceiptDashboardRequest, ReceiptDashboardResponse, ReceiptFilter,
    RECEIPT_CHANGE_EVENT,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

use crate::dashboards::d402_receipt_analytics::service::{self, ExportFailure};
use crate::shared::app_state::AppState;
use crate::shared::data::DataAccessError;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Base of the file name, timestamp and extension are appended
    pub filename: Option<String>,
}

/// Ошибка хранилища отдаётся как 502 с текстом для пользователя
fn data_access_error(e: DataAccessError) -> (StatusCode, String) {
    (StatusCode::BAD_GATEWAY, e.to_string())
}

/// Keep only characters that are safe inside a Content-Disposition header
fn sanitize_filename_base(base: &str) -> String {
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// GET /api/d402/dashboard?date_from=2024-01-01&date_to=2024-01-31&top_n=10
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(request): Query<ReceiptDashboardRequest>,
) -> Result<Json<ReceiptDashboardResponse>, (StatusCode, String)> {
    tracing::info!(
        "D402 Dashboard: Getting receipts analytics for {:?}..{:?}",
        request.date_from,
        request.date_to
    );

    match service::get_dashboard(state.source.as_ref(), &request, &state.dashboard).await {
        Ok(response) => {
            tracing::info!(
                "D402 Dashboard: Returning {} receipts, {} dates, {} payment methods",
                response.receipts.len(),
                response.time_series.len(),
                response.payment_methods.len()
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D402 Dashboard: Failed to get dashboard: {}", e);
            Err(data_access_error(e))
        }
    }
}

/// GET /api/d402/receipts?date_from=2024-01-01&date_to=2024-01-31
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
) -> Result<Json<Vec<Receipt>>, (StatusCode, String)> {
    match service::list_receipts(state.source.as_ref(), &filter).await {
        Ok(receipts) => Ok(Json(receipts)),
        Err(e) => {
            tracing::error!("D402 Dashboard: Failed to list receipts: {}", e);
            Err(data_access_error(e))
        }
    }
}

/// GET /api/d402/export?date_from=2024-01-01&filename=receipts
///
/// 204 when the window has no receipts.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Response {
    let filter = ReceiptFilter::new(params.date_from, params.date_to);
    let base = params
        .filename
        .as_deref()
        .map(sanitize_filename_base)
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| state.dashboard.export_filename.clone());

    match service::export_receipts_csv(state.source.as_ref(), &filter, &base, Utc::now()).await {
        Ok(download) => {
            tracing::info!("D402 Dashboard: Exporting {}", download.filename);
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", download.filename),
                    ),
                ],
                download.content,
            )
                .into_response()
        }
        Err(ExportFailure::Export(ExportError::NothingToExport)) => {
            tracing::info!("D402 Dashboard: No data to export");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(ExportFailure::DataAccess(e)) => {
            tracing::error!("D402 Dashboard: Export failed: {}", e);
            data_access_error(e).into_response()
        }
        Err(e) => {
            tracing::error!("D402 Dashboard: Export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /api/d402/events — Server-Sent Events with every receipt change
pub async fn receipt_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.changes.receiver();
    tracing::info!(
        "D402 Dashboard: Realtime client connected ({} subscribers)",
        state.changes.subscriber_count()
    );

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(change) => match Event::default().event(RECEIPT_CHANGE_EVENT).json_data(&change) {
                    Ok(event) => return Some((Ok::<Event, Infallible>(event), receiver)),
                    Err(e) => tracing::warn!("Failed to encode receipt change: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Realtime client lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::DashboardConfig;
    use crate::shared::data::receipt_source::test_double::InMemoryReceiptSource;
    use crate::shared::realtime::ReceiptChangeHub;
    use axum::body::to_bytes;
    use contracts::dashboards::d402_receipt_analytics::{ChangeEventType, ReceiptChangeEvent};
    use futures::StreamExt;
    use std::sync::Arc;

    fn state_with(source: InMemoryReceiptSource) -> AppState {
        AppState {
            source: Arc::new(source),
            changes: ReceiptChangeHub::new(),
            dashboard: DashboardConfig::default(),
        }
    }

    fn sample_source() -> InMemoryReceiptSource {
        let mut receipt = Receipt::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        receipt.bill_no = Some("MR-1".to_string());
        receipt.net_amount = Some("300.00".to_string());
        InMemoryReceiptSource::new(vec![receipt])
    }

    fn export_params(filename: Option<&str>) -> ExportParams {
        ExportParams {
            date_from: None,
            date_to: None,
            filename: filename.map(str::to_string),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_export_csv_is_attachment() {
        let response = export_csv(
            State(state_with(sample_source())),
            Query(export_params(Some("jan report"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.starts_with("attachment; filename=\"janreport-"));
        assert!(disposition.ends_with("Z.csv\""));

        let body = body_text(response).await;
        assert!(body.starts_with("Date,Bill No,Patient"));
        assert!(body.contains("2024-01-05,MR-1"));
    }

    #[tokio::test]
    async fn test_export_csv_uses_configured_filename() {
        let response = export_csv(
            State(state_with(sample_source())),
            Query(export_params(Some("\"\";"))),
        )
        .await;

        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"analytics-export-"));
    }

    #[tokio::test]
    async fn test_export_csv_empty_window_is_no_content() {
        let response = export_csv(
            State(state_with(InMemoryReceiptSource::new(Vec::new()))),
            Query(export_params(None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    }

    #[tokio::test]
    async fn test_export_csv_store_failure_is_bad_gateway() {
        let response = export_csv(
            State(state_with(InMemoryReceiptSource::failing("JWT expired"))),
            Query(export_params(None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("JWT expired"));
    }

    #[tokio::test]
    async fn test_receipt_events_streams_change_as_named_event() {
        let state = state_with(sample_source());
        let changes = state.changes.clone();

        let response = receipt_events(State(state)).await.into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

        changes.publish(ReceiptChangeEvent {
            event_type: ChangeEventType::Insert,
            table: "moneyreciept".to_string(),
            record: Some(serde_json::json!({"rcdt": "2024-01-05", "netamt": "300.00"})),
            old_record: None,
        });

        let mut frames = response.into_body().into_data_stream();
        let frame = frames.next().await.unwrap().unwrap();
        let text = String::from_utf8(frame.to_vec()).unwrap();

        assert!(text.contains("event: receipt_change\n"));
        assert!(text.contains("data: {"));
        assert!(text.contains("\"type\":\"INSERT\""));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_sanitize_filename_base() {
        assert_eq!(sanitize_filename_base("analytics-export"), "analytics-export");
        assert_eq!(sanitize_filename_base("my \"report\"; x"), "myreportx");
        assert_eq!(sanitize_filename_base("jan_2024.v2"), "jan_2024.v2");
    }

    #[test]
    fn test_data_access_error_is_bad_gateway() {
        let (status, message) = data_access_error(DataAccessError::Transport(
            "connection refused".to_string(),
        ));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(message, "Receipts store is unreachable: connection refused");
    }
}
