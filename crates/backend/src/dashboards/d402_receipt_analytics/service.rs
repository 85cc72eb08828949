use chrono::{DateTime, Utc};
use contracts::dashboards::d402_receipt_analytics::{
    build_dashboard, export_filename, render_csv, ExportError, Receipt, ReceiptDashboardRequest,
    ReceiptDashboardResponse, ReceiptExportRow, ReceiptFilter,
};
use thiserror::Error;

use crate::shared::config::DashboardConfig;
use crate::shared::data::{DataAccessError, ReceiptSource};

/// Rendered CSV ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct CsvDownload {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum ExportFailure {
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Get dashboard data for a window, with trends against the previous period
/// of the same length when the window is closed
pub async fn get_dashboard(
    source: &dyn ReceiptSource,
    request: &ReceiptDashboardRequest,
    config: &DashboardConfig,
) -> Result<ReceiptDashboardResponse, DataAccessError> {
    let filter = request.filter();
    let receipts = source.fetch_receipts(&filter).await?;

    let previous = match filter.previous_period() {
        Some(prev_filter) => source.fetch_receipts(&prev_filter).await?,
        None => Vec::new(),
    };

    let top_n = request.top_n.unwrap_or(config.top_users_limit);
    Ok(build_dashboard(filter, receipts, &previous, top_n))
}

pub async fn list_receipts(
    source: &dyn ReceiptSource,
    filter: &ReceiptFilter,
) -> Result<Vec<Receipt>, DataAccessError> {
    source.fetch_receipts(filter).await
}

/// Render the receipts of a window as CSV
pub async fn export_receipts_csv(
    source: &dyn ReceiptSource,
    filter: &ReceiptFilter,
    base_filename: &str,
    now: DateTime<Utc>,
) -> Result<CsvDownload, ExportFailure> {
    let receipts = source.fetch_receipts(filter).await?;
    let rows: Vec<ReceiptExportRow> = receipts.iter().map(ReceiptExportRow::from).collect();
    let content = render_csv(&rows)?;

    Ok(CsvDownload {
        filename: export_filename(base_filename, now),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::receipt_source::test_double::InMemoryReceiptSource;
    use chrono::{NaiveDate, TimeZone};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn receipt(day: &str, net: &str, user: &str) -> Receipt {
        let mut r = Receipt::new(date(day));
        r.net_amount = Some(net.to_string());
        r.user_id = Some(user.to_string());
        r
    }

    fn source() -> InMemoryReceiptSource {
        InMemoryReceiptSource::new(vec![
            receipt("2024-01-30", "100", "anita"),
            receipt("2024-01-31", "100", "ravi"),
            receipt("2024-02-01", "50", "anita"),
            receipt("2024-02-02", "100", "ravi"),
            receipt("2024-02-02", "150", "kiran"),
        ])
    }

    #[tokio::test]
    async fn test_dashboard_for_closed_window_has_trends() {
        let source = source();
        let request = ReceiptDashboardRequest {
            date_from: Some(date("2024-02-01")),
            date_to: Some(date("2024-02-02")),
            top_n: None,
        };

        let response = get_dashboard(&source, &request, &DashboardConfig::default())
            .await
            .unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(response.kpis.total_revenue, 300.0);
        assert_eq!(response.kpis.total_transactions, 3);
        // previous window 2024-01-30..2024-01-31: 200 over 2 receipts
        assert_eq!(response.kpis.trends.revenue, Some(50.0));
        assert_eq!(response.kpis.trends.transactions, Some(50.0));
        assert_eq!(response.time_series.len(), 2);
        assert_eq!(response.receipts[0].date, date("2024-02-02"));
        assert_eq!(response.top_users[0].name, "kiran");
    }

    #[tokio::test]
    async fn test_dashboard_for_open_window_skips_previous_fetch() {
        let source = source();
        let request = ReceiptDashboardRequest {
            date_from: Some(date("2024-01-31")),
            date_to: None,
            top_n: Some(1),
        };

        let response = get_dashboard(&source, &request, &DashboardConfig::default())
            .await
            .unwrap();

        assert_eq!(source.calls(), 1);
        assert!(response.kpis.trends.is_empty());
        assert_eq!(response.kpis.total_transactions, 4);
        assert_eq!(response.top_users.len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_for_empty_window() {
        let source = source();
        let request = ReceiptDashboardRequest {
            date_from: Some(date("2023-01-01")),
            date_to: Some(date("2023-01-31")),
            top_n: None,
        };

        let response = get_dashboard(&source, &request, &DashboardConfig::default())
            .await
            .unwrap();

        assert_eq!(response.kpis.total_transactions, 0);
        assert_eq!(response.kpis.avg_transaction_value, 0.0);
        assert!(response.time_series.is_empty());
        assert!(response.payment_methods.is_empty());
        assert!(response.top_users.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_propagates_data_access_error() {
        let source = InMemoryReceiptSource::failing("permission denied for table moneyreciept");
        let result = get_dashboard(
            &source,
            &ReceiptDashboardRequest::default(),
            &DashboardConfig::default(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_export_receipts_csv() {
        let source = source();
        let filter = ReceiptFilter::new(Some(date("2024-02-02")), Some(date("2024-02-02")));
        let now = Utc.with_ymd_and_hms(2024, 2, 3, 10, 0, 0).unwrap();

        let download = export_receipts_csv(&source, &filter, "receipts", now)
            .await
            .unwrap();

        assert_eq!(download.filename, "receipts-2024-02-03T10:00:00.000Z.csv");
        let lines: Vec<&str> = download.content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date,Bill No,Patient"));
    }

    #[tokio::test]
    async fn test_export_of_empty_window_is_nothing_to_export() {
        let source = source();
        let filter = ReceiptFilter::new(Some(date("2025-01-01")), None);
        let result = export_receipts_csv(&source, &filter, "receipts", Utc::now()).await;

        assert!(matches!(
            result,
            Err(ExportFailure::Export(ExportError::NothingToExport))
        ));
    }

    #[tokio::test]
    async fn test_list_receipts_newest_first() {
        let source = source();
        let receipts = list_receipts(&source, &ReceiptFilter::default()).await.unwrap();
        assert_eq!(receipts.len(), 5);
        assert!(receipts.windows(2).all(|w| w[0].date >= w[1].date));
    }
}
