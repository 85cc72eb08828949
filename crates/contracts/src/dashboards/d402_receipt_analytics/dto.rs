use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::receipt::{Receipt, ReceiptFilter};

/// Name of the Server-Sent Event carrying a [`ReceiptChangeEvent`].
pub const RECEIPT_CHANGE_EVENT: &str = "receipt_change";

/// Request for the receipt analytics dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptDashboardRequest {
    /// Inclusive lower bound, "YYYY-MM-DD"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound, "YYYY-MM-DD"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Size of the top users ranking, server default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

impl ReceiptDashboardRequest {
    pub fn filter(&self) -> ReceiptFilter {
        ReceiptFilter::new(self.date_from, self.date_to)
    }
}

/// Response for the receipt analytics dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptDashboardResponse {
    /// Window the data was fetched for
    pub filter: ReceiptFilter,
    pub kpis: KpiSummary,
    /// One point per date, ascending
    pub time_series: Vec<TimeSeriesPoint>,
    /// Payment method buckets in order of first appearance
    pub payment_methods: Vec<PaymentMethodSlice>,
    /// Users sorted by revenue, descending
    pub top_users: Vec<UserRevenue>,
    /// Receipts of the window, newest first
    pub receipts: Vec<Receipt>,
}

/// Scalar indicators of a receipt set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_transactions: usize,
    pub avg_transaction_value: f64,
    pub total_discount: f64,
    pub outstanding_due: f64,
    #[serde(default, skip_serializing_if = "KpiTrends::is_empty")]
    pub trends: KpiTrends,
}

/// Change in % against the previous period, one decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiTrends {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<f64>,
}

impl KpiTrends {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_none() && self.transactions.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    /// Sum of net amounts
    pub revenue: f64,
    /// Sum of gross amounts
    pub total_amount: f64,
    pub transactions: usize,
    pub discount: f64,
}

impl TimeSeriesPoint {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            revenue: 0.0,
            total_amount: 0.0,
            transactions: 0,
            discount: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodSlice {
    pub name: String,
    /// Sum of net amounts
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRevenue {
    pub name: String,
    /// Sum of net amounts
    pub value: f64,
    pub transactions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEventType {
    Insert,
    Update,
    Delete,
}

/// Row change on the receipts table as published by the database trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptChangeEvent {
    #[serde(rename = "type")]
    pub event_type: ChangeEventType,
    #[serde(default)]
    pub table: String,
    /// New row (INSERT/UPDATE)
    #[serde(default)]
    pub record: Option<Value>,
    /// Previous row (UPDATE/DELETE)
    #[serde(default)]
    pub old_record: Option<Value>,
}
