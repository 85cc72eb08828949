use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Bucket name used when the grouping field of a receipt is missing or empty.
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// One row of the hosted `moneyreciept` table.
///
/// Amounts are kept exactly as the provider sent them (text, sometimes a
/// JSON number); use [`Receipt::amounts`] or [`parse_amount`] to get numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "rcdt", deserialize_with = "deserialize_receipt_date")]
    pub date: NaiveDate,
    #[serde(rename = "mrbillno", default, deserialize_with = "deserialize_text")]
    pub bill_no: Option<String>,
    #[serde(rename = "paidby", default, deserialize_with = "deserialize_text")]
    pub payer: Option<String>,
    #[serde(rename = "totalamt", default, deserialize_with = "deserialize_text")]
    pub total_amount: Option<String>,
    #[serde(rename = "discamt", default, deserialize_with = "deserialize_text")]
    pub discount: Option<String>,
    #[serde(rename = "netamt", default, deserialize_with = "deserialize_text")]
    pub net_amount: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub due: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub remarks: Option<String>,
    #[serde(rename = "userid", default, deserialize_with = "deserialize_text")]
    pub user_id: Option<String>,
}

/// Parsed numeric view of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReceiptAmounts {
    pub gross: f64,
    pub discount: f64,
    pub net: f64,
    pub due: f64,
}

impl Receipt {
    /// Minimal receipt for a date, everything else empty.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            bill_no: None,
            payer: None,
            total_amount: None,
            discount: None,
            net_amount: None,
            due: None,
            remarks: None,
            user_id: None,
        }
    }

    pub fn net(&self) -> f64 {
        parse_amount(self.net_amount.as_deref())
    }

    pub fn amounts(&self) -> ReceiptAmounts {
        ReceiptAmounts {
            gross: parse_amount(self.total_amount.as_deref()),
            discount: parse_amount(self.discount.as_deref()),
            net: self.net(),
            due: parse_amount(self.due.as_deref()),
        }
    }

    /// Payment method bucket (the `remarks` column).
    pub fn payment_method(&self) -> &str {
        non_empty_or_unknown(self.remarks.as_deref())
    }

    /// Cashier bucket (the `userid` column).
    pub fn user(&self) -> &str {
        non_empty_or_unknown(self.user_id.as_deref())
    }
}

fn non_empty_or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN_BUCKET,
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a number: {0:?}")]
    Invalid(String),
    #[error("amount is not finite: {0:?}")]
    NotFinite(String),
}

/// Strict conversion of a provider amount to `f64`.
pub fn try_parse_amount(raw: &str) -> Result<f64, AmountParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountParseError::Empty);
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| AmountParseError::Invalid(raw.to_string()))?;
    if !value.is_finite() {
        return Err(AmountParseError::NotFinite(raw.to_string()));
    }
    Ok(value)
}

/// Zero-default amount policy used by every aggregation: a missing, empty,
/// unparsable or non-finite amount counts as `0.0`.
///
/// ```
/// use contracts::dashboards::d402_receipt_analytics::parse_amount;
/// assert_eq!(parse_amount(Some(" 125.50 ")), 125.5);
/// assert_eq!(parse_amount(Some("n/a")), 0.0);
/// assert_eq!(parse_amount(None), 0.0);
/// ```
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|r| try_parse_amount(r).ok()).unwrap_or(0.0)
}

/// Inclusive date window applied to the `rcdt` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceiptFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

impl ReceiptFilter {
    pub fn new(date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> Self {
        Self { date_from, date_to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.date_from.is_none() && self.date_to.is_none()
    }

    /// Window of the same length that ends the day before `date_from`.
    /// Only defined for a closed, non-inverted window that does not run past
    /// the smallest representable date.
    pub fn previous_period(&self) -> Option<ReceiptFilter> {
        let (from, to) = (self.date_from?, self.date_to?);
        if from > to {
            return None;
        }
        let days = (to - from).num_days().checked_add(1)?;
        let prev_to = from.checked_sub_signed(Duration::days(1))?;
        let prev_from = from.checked_sub_signed(Duration::try_days(days)?)?;
        Some(ReceiptFilter::new(Some(prev_from), Some(prev_to)))
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn deserialize_receipt_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    // timestamp columns come back as "2024-01-02T00:00:00+00:00"
    let date_part = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}
