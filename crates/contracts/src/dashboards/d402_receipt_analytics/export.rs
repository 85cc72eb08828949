use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use std::string::FromUtf8Error;
use thiserror::Error;

use super::receipt::Receipt;

pub const DEFAULT_EXPORT_FILENAME: &str = "analytics-export";

#[derive(Debug, Error)]
pub enum ExportError {
    /// Informational: the record set is empty, nothing is written
    #[error("No data to export")]
    NothingToExport,
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
    #[error("Download failed: {0}")]
    Download(String),
}

/// Receipt row in the column layout users get in the exported file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptExportRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Bill No")]
    pub bill_no: Option<String>,
    #[serde(rename = "Patient")]
    pub payer: Option<String>,
    #[serde(rename = "Amount")]
    pub total_amount: Option<String>,
    #[serde(rename = "Discount")]
    pub discount: Option<String>,
    #[serde(rename = "Net Amount")]
    pub net_amount: Option<String>,
    #[serde(rename = "Payment Method")]
    pub payment_method: Option<String>,
}

impl From<&Receipt> for ReceiptExportRow {
    fn from(receipt: &Receipt) -> Self {
        Self {
            date: receipt.date,
            bill_no: receipt.bill_no.clone(),
            payer: receipt.payer.clone(),
            total_amount: receipt.total_amount.clone(),
            discount: receipt.discount.clone(),
            net_amount: receipt.net_amount.clone(),
            payment_method: receipt.remarks.clone(),
        }
    }
}

/// Render records as comma separated text.
///
/// The header row is taken from the field names of `T`. Fields containing a
/// comma, a quote or a line break are quoted, inner quotes doubled.
pub fn render_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// `<base>-<ISO 8601 UTC timestamp>.csv`
pub fn export_filename(base: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}.csv",
        base,
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
