use async_trait::async_trait;
use contracts::dashboards::d402_receipt_analytics::{Receipt, ReceiptFilter};
use thiserror::Error;

/// Ошибка обращения к хранилищу чеков
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("Receipts store is unreachable: {0}")]
    Transport(String),

    #[error("Receipts store returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Failed to decode receipts: {0}")]
    Decode(String),
}

/// Источник чеков (таблица `moneyreciept` во внешнем хранилище)
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// All receipts of the window, newest first
    async fn fetch_receipts(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>, DataAccessError>;
}
