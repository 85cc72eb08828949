//! D402 Receipt Analytics: receipts of the hosted `moneyreciept` table,
//! the aggregations the dashboard renders and the CSV export.

pub mod aggregation;
pub mod dto;
pub mod export;
pub mod receipt;

pub use aggregation::*;
pub use dto::*;
pub use export::*;
pub use receipt::*;
