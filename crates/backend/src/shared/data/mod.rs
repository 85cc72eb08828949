pub mod postgrest_client;
pub mod receipt_source;

pub use postgrest_client::PostgrestReceiptClient;
pub use receipt_source::{DataAccessError, ReceiptSource};
