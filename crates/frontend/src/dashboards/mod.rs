pub mod d402_receipt_analytics;

pub use d402_receipt_analytics::ui::ReceiptAnalyticsDashboard;
