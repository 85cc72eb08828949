// Dashboard handlers
pub mod d402_receipt_analytics;
