mod chart;
mod dashboard;
mod sections;

pub use dashboard::ReceiptAnalyticsDashboard;
