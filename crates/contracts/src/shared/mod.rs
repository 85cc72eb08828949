pub mod fetch_sequence;
pub mod format;
