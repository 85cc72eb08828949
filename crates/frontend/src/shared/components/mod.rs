pub mod date_range_picker;
pub mod stat_card;

pub use date_range_picker::DateRangePicker;
pub use stat_card::StatCard;
