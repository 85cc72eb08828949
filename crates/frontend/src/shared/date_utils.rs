/// Даты для полей ввода и таблиц
use chrono::{Datelike, Duration, NaiveDate};

/// Value of an `<input type="date">` ("YYYY-MM-DD"); empty or invalid means no bound
pub fn parse_input_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// 2024-03-15 -> "15.03.2024"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// 2024-03-15 -> "15 Mar", for chart axes
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%d %b").to_string()
}

/// Первый и последний день месяца
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next_start - Duration::days(1)))
}

/// Month before the one containing `from`; with no `from`, the month before `today`
pub fn previous_month_bounds(from: Option<NaiveDate>, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let anchor = from.unwrap_or(today);
    let (year, month) = if anchor.month() == 1 {
        (anchor.year() - 1, 12)
    } else {
        (anchor.year(), anchor.month() - 1)
    };
    month_bounds(year, month)
}

/// "YYYY-MM-DD" for `<input type="date">`
pub fn to_input_value(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
