/// Format an amount the way `en-IN` locale does: lakh/crore digit groups,
/// at most two fraction digits, trailing zeros dropped.
///
/// ```
/// use contracts::shared::format::format_inr;
/// assert_eq!(format_inr(1234567.5), "12,34,567.5");
/// assert_eq!(format_inr(999.0), "999");
/// ```
pub fn format_inr(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let int_part = cents / 100;
    let frac = cents % 100;

    let mut result = String::new();
    if value < 0.0 && cents > 0 {
        result.push('-');
    }
    result.push_str(&group_indian(int_part));
    if frac != 0 {
        if frac % 10 == 0 {
            result.push_str(&format!(".{}", frac / 10));
        } else {
            result.push_str(&format!(".{:02}", frac));
        }
    }
    result
}

/// Trend badge text, e.g. "+12.5%" / "-3.0%"
pub fn format_trend(percent: f64) -> String {
    if percent > 0.0 {
        format!("+{:.1}%", percent)
    } else {
        format!("{:.1}%", percent)
    }
}

fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
