use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use super::dto::{
    KpiSummary, KpiTrends, PaymentMethodSlice, ReceiptDashboardResponse, TimeSeriesPoint,
    UserRevenue,
};
use super::receipt::{Receipt, ReceiptFilter};

/// Default size of the top users ranking
pub const DEFAULT_TOP_USERS: usize = 10;

/// Calculate KPIs, with trends against `previous` when it is not empty
pub fn calculate_kpis(data: &[Receipt], previous: &[Receipt]) -> KpiSummary {
    if data.is_empty() {
        return KpiSummary::default();
    }

    let mut total_revenue = 0.0;
    let mut total_discount = 0.0;
    let mut outstanding_due = 0.0;
    for receipt in data {
        let amounts = receipt.amounts();
        total_revenue += amounts.net;
        total_discount += amounts.discount;
        outstanding_due += amounts.due;
    }

    let total_transactions = data.len();

    KpiSummary {
        total_revenue,
        total_transactions,
        avg_transaction_value: total_revenue / total_transactions as f64,
        total_discount,
        outstanding_due,
        trends: calculate_trends(total_revenue, total_transactions, previous),
    }
}

fn calculate_trends(revenue: f64, transactions: usize, previous: &[Receipt]) -> KpiTrends {
    if previous.is_empty() {
        return KpiTrends::default();
    }

    let prev_revenue: f64 = previous.iter().map(Receipt::net).sum();
    let prev_transactions = previous.len() as f64;

    KpiTrends {
        revenue: percent_change(revenue, prev_revenue),
        transactions: percent_change(transactions as f64, prev_transactions),
    }
}

/// Change in % rounded to one decimal, `None` when the base is zero
fn percent_change(current: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    let change = (current - base) / base * 100.0;
    Some((change * 10.0).round() / 10.0)
}

/// Group receipts by date, ascending. Dates without receipts are not filled in.
pub fn prepare_time_series(data: &[Receipt]) -> Vec<TimeSeriesPoint> {
    let mut by_date: BTreeMap<NaiveDate, TimeSeriesPoint> = BTreeMap::new();

    for receipt in data {
        let amounts = receipt.amounts();
        let point = by_date
            .entry(receipt.date)
            .or_insert_with(|| TimeSeriesPoint::empty(receipt.date));
        point.revenue += amounts.net;
        point.total_amount += amounts.gross;
        point.transactions += 1;
        point.discount += amounts.discount;
    }

    by_date.into_values().collect()
}

/// Group receipts by payment method (`remarks`), in order of first appearance
pub fn prepare_payment_methods(data: &[Receipt]) -> Vec<PaymentMethodSlice> {
    let mut slices: Vec<PaymentMethodSlice> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for receipt in data {
        let method = receipt.payment_method();
        let pos = match index.get(method) {
            Some(&pos) => pos,
            None => {
                index.insert(method.to_string(), slices.len());
                slices.push(PaymentMethodSlice {
                    name: method.to_string(),
                    value: 0.0,
                    count: 0,
                });
                slices.len() - 1
            }
        };
        slices[pos].value += receipt.net();
        slices[pos].count += 1;
    }

    slices
}

/// Top `limit` users by net revenue. Ties keep the order in which the users
/// first appear in `data`.
pub fn prepare_top_users(data: &[Receipt], limit: usize) -> Vec<UserRevenue> {
    let mut users: Vec<UserRevenue> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for receipt in data {
        let user = receipt.user();
        let pos = match index.get(user) {
            Some(&pos) => pos,
            None => {
                index.insert(user.to_string(), users.len());
                users.push(UserRevenue {
                    name: user.to_string(),
                    value: 0.0,
                    transactions: 0,
                });
                users.len() - 1
            }
        };
        users[pos].value += receipt.net();
        users[pos].transactions += 1;
    }

    // sort_by is stable
    users.sort_by(|a, b| b.value.total_cmp(&a.value));
    users.truncate(limit);
    users
}

/// Build the full dashboard payload for one window
pub fn build_dashboard(
    filter: ReceiptFilter,
    receipts: Vec<Receipt>,
    previous: &[Receipt],
    top_n: usize,
) -> ReceiptDashboardResponse {
    ReceiptDashboardResponse {
        filter,
        kpis: calculate_kpis(&receipts, previous),
        time_series: prepare_time_series(&receipts),
        payment_methods: prepare_payment_methods(&receipts),
        top_users: prepare_top_users(&receipts, top_n),
        receipts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn receipt(day: &str, net: &str) -> Receipt {
        let mut r = Receipt::new(date(day));
        r.net_amount = Some(net.to_string());
        r
    }

    fn receipt_full(
        day: &str,
        gross: &str,
        discount: &str,
        net: &str,
        due: &str,
        remarks: Option<&str>,
        user: Option<&str>,
    ) -> Receipt {
        let mut r = receipt(day, net);
        r.total_amount = Some(gross.to_string());
        r.discount = Some(discount.to_string());
        r.due = Some(due.to_string());
        r.remarks = remarks.map(str::to_string);
        r.user_id = user.map(str::to_string);
        r
    }

    fn sample() -> Vec<Receipt> {
        vec![
            receipt_full("2024-01-03", "300", "50", "250", "0", Some("Cash"), Some("anita")),
            receipt_full("2024-01-02", "120", "20", "100", "10", Some("UPI"), Some("ravi")),
            receipt_full("2024-01-02", "60", "0", "60", "0", Some("Cash"), None),
            receipt_full("2024-01-01", "50", "0", "50", "25", None, Some("ravi")),
        ]
    }

    #[test]
    fn test_kpis_for_two_dates() {
        let data = vec![receipt("2024-01-02", "100"), receipt("2024-01-01", "50")];
        let kpis = calculate_kpis(&data, &[]);
        assert_eq!(kpis.total_revenue, 150.0);
        assert_eq!(kpis.total_transactions, 2);
        assert_eq!(kpis.avg_transaction_value, 75.0);
        assert!(kpis.trends.is_empty());
    }

    #[test]
    fn test_kpis_sums() {
        let data = sample();
        let kpis = calculate_kpis(&data, &[]);
        let expected: f64 = data.iter().map(Receipt::net).sum();
        assert_eq!(kpis.total_revenue, expected);
        assert_eq!(kpis.total_revenue, 460.0);
        assert_eq!(kpis.avg_transaction_value, 115.0);
        assert_eq!(kpis.total_discount, 70.0);
        assert_eq!(kpis.outstanding_due, 35.0);
    }

    #[test]
    fn test_empty_input_degrades_to_zero() {
        let kpis = calculate_kpis(&[], &sample());
        assert_eq!(kpis, KpiSummary::default());
        assert_eq!(kpis.avg_transaction_value, 0.0);
        assert!(prepare_time_series(&[]).is_empty());
        assert!(prepare_payment_methods(&[]).is_empty());
        assert!(prepare_top_users(&[], DEFAULT_TOP_USERS).is_empty());
    }

    #[test]
    fn test_invalid_amounts_count_as_zero() {
        let data = vec![receipt("2024-01-01", "abc"), receipt("2024-01-01", "40")];
        let kpis = calculate_kpis(&data, &[]);
        assert_eq!(kpis.total_revenue, 40.0);
        assert_eq!(kpis.total_transactions, 2);
        assert_eq!(kpis.avg_transaction_value, 20.0);
    }

    #[test]
    fn test_trends_against_previous_period() {
        let current = vec![receipt("2024-02-01", "150"), receipt("2024-02-02", "150")];
        let previous = vec![receipt("2024-01-31", "200")];
        let kpis = calculate_kpis(&current, &previous);
        assert_eq!(kpis.trends.revenue, Some(50.0));
        assert_eq!(kpis.trends.transactions, Some(100.0));
    }

    #[test]
    fn test_trends_round_to_one_decimal() {
        let current = vec![receipt("2024-02-01", "100")];
        let previous = vec![
            receipt("2024-01-30", "100"),
            receipt("2024-01-30", "100"),
            receipt("2024-01-31", "100"),
        ];
        let kpis = calculate_kpis(&current, &previous);
        // 100 vs 300 => -66.666..%
        assert_eq!(kpis.trends.revenue, Some(-66.7));
        assert_eq!(kpis.trends.transactions, Some(-66.7));
    }

    #[test]
    fn test_revenue_trend_omitted_for_zero_previous_revenue() {
        let current = vec![receipt("2024-02-01", "100")];
        let previous = vec![receipt("2024-01-31", "0"), receipt("2024-01-31", "")];
        let kpis = calculate_kpis(&current, &previous);
        assert_eq!(kpis.trends.revenue, None);
        assert_eq!(kpis.trends.transactions, Some(-50.0));
    }

    #[test]
    fn test_time_series_sorted_ascending() {
        let data = vec![receipt("2024-01-02", "100"), receipt("2024-01-01", "50")];
        let series = prepare_time_series(&data);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date("2024-01-01"));
        assert_eq!(series[0].revenue, 50.0);
        assert_eq!(series[1].date, date("2024-01-02"));
        assert_eq!(series[1].revenue, 100.0);
    }

    #[test]
    fn test_time_series_accumulates_per_date() {
        let series = prepare_time_series(&sample());
        assert_eq!(series.len(), 3);

        let jan2 = &series[1];
        assert_eq!(jan2.date, date("2024-01-02"));
        assert_eq!(jan2.revenue, 160.0);
        assert_eq!(jan2.total_amount, 180.0);
        assert_eq!(jan2.transactions, 2);
        assert_eq!(jan2.discount, 20.0);
    }

    #[test]
    fn test_time_series_total_matches_kpi_revenue() {
        let data = sample();
        let series_total: f64 = prepare_time_series(&data).iter().map(|p| p.revenue).sum();
        assert_eq!(series_total, calculate_kpis(&data, &[]).total_revenue);
    }

    #[test]
    fn test_time_series_has_no_gap_filling() {
        let data = vec![receipt("2024-01-01", "1"), receipt("2024-01-10", "1")];
        let series = prepare_time_series(&data);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_payment_methods_keep_first_appearance_order() {
        let methods = prepare_payment_methods(&sample());
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Cash", "UPI", "Unknown"]);
        assert_eq!(methods[0].value, 310.0);
        assert_eq!(methods[0].count, 2);
    }

    #[test]
    fn test_missing_category_groups_under_unknown() {
        let data = vec![
            receipt("2024-01-01", "10"),
            receipt("2024-01-02", "20"),
            receipt("2024-01-03", "30"),
        ];
        let methods = prepare_payment_methods(&data);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "Unknown");
        assert_eq!(methods[0].count, data.len());
        assert_eq!(methods[0].value, 60.0);
    }

    #[test]
    fn test_top_users_sorted_and_truncated() {
        let data = sample();
        let top = prepare_top_users(&data, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "anita");
        assert_eq!(top[0].value, 250.0);
        assert_eq!(top[1].name, "ravi");
        assert_eq!(top[1].value, 150.0);
        assert_eq!(top[1].transactions, 2);

        let all = prepare_top_users(&data, DEFAULT_TOP_USERS);
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_top_users_ties_keep_grouping_order() {
        let mut a = receipt("2024-01-01", "10");
        a.user_id = Some("b-user".to_string());
        let mut b = receipt("2024-01-01", "10");
        b.user_id = Some("a-user".to_string());
        let mut c = receipt("2024-01-01", "5");
        c.user_id = Some("c-user".to_string());

        let top = prepare_top_users(&[c, a, b], 10);
        let names: Vec<&str> = top.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["b-user", "a-user", "c-user"]);
    }

    #[test]
    fn test_top_users_zero_limit() {
        assert!(prepare_top_users(&sample(), 0).is_empty());
    }

    #[test]
    fn test_build_dashboard() {
        let filter = ReceiptFilter::new(Some(date("2024-01-01")), Some(date("2024-01-03")));
        let response = build_dashboard(filter, sample(), &[], DEFAULT_TOP_USERS);
        assert_eq!(response.filter, filter);
        assert_eq!(response.kpis.total_transactions, 4);
        assert_eq!(response.time_series.len(), 3);
        assert_eq!(response.payment_methods.len(), 3);
        assert_eq!(response.top_users.len(), 3);
        assert_eq!(response.receipts.len(), 4);
    }
}
