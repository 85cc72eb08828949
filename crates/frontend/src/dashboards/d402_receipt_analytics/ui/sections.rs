use contracts::dashboards::d402_receipt_analytics::{
    parse_amount, KpiSummary, PaymentMethodSlice, Receipt, TimeSeriesPoint, UserRevenue,
};
use contracts::shared::format::format_inr;
use leptos::prelude::*;
use thaw::{Select, SelectSize};

use super::chart::{ChartType, SeriesChart};
use crate::shared::components::StatCard;
use crate::shared::date_utils::{format_date, format_short_date};

const PALETTE: [&str; 6] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899",
];

pub fn rupees(value: f64) -> String {
    format!("₹{}", format_inr(value))
}

/// Amount column of the receipts table, unparsable values show as 0
fn rupees_raw(raw: Option<&str>) -> String {
    rupees(parse_amount(raw))
}

/// Доля в процентах от общей суммы, 0 при нулевом итоге
pub fn share_percent(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Ширина полоски относительно максимума, в процентах
fn bar_width_percent(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        0.0
    } else {
        (value / max * 100.0).clamp(0.0, 100.0)
    }
}

#[component]
fn ChartContainer(
    #[prop(into)] title: String,
    #[prop(optional)] actions: Option<AnyView>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="chart-container">
            <div class="chart-container__header">
                <h3 class="chart-container__title">{title}</h3>
                {actions}
            </div>
            {children()}
        </div>
    }
}

#[component]
pub fn KpiCards(kpis: KpiSummary) -> impl IntoView {
    let trends = kpis.trends;
    view! {
        <div class="kpi-grid">
            <StatCard
                label="Total Revenue"
                value=rupees(kpis.total_revenue)
                trend=trends.revenue
            />
            <StatCard
                label="Transactions"
                value=format_inr(kpis.total_transactions as f64)
                trend=trends.transactions
            />
            <StatCard label="Avg Transaction" value=rupees(kpis.avg_transaction_value) />
            <StatCard label="Total Discount" value=rupees(kpis.total_discount) />
            <StatCard label="Outstanding Due" value=rupees(kpis.outstanding_due) />
        </div>
    }
}

#[component]
pub fn RevenueTrend(
    points: Vec<TimeSeriesPoint>,
    /// Selected `ChartType::value()`, shared with the dashboard so the choice
    /// survives data reloads
    chart_type: RwSignal<String>,
) -> impl IntoView {
    let values: Vec<f64> = points.iter().map(|p| p.revenue).collect();
    let first = points.first().map(|p| format_short_date(p.date));
    let last = points.last().map(|p| format_short_date(p.date));
    let selected = Signal::derive(move || ChartType::from_value(&chart_type.get()));

    let selector = view! {
        <Select value=chart_type size=SelectSize::Small>
            {ChartType::ALL
                .into_iter()
                .map(|t| view! { <option value=t.value()>{t.label()}</option> })
                .collect_view()}
        </Select>
    }
    .into_any();

    view! {
        <ChartContainer title="Revenue Trend" actions=selector>
            {if values.is_empty() {
                view! { <div class="chart-empty">"No data for the selected period"</div> }.into_any()
            } else {
                view! {
                    <SeriesChart values=values chart_type=selected color=palette_color(0) />
                    <div class="chart-axis">
                        <span>{first}</span>
                        <span>{last}</span>
                    </div>
                }
                .into_any()
            }}
        </ChartContainer>
    }
}

#[component]
pub fn PaymentMethods(slices: Vec<PaymentMethodSlice>) -> impl IntoView {
    let total: f64 = slices.iter().map(|s| s.value).sum();

    view! {
        <ChartContainer title="Payment Methods Distribution">
            <ul class="share-list">
                {slices
                    .into_iter()
                    .enumerate()
                    .map(|(i, slice)| {
                        let share = share_percent(slice.value, total);
                        let style = format!(
                            "width: {:.1}%; background: {};",
                            share.clamp(0.0, 100.0),
                            palette_color(i)
                        );
                        view! {
                            <li class="share-list__item">
                                <div class="share-list__label">
                                    <span>{slice.name}</span>
                                    <span>{format!("{:.0}%", share)}</span>
                                </div>
                                <div class="share-list__track">
                                    <div class="share-list__bar" style=style></div>
                                </div>
                                <div class="share-list__meta">
                                    {format!("{} · {} receipts", rupees(slice.value), slice.count)}
                                </div>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </ChartContainer>
    }
}

#[component]
pub fn TopUsers(users: Vec<UserRevenue>) -> impl IntoView {
    let max = users.first().map(|u| u.value).unwrap_or(0.0);
    let title = format!("Top {} Users by Revenue", users.len());

    view! {
        <ChartContainer title=title>
            <ul class="rank-list">
                {users
                    .into_iter()
                    .map(|user| {
                        let style = format!("width: {:.1}%;", bar_width_percent(user.value, max));
                        view! {
                            <li class="rank-list__item">
                                <span class="rank-list__name">{user.name}</span>
                                <div class="rank-list__track">
                                    <div class="rank-list__bar" style=style></div>
                                </div>
                                <span class="rank-list__value">{rupees(user.value)}</span>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </ChartContainer>
    }
}

/// Транзакции и скидки по дням
#[component]
pub fn DailyActivity(points: Vec<TimeSeriesPoint>) -> impl IntoView {
    let max_transactions = points.iter().map(|p| p.transactions).max().unwrap_or(0) as f64;

    view! {
        <ChartContainer title="Daily Transactions & Discounts">
            <table class="daily-table">
                <thead>
                    <tr>
                        <th>"Date"</th>
                        <th>"Transactions"</th>
                        <th>"Discount"</th>
                    </tr>
                </thead>
                <tbody>
                    {points
                        .into_iter()
                        .map(|p| {
                            let style = format!(
                                "width: {:.1}%;",
                                bar_width_percent(p.transactions as f64, max_transactions)
                            );
                            view! {
                                <tr>
                                    <td>{format_date(p.date)}</td>
                                    <td>
                                        <div class="daily-table__bar" style=style></div>
                                        <span>{p.transactions}</span>
                                    </td>
                                    <td class="amount amount--discount">{rupees(p.discount)}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </ChartContainer>
    }
}

#[component]
pub fn RecentTransactions(receipts: Vec<Receipt>) -> impl IntoView {
    view! {
        <div class="chart-container">
            <h3 class="chart-container__title">"Recent Transactions"</h3>
            <div class="table-scroll">
                <table class="transactions-table">
                    <thead>
                        <tr>
                            <th>"Date"</th>
                            <th>"Bill No"</th>
                            <th>"Patient"</th>
                            <th>"Amount"</th>
                            <th>"Discount"</th>
                            <th>"Net Amount"</th>
                            <th>"Payment"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {receipts
                            .into_iter()
                            .map(|r| {
                                let method = r.payment_method().to_string();
                                view! {
                                    <tr>
                                        <td>{format_date(r.date)}</td>
                                        <td>{r.bill_no.unwrap_or_default()}</td>
                                        <td>{r.payer.unwrap_or_default()}</td>
                                        <td>{rupees_raw(r.total_amount.as_deref())}</td>
                                        <td class="amount amount--discount">
                                            {rupees_raw(r.discount.as_deref())}
                                        </td>
                                        <td class="amount amount--net">
                                            {rupees_raw(r.net_amount.as_deref())}
                                        </td>
                                        <td><span class="badge">{method}</span></td>
                                    </tr>
                                }
                            })
                            .collect_view()}
                    </tbody>
                </table>
            </div>
        </div>
    }
}
