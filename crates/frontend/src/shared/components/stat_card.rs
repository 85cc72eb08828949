use contracts::shared::format::format_trend;
use leptos::prelude::*;

/// Badge for a change percentage: (text, css class)
fn trend_badge(pct: f64) -> (String, &'static str) {
    let cls = if pct > 0.0 {
        "stat-card__change stat-card__change--up"
    } else if pct < 0.0 {
        "stat-card__change stat-card__change--down"
    } else {
        "stat-card__change stat-card__change--flat"
    };
    (format_trend(pct), cls)
}

#[component]
pub fn StatCard(
    /// Label displayed above the value
    #[prop(into)]
    label: String,
    /// Already formatted value
    #[prop(into)]
    value: String,
    /// Change % relative to the previous period, no badge when absent
    #[prop(default = None)]
    trend: Option<f64>,
) -> impl IntoView {
    let change_view = trend.map(|pct| {
        let (text, cls) = trend_badge(pct);
        view! { <span class=cls title="vs previous period">{text}</span> }
    });

    view! {
        <div class="stat-card">
            <div class="stat-card__content">
                <div class="stat-card__label">{label}</div>
                <div class="stat-card__value">
                    {value}
                    {change_view}
                </div>
            </div>
        </div>
    }
}
