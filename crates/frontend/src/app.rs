use crate::dashboards::ReceiptAnalyticsDashboard;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="app-main">
            <ReceiptAnalyticsDashboard />
        </main>
    }
}
