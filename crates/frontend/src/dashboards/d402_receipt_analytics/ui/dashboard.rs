use crate::dashboards::d402_receipt_analytics::api;
use crate::shared::components::DateRangePicker;
use crate::shared::date_utils::parse_input_date;
use crate::shared::export::export_to_csv;
use contracts::dashboards::d402_receipt_analytics::{
    ExportError, ReceiptChangeEvent, ReceiptDashboardRequest, ReceiptDashboardResponse,
    ReceiptExportRow, DEFAULT_EXPORT_FILENAME, RECEIPT_CHANGE_EVENT,
};
use contracts::shared::fetch_sequence::FetchSequence;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

use super::chart::ChartType;
use super::sections::{
    DailyActivity, KpiCards, PaymentMethods, RecentTransactions, RevenueTrend, TopUsers,
};

type ChangeHandler = Closure<dyn FnMut(MessageEvent)>;

/// Подписка на SSE-поток изменений; каждое изменение увеличивает счётчик перезагрузки
fn open_change_stream(set_reload: WriteSignal<u32>) -> Result<(EventSource, ChangeHandler), String> {
    let source = EventSource::new(&api::events_url())
        .map_err(|e| format!("Failed to open change stream: {:?}", e))?;

    let handler = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let payload = event.data().as_string().unwrap_or_default();
        match serde_json::from_str::<ReceiptChangeEvent>(&payload) {
            Ok(change) => log::debug!(
                "Receipt change {:?} on {}, reloading",
                change.event_type,
                change.table
            ),
            Err(e) => log::warn!("Unreadable receipt change ({}), reloading anyway", e),
        }
        set_reload.update(|n| *n += 1);
    });

    source
        .add_event_listener_with_callback(RECEIPT_CHANGE_EVENT, handler.as_ref().unchecked_ref())
        .map_err(|e| format!("Failed to listen for changes: {:?}", e))?;

    Ok((source, handler))
}

/// Receipt analytics dashboard
#[component]
pub fn ReceiptAnalyticsDashboard() -> impl IntoView {
    // Filters ("YYYY-MM-DD" from the date inputs, empty = no bound)
    let (date_from, set_date_from) = signal(String::new());
    let (date_to, set_date_to) = signal(String::new());
    let chart_type = RwSignal::new(ChartType::default().value().to_string());
    // Bumped by Refresh, Try Again and realtime changes
    let (reload, set_reload) = signal(0_u32);

    // Data state
    let (data, set_data) = signal(None::<ReceiptDashboardResponse>);
    let (loading, set_loading) = signal(false);
    let (refreshing, set_refreshing) = signal(false);
    let (error, set_error) = signal(None::<String>);
    let (notice, set_notice) = signal(None::<String>);

    let sequence = FetchSequence::new();

    // Load data when filters change or a reload is requested
    Effect::new(move |_| {
        let request = ReceiptDashboardRequest {
            date_from: parse_input_date(&date_from.get()),
            date_to: parse_input_date(&date_to.get()),
            top_n: None,
        };
        reload.track();

        let ticket = sequence.begin();
        if data.with_untracked(|d| d.is_some()) {
            set_refreshing.set(true);
        } else {
            set_loading.set(true);
        }

        let sequence = sequence.clone();
        spawn_local(async move {
            let result = api::get_dashboard(&request).await;
            // Более новый запрос уже в пути - этот ответ устарел
            if !sequence.is_current(ticket) {
                log::debug!("D402: discarding stale response");
                return;
            }

            match result {
                Ok(response) => {
                    set_error.set(None);
                    set_data.set(Some(response));
                }
                Err(e) => {
                    log::error!("D402: failed to load dashboard: {}", e);
                    set_data.set(None);
                    set_error.set(Some(e));
                }
            }
            set_loading.set(false);
            set_refreshing.set(false);
        });
    });

    // EventSource and its handler are not Send, store locally
    let change_stream = StoredValue::new_local(None::<(EventSource, ChangeHandler)>);
    match open_change_stream(set_reload) {
        Ok(stream) => change_stream.set_value(Some(stream)),
        Err(e) => log::warn!("D402: realtime updates disabled: {}", e),
    }
    on_cleanup(move || {
        change_stream.update_value(|stream| {
            if let Some((source, _handler)) = stream.take() {
                source.close();
            }
        });
    });

    let on_refresh = move |_| set_reload.update(|n| *n += 1);

    let on_date_change = Callback::new(move |(from, to): (String, String)| {
        set_date_from.set(from);
        set_date_to.set(to);
    });

    let on_export = move |_| {
        let rows: Vec<ReceiptExportRow> = data.with_untracked(|d| {
            d.as_ref()
                .map(|d| d.receipts.iter().map(ReceiptExportRow::from).collect())
                .unwrap_or_default()
        });

        match export_to_csv(&rows, DEFAULT_EXPORT_FILENAME) {
            Ok(()) => set_notice.set(None),
            Err(ExportError::NothingToExport) => {
                set_notice.set(Some("No data to export for the selected period".to_string()))
            }
            Err(e) => {
                log::error!("D402: export failed: {}", e);
                set_notice.set(Some(format!("Export failed: {}", e)));
            }
        }
    };

    let error_screen = move || {
        view! {
            <div class="d402-fullscreen">
                <Flex vertical=true gap=FlexGap::Medium class="d402-error">
                    <MessageBar intent=MessageBarIntent::Error>
                        <div>
                            <strong>"Error Loading Data"</strong>
                            <p>{move || error.get().unwrap_or_default()}</p>
                        </div>
                    </MessageBar>
                    <Button appearance=ButtonAppearance::Primary on_click=on_refresh>
                        "Try Again"
                    </Button>
                </Flex>
            </div>
        }
    };

    view! {
        <div id="d402_receipt_analytics--dashboard" class="d402-dashboard">
            <Show when=move || error.get().is_none() fallback=error_screen>
                <div class="dashboard-header">
                    <h1 class="dashboard-title">"Analytics Dashboard"</h1>
                    <p class="dashboard-subtitle">"Real-time insights and performance metrics"</p>
                </div>

                <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center class="filter-section">
                    <DateRangePicker
                        date_from=Signal::derive(move || date_from.get())
                        date_to=Signal::derive(move || date_to.get())
                        on_change=on_date_change
                    />
                    <Flex gap=FlexGap::Small>
                        <Button
                            appearance=ButtonAppearance::Secondary
                            disabled=move || refreshing.get()
                            loading=move || refreshing.get()
                            on_click=on_refresh
                        >
                            "Refresh"
                        </Button>
                        <Button appearance=ButtonAppearance::Primary on_click=on_export>
                            "Export"
                        </Button>
                    </Flex>
                </Flex>

                {move || notice.get().map(|text| view! {
                    <MessageBar intent=MessageBarIntent::Info>
                        <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center class="d402-notice">
                            <span>{text}</span>
                            <Button
                                size=ButtonSize::Small
                                appearance=ButtonAppearance::Subtle
                                on_click=move |_| set_notice.set(None)
                            >
                                "Dismiss"
                            </Button>
                        </Flex>
                    </MessageBar>
                })}

                {move || match data.get() {
                    Some(d) => view! {
                        <KpiCards kpis=d.kpis />
                        <RevenueTrend points=d.time_series.clone() chart_type=chart_type />
                        <div class="chart-grid">
                            <PaymentMethods slices=d.payment_methods />
                            <TopUsers users=d.top_users />
                        </div>
                        <DailyActivity points=d.time_series />
                        <RecentTransactions receipts=d.receipts />
                    }
                    .into_any(),
                    None if loading.get() => view! {
                        <div class="d402-fullscreen">
                            <Flex gap=FlexGap::Small align=FlexAlign::Center>
                                <Spinner />
                                <span>"Loading analytics data..."</span>
                            </Flex>
                        </div>
                    }
                    .into_any(),
                    None => view! { <></> }.into_any(),
                }}
            </Show>
        </div>
    }
}
