use chrono::{Datelike, Utc};
use leptos::prelude::*;
use thaw::*;

use crate::shared::date_utils::{month_bounds, parse_input_date, previous_month_bounds, to_input_value};

/// DateRangePicker - два поля дат и кнопки быстрого выбора (предыдущий месяц,
/// текущий месяц, сброс). Пустое поле означает открытую границу.
#[component]
pub fn DateRangePicker(
    /// Значение даты "от" в формате yyyy-mm-dd
    #[prop(into)]
    date_from: Signal<String>,

    /// Значение даты "до" в формате yyyy-mm-dd
    #[prop(into)]
    date_to: Signal<String>,

    /// Callback при изменении диапазона дат (from, to)
    on_change: Callback<(String, String)>,

    /// Опциональная метка для компонента
    #[prop(optional, into)]
    label: Option<String>,
) -> impl IntoView {
    let on_from_change = move |new_from: String| {
        on_change.run((new_from, date_to.get_untracked()));
    };

    let on_to_change = move |new_to: String| {
        on_change.run((date_from.get_untracked(), new_to));
    };

    // Предыдущий месяц относительно текущей даты "от"
    let on_previous_month = move |_| {
        let from = parse_input_date(&date_from.get_untracked());
        if let Some((start, end)) = previous_month_bounds(from, Utc::now().date_naive()) {
            on_change.run((to_input_value(start), to_input_value(end)));
        }
    };

    let on_current_month = move |_| {
        let today = Utc::now().date_naive();
        if let Some((start, end)) = month_bounds(today.year(), today.month()) {
            on_change.run((to_input_value(start), to_input_value(end)));
        }
    };

    let on_clear = move |_| on_change.run((String::new(), String::new()));

    view! {
        <Flex vertical=true gap=FlexGap::Small>
            {label.map(|l| view! { <Label>{l}</Label> })}

            <Flex class="date-range-picker" align=FlexAlign::Center gap=FlexGap::Small>
                <input
                    type="date"
                    class="date-range-picker__input"
                    prop:value=date_from
                    on:change=move |ev| on_from_change(event_target_value(&ev))
                />
                <div>"to"</div>
                <input
                    type="date"
                    class="date-range-picker__input"
                    prop:value=date_to
                    on:change=move |ev| on_to_change(event_target_value(&ev))
                />
                <ButtonGroup>
                    <Button
                        size=ButtonSize::Small
                        appearance=ButtonAppearance::Subtle
                        on_click=on_previous_month
                    >
                        "-1M"
                    </Button>
                    <Button
                        size=ButtonSize::Small
                        appearance=ButtonAppearance::Subtle
                        on_click=on_current_month
                    >
                        "0M"
                    </Button>
                    <Button
                        size=ButtonSize::Small
                        appearance=ButtonAppearance::Subtle
                        on_click=on_clear
                    >
                        "Clear"
                    </Button>
                </ButtonGroup>
            </Flex>
        </Flex>
    }
}
