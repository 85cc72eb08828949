use leptos::prelude::*;

pub const CHART_WIDTH: f64 = 800.0;
pub const CHART_HEIGHT: f64 = 260.0;
/// Отступ сверху, чтобы пик графика не упирался в край
const TOP_PADDING: f64 = 10.0;

/// Вид графика выручки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartType {
    #[default]
    Area,
    Line,
    Bar,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Area, ChartType::Line, ChartType::Bar];

    pub fn value(&self) -> &'static str {
        match self {
            ChartType::Area => "area",
            ChartType::Line => "line",
            ChartType::Bar => "bar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Area => "Area",
            ChartType::Line => "Line",
            ChartType::Bar => "Bar",
        }
    }

    pub fn from_value(value: &str) -> Self {
        match value {
            "line" => ChartType::Line,
            "bar" => ChartType::Bar,
            _ => ChartType::Area,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0_f64, f64::max)
}

fn scale_y(value: f64, max: f64, height: f64) -> f64 {
    if max <= 0.0 {
        return height;
    }
    let usable = height - TOP_PADDING;
    height - (value.max(0.0) / max) * usable
}

/// Points spread evenly over the width; a single value sits in the middle
pub fn line_points(values: &[f64], width: f64, height: f64) -> Vec<(f64, f64)> {
    let max = max_value(values);
    match values.len() {
        0 => Vec::new(),
        1 => vec![(width / 2.0, scale_y(values[0], max, height))],
        n => {
            let step = width / (n - 1) as f64;
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64 * step, scale_y(*v, max, height)))
                .collect()
        }
    }
}

pub fn svg_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Closed polygon: the line plus both corners of the baseline
pub fn area_points(points: &[(f64, f64)], height: f64) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return String::new();
    };
    let mut closed = Vec::with_capacity(points.len() + 2);
    closed.push((first.0, height));
    closed.extend_from_slice(points);
    closed.push((last.0, height));
    svg_points(&closed)
}

pub fn bar_rects(values: &[f64], width: f64, height: f64) -> Vec<BarRect> {
    if values.is_empty() {
        return Vec::new();
    }
    let max = max_value(values);
    let slot = width / values.len() as f64;
    let bar_width = slot * 0.7;

    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let y = scale_y(*v, max, height);
            BarRect {
                x: i as f64 * slot + (slot - bar_width) / 2.0,
                y,
                width: bar_width,
                height: height - y,
            }
        })
        .collect()
}

/// SVG-график ряда значений в выбранном виде
#[component]
pub fn SeriesChart(
    values: Vec<f64>,
    #[prop(into)] chart_type: Signal<ChartType>,
    /// CSS color of the series
    #[prop(into)]
    color: String,
) -> impl IntoView {
    let view_box = format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT);

    let shape = move || {
        let color = color.clone();
        match chart_type.get() {
            ChartType::Bar => {
                let bars = bar_rects(&values, CHART_WIDTH, CHART_HEIGHT);
                view! {
                    <g fill=color>
                        {bars
                            .into_iter()
                            .map(|b| view! {
                                <rect
                                    x=format!("{:.1}", b.x)
                                    y=format!("{:.1}", b.y)
                                    width=format!("{:.1}", b.width)
                                    height=format!("{:.1}", b.height)
                                    rx="2"
                                ></rect>
                            })
                            .collect_view()}
                    </g>
                }
                .into_any()
            }
            ChartType::Line => {
                let points = svg_points(&line_points(&values, CHART_WIDTH, CHART_HEIGHT));
                view! {
                    <polyline points=points fill="none" stroke=color stroke-width="2"></polyline>
                }
                .into_any()
            }
            ChartType::Area => {
                let line = line_points(&values, CHART_WIDTH, CHART_HEIGHT);
                let area = area_points(&line, CHART_HEIGHT);
                let points = svg_points(&line);
                view! {
                    <g>
                        <polygon points=area fill=color.clone() fill-opacity="0.2"></polygon>
                        <polyline points=points fill="none" stroke=color stroke-width="2"></polyline>
                    </g>
                }
                .into_any()
            }
        }
    };

    view! {
        <svg class="d402-chart" viewBox=view_box preserveAspectRatio="none">
            {shape}
        </svg>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_type_values() {
        for chart_type in ChartType::ALL {
            assert_eq!(ChartType::from_value(chart_type.value()), chart_type);
        }
        assert_eq!(ChartType::from_value("pie"), ChartType::Area);
    }

    #[test]
    fn test_line_points_scale_to_max() {
        let points = line_points(&[0.0, 50.0, 100.0], 200.0, 110.0);
        assert_eq!(points, vec![(0.0, 110.0), (100.0, 60.0), (200.0, 10.0)]);
    }

    #[test]
    fn test_line_points_edge_cases() {
        assert!(line_points(&[], 200.0, 100.0).is_empty());
        assert_eq!(line_points(&[5.0], 200.0, 100.0), vec![(100.0, 10.0)]);
        // все нули - линия лежит на оси
        assert_eq!(
            line_points(&[0.0, 0.0], 200.0, 100.0),
            vec![(0.0, 100.0), (200.0, 100.0)]
        );
    }

    #[test]
    fn test_area_points_close_on_baseline() {
        let line = vec![(0.0, 50.0), (100.0, 20.0)];
        assert_eq!(area_points(&line, 100.0), "0.0,100.0 0.0,50.0 100.0,20.0 100.0,100.0");
        assert_eq!(area_points(&[], 100.0), "");
    }

    #[test]
    fn test_bar_rects() {
        let bars = bar_rects(&[100.0, 50.0], 200.0, 110.0);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].height, 100.0);
        assert_eq!(bars[1].height, 50.0);
        assert!((bars[0].width - 70.0).abs() < 1e-9);
        assert!((bars[1].x - 115.0).abs() < 1e-9);
    }
}
