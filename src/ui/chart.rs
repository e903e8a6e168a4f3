//! Grouped bar chart: patient values next to the cohort means, as inline SVG.

use crate::pipeline::reference::ComparisonRow;
use crate::ui::escape_html;

pub const TITLE: &str = "Patient vs Dataset Comparison";
pub const Y_LABEL: &str = "Value";
pub const YOUR_VALUE_LABEL: &str = "Your Value";
pub const DATASET_AVG_LABEL: &str = "Dataset Avg";
pub const YOUR_VALUE_COLOR: &str = "skyblue";
pub const DATASET_AVG_COLOR: &str = "orange";

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;
/// Bar width as a fraction of one metric slot, per bar.
const BAR_WIDTH: f64 = 0.35;

/// Render the comparison chart. Metrics without a cohort mean get only the
/// patient bar.
pub fn render_comparison_chart(rows: &[ComparisonRow]) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_h;

    let peak = rows
        .iter()
        .flat_map(|r| [Some(r.your_value), r.dataset_average])
        .flatten()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    let (y_max, tick) = axis_scale(peak);
    let scale = |v: f64| plot_h * (v.max(0.0) / y_max).min(1.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg class="chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{TITLE}">
<rect x="0" y="0" width="{WIDTH}" height="{HEIGHT}" fill="white"/>
<text x="{cx}" y="28" text-anchor="middle" font-size="16" font-weight="bold">{TITLE}</text>
"#,
        cx = WIDTH / 2.0,
    ));

    // Gridlines and y ticks
    let mut value = 0.0;
    while value <= y_max + tick * 1e-9 {
        let y = baseline - scale(value);
        svg.push_str(&format!(
            r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#e5e5e5"/>
<text x="{tx}" y="{ty:.1}" text-anchor="end" font-size="11">{label}</text>
"##,
            x2 = MARGIN_LEFT + plot_w,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            label = tick_label(value, tick),
        ));
        value += tick;
    }

    // Axes
    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{baseline}" stroke="black"/>
<line x1="{MARGIN_LEFT}" y1="{baseline}" x2="{x2}" y2="{baseline}" stroke="black"/>
<text x="16" y="{ly}" text-anchor="middle" font-size="12" transform="rotate(-90 16 {ly})">{Y_LABEL}</text>
"#,
        x2 = MARGIN_LEFT + plot_w,
        ly = MARGIN_TOP + plot_h / 2.0,
    ));

    // Bars
    let slot = plot_w / rows.len().max(1) as f64;
    let bar_w = slot * BAR_WIDTH;
    for (i, row) in rows.iter().enumerate() {
        let center = MARGIN_LEFT + slot * (i as f64 + 0.5);
        svg.push_str(&bar(
            center - bar_w,
            bar_w,
            baseline,
            scale(row.your_value),
            YOUR_VALUE_COLOR,
            YOUR_VALUE_LABEL,
            row.your_value,
        ));
        if let Some(mean) = row.dataset_average {
            svg.push_str(&bar(
                center,
                bar_w,
                baseline,
                scale(mean),
                DATASET_AVG_COLOR,
                DATASET_AVG_LABEL,
                mean,
            ));
        }
        svg.push_str(&format!(
            r#"<text x="{center:.1}" y="{y}" text-anchor="middle" font-size="12">{metric}</text>
"#,
            y = baseline + 20.0,
            metric = escape_html(row.metric),
        ));
    }

    // Legend
    let lx = MARGIN_LEFT + plot_w - 130.0;
    let ly = MARGIN_TOP + 4.0;
    svg.push_str(&format!(
        r##"<g class="legend">
<rect x="{lx}" y="{ly}" width="126" height="44" fill="white" stroke="#cccccc"/>
<rect x="{sx}" y="{y1}" width="14" height="10" fill="{YOUR_VALUE_COLOR}"/>
<text x="{tx}" y="{t1}" font-size="11">{YOUR_VALUE_LABEL}</text>
<rect x="{sx}" y="{y2}" width="14" height="10" fill="{DATASET_AVG_COLOR}"/>
<text x="{tx}" y="{t2}" font-size="11">{DATASET_AVG_LABEL}</text>
</g>
</svg>
"##,
        sx = lx + 8.0,
        tx = lx + 28.0,
        y1 = ly + 8.0,
        t1 = ly + 17.0,
        y2 = ly + 26.0,
        t2 = ly + 35.0,
    ));

    svg
}

fn bar(
    x: f64,
    width: f64,
    baseline: f64,
    height: f64,
    color: &str,
    series: &str,
    value: f64,
) -> String {
    format!(
        r#"<rect x="{x:.1}" y="{y:.1}" width="{width:.1}" height="{height:.1}" fill="{color}"><title>{series}: {value:.2}</title></rect>
"#,
        y = baseline - height,
    )
}

/// Upper bound and tick step for a y axis starting at zero.
///
/// The step is 1, 2 or 5 times a power of ten, giving at most six ticks
/// above zero.
fn axis_scale(peak: f64) -> (f64, f64) {
    if peak <= 0.0 || !peak.is_finite() {
        return (1.0, 0.2);
    }
    let raw = peak / 5.0;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    let top = (peak / step).ceil() * step;
    (top, step)
}

fn tick_label(value: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
