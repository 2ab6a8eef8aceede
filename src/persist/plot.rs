use std::fmt::Write;

/// One named line on a chart.
pub struct Series<'a> {
    pub label: &'a str,
    pub values: &'a [f64],
}

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 45.0;
const PALETTE: [&str; 4] = ["#1f77b4", "#d62728", "#2ca02c", "#ff7f0e"];

/// Renders an SVG line chart of per-epoch series.
///
/// The x axis is the 0-based epoch index, the y axis the metric value; one
/// polyline per series with a legend in the top-right corner. No plotting
/// dependency: the markup is assembled by hand, which keeps the output
/// deterministic and easy to assert on in tests.
pub fn line_chart(title: &str, y_label: &str, series: &[Series]) -> String {
    let max_len = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let (y_min, y_max) = value_range(series);

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let x_span = (max_len.saturating_sub(1)).max(1) as f64;
    let y_span = y_max - y_min;

    let x_at = |epoch: usize| MARGIN_LEFT + epoch as f64 / x_span * plot_w;
    let y_at = |value: f64| MARGIN_TOP + (y_max - value) / y_span * plot_h;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    );
    let _ = write!(svg, r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#);
    let _ = write!(
        svg,
        r#"<text x="{}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    );

    // Axes.
    let x0 = MARGIN_LEFT;
    let y0 = MARGIN_TOP + plot_h;
    let _ = write!(
        svg,
        r#"<line x1="{x0}" y1="{MARGIN_TOP}" x2="{x0}" y2="{y0}" stroke="black"/>"#
    );
    let _ = write!(
        svg,
        r#"<line x1="{x0}" y1="{y0}" x2="{}" y2="{y0}" stroke="black"/>"#,
        MARGIN_LEFT + plot_w
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="12">Epoch</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        HEIGHT - 8.0
    );
    let _ = write!(
        svg,
        r#"<text x="14" y="{}" text-anchor="middle" font-size="12" transform="rotate(-90 14 {})">{}</text>"#,
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0,
        escape(y_label)
    );

    // Y-axis ticks.
    for tick in 0..=4 {
        let value = y_min + y_span * tick as f64 / 4.0;
        let y = y_at(value);
        let _ = write!(
            svg,
            r#"<line x1="{}" y1="{y}" x2="{x0}" y2="{y}" stroke="black"/>"#,
            x0 - 4.0
        );
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end" font-size="10">{:.3}</text>"#,
            x0 - 7.0,
            y + 3.0,
            value
        );
    }

    // X-axis ticks at a readable stride.
    if max_len > 0 {
        let stride = (max_len / 10).max(1);
        for epoch in (0..max_len).step_by(stride) {
            let x = x_at(epoch);
            let _ = write!(
                svg,
                r#"<line x1="{x}" y1="{y0}" x2="{x}" y2="{}" stroke="black"/>"#,
                y0 + 4.0
            );
            let _ = write!(
                svg,
                r#"<text x="{x}" y="{}" text-anchor="middle" font-size="10">{epoch}</text>"#,
                y0 + 16.0
            );
        }
    }

    // Series polylines.
    for (i, s) in series.iter().enumerate() {
        if s.values.is_empty() {
            continue;
        }
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<String> = s
            .values
            .iter()
            .enumerate()
            .map(|(epoch, &v)| format!("{:.2},{:.2}", x_at(epoch), y_at(v)))
            .collect();
        let _ = write!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="2"/>"#,
            points.join(" ")
        );
    }

    // Legend, top-right inside the plot area.
    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let y = MARGIN_TOP + 14.0 + 16.0 * i as f64;
        let x = MARGIN_LEFT + plot_w - 130.0;
        let _ = write!(
            svg,
            r#"<line x1="{x}" y1="{y}" x2="{}" y2="{y}" stroke="{color}" stroke-width="2"/>"#,
            x + 20.0
        );
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" font-size="11">{}</text>"#,
            x + 26.0,
            y + 4.0,
            escape(s.label)
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Y-range with a little padding; degenerate (flat or empty) data gets a
/// unit band so the projection never divides by zero.
fn value_range(series: &[Series]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in series {
        for &v in s.values {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
