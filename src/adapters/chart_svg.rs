//! Inline SVG rendering for the three dashboard panels.
//!
//! All panels share one canvas geometry and a time-proportional x axis, so
//! series with different sampling line up in the comparison panel.

use chrono::NaiveDateTime;

use crate::domain::dashboard::{AssetView, ComparisonLine};
use crate::domain::transition::{MarkerShape, TransitionKind};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 320.0;
const PAD_LEFT: f64 = 80.0;
const PAD_RIGHT: f64 = 60.0;
const PAD_TOP: f64 = 30.0;
const PAD_BOTTOM: f64 = 40.0;
const MARKER_SIZE: f64 = 5.0;

const PRICE_COLOR: &str = "gray";
const STRATEGY_COLOR: &str = "#2563eb";
const BUY_HOLD_COLOR: &str = "#ef553b";
const DRAWDOWN_COLOR: &str = "orange";

pub const NO_DATA: &str = "No data available.";

fn plot_width() -> f64 {
    WIDTH - PAD_LEFT - PAD_RIGHT
}

fn plot_height() -> f64 {
    HEIGHT - PAD_TOP - PAD_BOTTOM
}

/// Map `v` in `[min, max]` to a pixel row; a flat range sits mid-plot.
fn y_in(v: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    let frac = if range > 0.0 { (v - min) / range } else { 0.5 };
    HEIGHT - PAD_BOTTOM - frac * plot_height()
}

struct Frame {
    t0: NaiveDateTime,
    t1: NaiveDateTime,
    span_secs: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new<T, V>(times: T, values: V) -> Option<Self>
    where
        T: IntoIterator<Item = NaiveDateTime>,
        V: IntoIterator<Item = f64>,
    {
        let mut times = times.into_iter();
        let first = times.next()?;
        let (t0, t1) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));

        let (y_min, y_max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !y_min.is_finite() {
            return None;
        }

        Some(Frame {
            t0,
            t1,
            span_secs: (t1 - t0).num_seconds() as f64,
            y_min,
            y_max,
        })
    }

    fn x(&self, t: NaiveDateTime) -> f64 {
        let frac = if self.span_secs > 0.0 {
            (t - self.t0).num_seconds() as f64 / self.span_secs
        } else {
            0.5
        };
        PAD_LEFT + frac * plot_width()
    }

    fn y(&self, v: f64) -> f64 {
        y_in(v, self.y_min, self.y_max)
    }
}

fn open_svg(title: &str) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" "#,
            r#"width="100%" role="img" aria-label="{title}">"#,
            r#"<rect width="{w:.0}" height="{h:.0}" fill="white"/>"#,
            r#"<text x="{cx:.0}" y="18" text-anchor="middle" font-size="14" font-weight="bold">{title}</text>"#,
        ),
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        title = title,
    )
}

fn axes(frame: &Frame, y_label: &str, format_value: fn(f64) -> String) -> String {
    let x0 = PAD_LEFT;
    let x1 = WIDTH - PAD_RIGHT;
    let y0 = HEIGHT - PAD_BOTTOM;
    let y1 = PAD_TOP;
    format!(
        concat!(
            r##"<line x1="{x0:.1}" y1="{y0:.1}" x2="{x1:.1}" y2="{y0:.1}" stroke="#333"/>"##,
            r##"<line x1="{x0:.1}" y1="{y0:.1}" x2="{x0:.1}" y2="{y1:.1}" stroke="#333"/>"##,
            r#"<text x="{x0:.1}" y="{ty:.1}" font-size="11">{start}</text>"#,
            r#"<text x="{x1:.1}" y="{ty:.1}" font-size="11" text-anchor="end">{end}</text>"#,
            r#"<text x="{lx:.1}" y="{y1:.1}" font-size="11" text-anchor="end">{max}</text>"#,
            r#"<text x="{lx:.1}" y="{y0:.1}" font-size="11" text-anchor="end">{min}</text>"#,
            r#"<text x="14" y="{my:.1}" font-size="11" transform="rotate(-90 14 {my:.1})" text-anchor="middle">{y_label}</text>"#,
        ),
        x0 = x0,
        x1 = x1,
        y0 = y0,
        y1 = y1,
        ty = y0 + 16.0,
        lx = x0 - 6.0,
        my = (y0 + y1) / 2.0,
        start = frame.t0.format("%Y-%m-%d"),
        end = frame.t1.format("%Y-%m-%d"),
        max = format_value(frame.y_max),
        min = format_value(frame.y_min),
        y_label = y_label,
    )
}

fn polyline(points: &[(f64, f64)], stroke: &str, dashed: bool) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect();
    let dash = if dashed {
        r#" stroke-dasharray="4,3""#
    } else {
        ""
    };
    format!(
        r#"<polyline fill="none" stroke="{stroke}" stroke-width="1.5"{dash} points="{}"/>"#,
        coords.join(" ")
    )
}

fn marker(x: f64, y: f64, kind: TransitionKind) -> String {
    let s = MARKER_SIZE;
    let color = kind.color();
    match kind.marker() {
        MarkerShape::TriangleUp => format!(
            r#"<polygon class="marker" fill="{color}" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}"/>"#,
            x,
            y - s,
            x - s,
            y + s,
            x + s,
            y + s
        ),
        MarkerShape::TriangleDown => format!(
            r#"<polygon class="marker" fill="{color}" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}"/>"#,
            x,
            y + s,
            x - s,
            y - s,
            x + s,
            y - s
        ),
        MarkerShape::Cross => format!(
            concat!(
                r#"<path class="marker" stroke="{color}" stroke-width="2" "#,
                r#"d="M{:.1},{:.1} L{:.1},{:.1} M{:.1},{:.1} L{:.1},{:.1}"/>"#
            ),
            x - s,
            y - s,
            x + s,
            y + s,
            x - s,
            y + s,
            x + s,
            y - s,
            color = color
        ),
    }
}

fn legend(entries: &[(&str, &str, bool)]) -> String {
    let mut out = String::new();
    for (i, (label, color, dashed)) in entries.iter().enumerate() {
        let x = PAD_LEFT + 10.0 + i as f64 * 130.0;
        let y = PAD_TOP + 8.0;
        let dash = if *dashed {
            r#" stroke-dasharray="4,3""#
        } else {
            ""
        };
        out.push_str(&format!(
            concat!(
                r#"<line x1="{x:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}" stroke="{color}" stroke-width="2"{dash}/>"#,
                r#"<text x="{tx:.1}" y="{ty:.1}" font-size="11">{label}</text>"#,
            ),
            x = x,
            x2 = x + 18.0,
            y = y,
            tx = x + 22.0,
            ty = y + 4.0,
            color = color,
            dash = dash,
            label = label,
        ));
    }
    out
}

fn format_price(v: f64) -> String {
    format!("{v:.2}")
}

fn format_money(v: f64) -> String {
    format!("${v:.0}")
}

/// Panel 1: price line, transition markers, optional drawdown on a right axis.
pub fn price_signal_svg(view: &AssetView, show_drawdown: bool) -> String {
    let points = view.series.points();
    let Some(frame) = Frame::new(
        points.iter().map(|p| p.timestamp),
        points.iter().map(|p| p.price),
    ) else {
        return NO_DATA.to_string();
    };

    let title = format!("{} Price with Entry/Exit Signals", view.asset);
    let mut svg = open_svg(&title);
    svg.push_str(&axes(&frame, "Price", format_price));

    let price_line: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (frame.x(p.timestamp), frame.y(p.price)))
        .collect();
    svg.push_str(&polyline(&price_line, PRICE_COLOR, false));

    for event in &view.transitions {
        let x = frame.x(event.point.timestamp);
        let y = frame.y(event.point.price);
        svg.push_str(&format!(
            "<g><title>{}\n{}\n${:.2}</title>{}</g>",
            event.kind.label(),
            event.point.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.point.price,
            marker(x, y, event.kind)
        ));
    }

    let mut entries: Vec<(&str, &str, bool)> = vec![("Price", PRICE_COLOR, false)];
    entries.extend(
        TransitionKind::ALL
            .iter()
            .map(|k| (k.label(), k.color(), false)),
    );

    if show_drawdown && view.drawdown.len() == points.len() {
        let dd_line: Vec<(f64, f64)> = points
            .iter()
            .zip(&view.drawdown)
            .map(|(p, &dd)| (frame.x(p.timestamp), y_in(dd, -1.0, 0.0)))
            .collect();
        svg.push_str(&format!(r#"<g class="drawdown">{}</g>"#, polyline(&dd_line, DRAWDOWN_COLOR, true)));

        let ax = WIDTH - PAD_RIGHT;
        svg.push_str(&format!(
            concat!(
                r##"<line x1="{ax:.1}" y1="{top:.1}" x2="{ax:.1}" y2="{bottom:.1}" stroke="#333"/>"##,
                r#"<text x="{lx:.1}" y="{top:.1}" font-size="11">0%</text>"#,
                r#"<text x="{lx:.1}" y="{bottom:.1}" font-size="11">-100%</text>"#,
                r#"<text x="{lx:.1}" y="{mid:.1}" font-size="11">Drawdown</text>"#,
            ),
            ax = ax,
            lx = ax + 4.0,
            top = PAD_TOP,
            bottom = HEIGHT - PAD_BOTTOM,
            mid = (PAD_TOP + HEIGHT - PAD_BOTTOM) / 2.0,
        ));
        entries.push(("Drawdown", DRAWDOWN_COLOR, true));
    }

    svg.push_str(&legend(&entries));
    svg.push_str("</svg>");
    svg
}

/// Panel 2: strategy portfolio value against the buy-and-hold reference.
/// The reference line is left out when buy-and-hold is undefined.
pub fn strategy_vs_buy_hold_svg(view: &AssetView) -> String {
    let points = view.series.points();
    let reference = view.buy_hold.as_deref().unwrap_or_default();
    let Some(frame) = Frame::new(
        points.iter().map(|p| p.timestamp),
        points
            .iter()
            .map(|p| p.portfolio_value)
            .chain(reference.iter().copied()),
    ) else {
        return NO_DATA.to_string();
    };

    let title = format!("{} Portfolio Value vs Buy &amp; Hold", view.asset);
    let mut svg = open_svg(&title);
    svg.push_str(&axes(&frame, "Portfolio Value ($)", format_money));

    let strategy: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (frame.x(p.timestamp), frame.y(p.portfolio_value)))
        .collect();
    svg.push_str(&polyline(&strategy, STRATEGY_COLOR, false));

    let mut entries = vec![("Strategy", STRATEGY_COLOR, false)];
    if !reference.is_empty() {
        let buy_hold: Vec<(f64, f64)> = points
            .iter()
            .zip(reference)
            .map(|(p, &v)| (frame.x(p.timestamp), frame.y(v)))
            .collect();
        svg.push_str(&polyline(&buy_hold, BUY_HOLD_COLOR, true));
        entries.push(("Buy &amp; Hold", BUY_HOLD_COLOR, true));
    }
    svg.push_str(&legend(&entries));
    svg.push_str("</svg>");
    svg
}

/// Panel 3: every asset's strategy value on a shared time axis.
pub fn comparison_svg(lines: &[ComparisonLine]) -> String {
    let drawable: Vec<_> = lines
        .iter()
        .filter_map(|line| line.outcome.as_ref().ok().map(|pts| (line.asset, pts)))
        .filter(|(_, pts)| !pts.is_empty())
        .collect();

    let Some(frame) = Frame::new(
        drawable
            .iter()
            .flat_map(|(_, pts)| pts.iter().map(|p| p.timestamp)),
        drawable
            .iter()
            .flat_map(|(_, pts)| pts.iter().map(|p| p.value)),
    ) else {
        return NO_DATA.to_string();
    };

    let mut svg = open_svg("BTC vs ETH Strategy Comparison");
    svg.push_str(&axes(&frame, "Portfolio Value ($)", format_money));

    let mut entries = Vec::with_capacity(drawable.len());
    let labels: Vec<String> = drawable
        .iter()
        .map(|(asset, _)| format!("{asset} Strategy"))
        .collect();
    for ((asset, pts), label) in drawable.iter().zip(&labels) {
        let line: Vec<(f64, f64)> = pts
            .iter()
            .map(|p| (frame.x(p.timestamp), frame.y(p.value)))
            .collect();
        svg.push_str(&polyline(&line, asset.color(), false));
        entries.push((label.as_str(), asset.color(), false));
    }
    svg.push_str(&legend(&entries));
    svg.push_str("</svg>");
    svg
}
