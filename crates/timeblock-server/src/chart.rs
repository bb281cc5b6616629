//! SVG bar chart rendering for the `image` statistics format.
//!
//! A dependency-free renderer: the chart is a fixed-size SVG with one
//! bar per day, built by string assembly. Output is deterministic for a
//! given statistics value, which keeps it testable.

use timeblock_core::Statistics;

const CHART_WIDTH: u32 = 640;
const CHART_HEIGHT: u32 = 400;
const MARGIN_LEFT: u32 = 50;
const MARGIN_BOTTOM: u32 = 70;
const MARGIN_TOP: u32 = 40;
const MARGIN_RIGHT: u32 = 20;
const BAR_COLOR: &str = "#4c78a8";

/// Renders the per-day event counts as an SVG bar chart.
///
/// An empty collection still yields a valid chart, just one with no
/// bars.
pub fn render_chart(statistics: &Statistics) -> String {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let max_count = statistics.per_day.values().copied().max().unwrap_or(0);
    let bar_count = statistics.per_day.len() as u32;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{CHART_WIDTH}\" height=\"{CHART_HEIGHT}\" \
         viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\">\n"
    ));
    svg.push_str(&format!(
        "  <rect width=\"{CHART_WIDTH}\" height=\"{CHART_HEIGHT}\" fill=\"white\"/>\n"
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"24\" text-anchor=\"middle\" font-family=\"sans-serif\" \
         font-size=\"16\">Number of Events per Day</text>\n",
        CHART_WIDTH / 2
    ));

    // Axes
    let axis_y = CHART_HEIGHT - MARGIN_BOTTOM;
    svg.push_str(&format!(
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{MARGIN_TOP}\" x2=\"{MARGIN_LEFT}\" y2=\"{axis_y}\" \
         stroke=\"black\"/>\n"
    ));
    svg.push_str(&format!(
        "  <line x1=\"{MARGIN_LEFT}\" y1=\"{axis_y}\" x2=\"{}\" y2=\"{axis_y}\" stroke=\"black\"/>\n",
        CHART_WIDTH - MARGIN_RIGHT
    ));

    if max_count > 0 && bar_count > 0 {
        // With more days than horizontal pixels, bars collapse to the
        // 1px minimum instead of underflowing the slot arithmetic.
        let slot_width = (plot_width / bar_count).max(1);
        let bar_width = (slot_width * 3 / 4).max(1);

        for (index, (date, count)) in statistics.per_day.iter().enumerate() {
            let bar_height = (*count as u32 * plot_height) / max_count as u32;
            let x = MARGIN_LEFT + index as u32 * slot_width + (slot_width - bar_width) / 2;
            let y = axis_y - bar_height;
            let label_x = MARGIN_LEFT + index as u32 * slot_width + slot_width / 2;

            svg.push_str(&format!(
                "  <rect x=\"{x}\" y=\"{y}\" width=\"{bar_width}\" height=\"{bar_height}\" \
                 fill=\"{BAR_COLOR}\"/>\n"
            ));
            svg.push_str(&format!(
                "  <text x=\"{label_x}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" \
                 font-size=\"11\">{count}</text>\n",
                y.saturating_sub(4).max(MARGIN_TOP)
            ));
            svg.push_str(&format!(
                "  <text x=\"{label_x}\" y=\"{}\" text-anchor=\"end\" font-family=\"sans-serif\" \
                 font-size=\"10\" transform=\"rotate(-45 {label_x} {})\">{date}</text>\n",
                axis_y + 16,
                axis_y + 16
            ));
        }
    }

    svg.push_str("</svg>\n");
    svg
}
