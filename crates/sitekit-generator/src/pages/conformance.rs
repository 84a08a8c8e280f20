//! test262 conformance page.

use std::fmt::Write;

use sitekit_core::MetricsSnapshot;

use super::{PageContent, SiteData};
use crate::{
    node::{Node, el, escape_html, raw, text},
    render::{Classes, RenderContext, Result},
};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 40.0;
const Y_TICKS: u32 = 4;

/// Line colour per result category.
const COLORS: [&str; 6] = ["#16a34a", "#dc2626", "#7c3aed", "#64748b", "#f59e0b", "#0ea5e9"];

pub(super) fn render(ctx: &mut RenderContext<'_>, data: &SiteData<'_>) -> Result<PageContent> {
    let css = ctx.classes("conformance.module.css")?;
    let snapshots = match data.metrics {
        Some(source) => source.fetch()?,
        None => Vec::new(),
    };

    let mut body = el("section").child(el("h1").text("ECMAScript conformance"));

    body = match snapshots.last() {
        None => body.child(el("p").text("No conformance results are available yet.")),
        Some(latest) => body
            .child(
                el("div")
                    .class(css.get("summary"))
                    .child(
                        el("div")
                            .child(el("div").class(css.get("rate")).text(format!("{:.2}%", latest.pass_rate())))
                            .child(text("of test262 passing")),
                    )
                    .child(
                        el("div")
                            .text("Latest run: ")
                            .child(el("code").class(css.get("commit")).text(short_sha(&latest.commit)))
                            .text(format!(" {}", latest.message)),
                    ),
            )
            .child(raw(chart(&snapshots, &css)))
            .child(results_table(&css, latest)),
    };

    Ok(PageContent::website(
        "Conformance",
        "test262 conformance over time",
        body.into(),
    ))
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

fn results_table(css: &Classes, latest: &MetricsSnapshot) -> Node {
    let rows = latest.counts.categories().into_iter().map(|(name, count)| {
        let share = if latest.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / latest.total as f64
        };
        el("tr")
            .child(el("td").text(name))
            .child(el("td").text(count.to_string()))
            .child(el("td").text(format!("{share:.2}%")))
    });

    el("table")
        .class(css.get("table"))
        .child(
            el("thead").child(
                el("tr")
                    .child(el("th").text("Result"))
                    .child(el("th").text("Tests"))
                    .child(el("th").text("Share")),
            ),
        )
        .child(
            el("tbody").children(rows).child(
                el("tr")
                    .child(el("td").text("total"))
                    .child(el("td").text(latest.total.to_string()))
                    .child(el("td").text("100.00%")),
            ),
        )
        .into()
}

/// Inline SVG line chart of result counts per category over time.
///
/// Snapshots are plotted left to right in the given order, evenly spaced.
#[must_use]
pub fn chart(snapshots: &[MetricsSnapshot], css: &Classes) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max = snapshots.iter().map(|s| s.total).max().unwrap_or(0).max(1) as f64;
    let step = if snapshots.len() > 1 {
        plot_w / (snapshots.len() - 1) as f64
    } else {
        0.0
    };
    let x = |i: usize| MARGIN_LEFT + step * i as f64;
    let y = |v: u64| MARGIN_TOP + plot_h - v as f64 / max * plot_h;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="{}" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="test262 results over time" xmlns="http://www.w3.org/2000/svg">"#,
        escape_html(css.get("chart"))
    );

    let axis = escape_html(css.get("axis"));
    let label = escape_html(css.get("label"));
    let bottom = MARGIN_TOP + plot_h;
    let _ = write!(
        svg,
        r#"<line class="{axis}" x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{bottom}"/><line class="{axis}" x1="{MARGIN_LEFT}" y1="{bottom}" x2="{}" y2="{bottom}"/>"#,
        WIDTH - MARGIN_RIGHT
    );

    for tick in 0..=Y_TICKS {
        let value = (max * f64::from(tick) / f64::from(Y_TICKS)).round() as u64;
        let _ = write!(
            svg,
            r#"<text class="{label}" x="{:.1}" y="{:.1}" text-anchor="end">{value}</text>"#,
            MARGIN_LEFT - 8.0,
            y(value) + 4.0
        );
    }

    if let (Some(first), Some(last)) = (snapshots.first(), snapshots.last()) {
        let _ = write!(
            svg,
            r#"<text class="{label}" x="{MARGIN_LEFT}" y="{:.1}">{}</text>"#,
            HEIGHT - 12.0,
            first.date.format("%Y-%m-%d")
        );
        let _ = write!(
            svg,
            r#"<text class="{label}" x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            WIDTH - MARGIN_RIGHT,
            HEIGHT - 12.0,
            last.date.format("%Y-%m-%d")
        );
    }

    let line = escape_html(css.get("line"));
    for (index, color) in COLORS.iter().enumerate() {
        let Some(name) = snapshots
            .first()
            .map(|s| s.counts.categories()[index].0)
        else {
            break;
        };
        let points = snapshots
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{:.1},{:.1}", x(i), y(s.counts.categories()[index].1)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            svg,
            r#"<polyline class="{line}" data-category="{name}" stroke="{color}" points="{points}"><title>{name}</title></polyline>"#
        );
    }

    svg.push_str("</svg>");
    svg
}
