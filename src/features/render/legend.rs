use crate::features::metrics::{ChartState, SeriesView};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::format::{
    MUTED, OVERLAP_COLOR, format_mean, format_optional, format_speed, style_for_tag,
    truncate_string,
};

const MAX_TITLE: usize = 24;

pub(super) fn legend_lines(chart: &ChartState) -> Vec<Line<'static>> {
    let width = chart
        .series
        .iter()
        .map(|s| s.title.chars().count().min(MAX_TITLE))
        .max()
        .unwrap_or(0);

    chart
        .series
        .iter()
        .map(|series| legend_line(chart, series, width))
        .collect()
}

fn legend_line(chart: &ChartState, series: &SeriesView, width: usize) -> Line<'static> {
    let stats = &series.stats;
    let mean = format_mean(stats.mean);

    let mut spans = vec![
        Span::styled("■ ", style_for_tag(series.color)),
        Span::styled(
            format!("{:<width$}", truncate_string(&series.title, MAX_TITLE)),
            style_for_tag(series.color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  mean ", Style::default().fg(MUTED)),
        Span::raw(format!("{mean:>8}")),
        Span::styled("  min ", Style::default().fg(MUTED)),
        Span::raw(format!("{:>7}", format_optional(stats.min))),
        Span::styled("  max ", Style::default().fg(MUTED)),
        Span::raw(format!("{:>7}", format_optional(stats.max))),
        Span::styled("  last ", Style::default().fg(MUTED)),
        Span::raw(format!("{:>7}", format_optional(stats.latest))),
    ];

    if let Some(kind) = series.last_error {
        spans.push(Span::styled(
            format!("  [{kind}]"),
            Style::default().fg(Color::Red),
        ));
    }

    if series.excluded {
        spans.push(Span::styled("  (not charted)", Style::default().fg(MUTED)));
    }

    if !series.overlaps_with.is_empty() {
        let partners: Vec<&str> = series
            .overlaps_with
            .iter()
            .filter_map(|index| chart.series.get(*index))
            .map(|partner| partner.title.as_str())
            .collect();
        spans.push(Span::styled(
            format!("  ≈ {}", partners.join(", ")),
            Style::default().fg(OVERLAP_COLOR),
        ));
    }

    match &series.throughput {
        Some(Ok(result)) => spans.push(Span::raw(format!(
            "  ↓ {}",
            format_speed(result.speed_mbps)
        ))),
        Some(Err(err)) => spans.push(Span::styled(
            format!("  ↓ failed: {err}"),
            Style::default().fg(Color::Red),
        )),
        None => {}
    }

    Line::from(spans)
}
