use crate::features::metrics::{ChartState, SeriesView};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::format::{
    MUTED, OVERLAP_COLOR, format_latency, format_optional, style_for_tag, truncate_string,
};

const GUTTER: usize = 8;
const BAR: &str = "█";
const GAP: &str = " ";

pub(super) fn header_line(chart: &ChartState) -> Line<'static> {
    let charted = chart.series.iter().filter(|s| !s.excluded).count();
    Line::from(vec![
        Span::styled(
            " perfprobe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled("Targets:", Style::default().fg(MUTED)),
        Span::raw(format!(" {} ", chart.series.len())),
        Span::raw("│ "),
        Span::styled("Charted:", Style::default().fg(MUTED)),
        Span::raw(format!(" {charted} ")),
        Span::raw("│ "),
        Span::styled("Peak:", Style::default().fg(MUTED)),
        Span::raw(format!(" {} ", format_latency(chart.peak_ms))),
    ])
}

/// One line per height bucket, tallest first, then the axis and the
/// sampled values of each charted series.
pub(super) fn chart_lines(chart: &ChartState) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(usize::from(chart.height) + 1);

    for level in (1..=chart.height).rev() {
        let label = if level == chart.height && chart.peak_ms > 0 {
            format_latency(chart.peak_ms)
        } else if level == chart.height.div_ceil(2) && chart.peak_ms > 0 {
            format_latency(chart.peak_ms / 2)
        } else {
            String::new()
        };
        let mut spans = vec![Span::styled(
            format!("{label:>width$} │", width = GUTTER - 2),
            Style::default().fg(MUTED),
        )];
        for column in 0..chart.columns {
            spans.push(cell(chart, column, level));
            spans.push(Span::raw(GAP));
        }
        lines.push(Line::from(spans));
    }

    let rule = "─".repeat(chart.columns * 2);
    lines.push(Line::from(Span::styled(
        format!("{:>width$} └{rule}", "0", width = GUTTER - 2),
        Style::default().fg(MUTED),
    )));

    let charted: Vec<&SeriesView> = chart.series.iter().filter(|s| !s.excluded).collect();
    let width = charted
        .iter()
        .map(|s| s.title.chars().count().min(GUTTER - 2))
        .max()
        .unwrap_or(0);
    lines.extend(charted.into_iter().map(|series| values_line(series, width)));
    lines
}

fn values_line(series: &SeriesView, width: usize) -> Line<'static> {
    let style = style_for_tag(series.color);
    let mut spans = vec![Span::styled(
        format!("{:>width$}  ", truncate_string(&series.title, GUTTER - 2)),
        style,
    )];
    for (column, value) in series.values.iter().enumerate() {
        if column > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(MUTED)));
        }
        spans.push(Span::styled(format_optional(*value), style));
    }
    Line::from(spans)
}

fn cell(chart: &ChartState, column: usize, level: u16) -> Span<'static> {
    let covering: Vec<(usize, u16)> = chart
        .series
        .iter()
        .enumerate()
        .filter_map(|(index, series)| {
            series
                .bars
                .get(column)
                .copied()
                .flatten()
                .filter(|height| *height >= level)
                .map(|height| (index, height))
        })
        .collect();

    // The shortest bar reaching this level sits in front.
    let Some(&(front, _)) = covering.iter().min_by_key(|(index, height)| (*height, *index)) else {
        return Span::raw(GAP);
    };

    let meets_partner = chart.column_overlaps.get(column).is_some_and(|pairs| {
        pairs.iter().any(|&(a, b)| {
            covering.iter().any(|(i, _)| *i == a) && covering.iter().any(|(i, _)| *i == b)
        })
    });
    let style = if meets_partner {
        Style::default().fg(OVERLAP_COLOR)
    } else {
        style_for_tag(chart.series[front].color)
    };
    Span::styled(BAR, style)
}
