//! Turns a chart projection into styled terminal text.
//!
//! Everything here is a pure function of its inputs so a frame can be
//! rebuilt on every tick, or flattened to plain text when no terminal is
//! available.

mod chart;
mod format;
mod legend;
mod transfer;

use crate::config::ChartConfig;
use crate::features::metrics::ChartState;
use crate::features::throughput::TransferBoard;
use crate::runtime::{LoopState, RoundProgress};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};

use format::{MUTED, format_percent, progress_bar};

pub fn render(chart: &ChartState, progress: &RoundProgress, config: &ChartConfig) -> Text<'static> {
    let mut lines = vec![chart::header_line(chart), Line::raw("")];

    if chart.has_samples() {
        lines.extend(chart::chart_lines(chart));
    } else {
        lines.push(Line::from(Span::styled(
            "  waiting for the first round...",
            Style::default().fg(MUTED),
        )));
    }

    lines.push(Line::raw(""));
    lines.extend(legend::legend_lines(chart));
    lines.push(Line::raw(""));
    lines.push(progress_line(progress, config));
    lines.push(footer_line(progress.state));
    Text::from(lines)
}

pub fn render_transfer(board: &TransferBoard) -> Text<'static> {
    transfer::transfer_text(board)
}

/// Drops styling, keeping one output line per rendered line.
pub fn to_plain(text: &Text<'_>) -> String {
    let mut out = String::new();
    for line in &text.lines {
        let content: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        out.push_str(content.trim_end());
        out.push('\n');
    }
    out
}

fn progress_line(progress: &RoundProgress, config: &ChartConfig) -> Line<'static> {
    match (progress.fraction(), progress.max_rounds) {
        (Some(fraction), Some(max)) => Line::from(vec![
            Span::raw("["),
            Span::styled(
                progress_bar(fraction, usize::from(config.progress_width), '█', '░'),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(
                "] {}  round {}/{max}",
                format_percent(fraction),
                progress.round
            )),
        ]),
        _ => Line::raw(format!("round {}", progress.round)),
    }
}

fn footer_line(state: LoopState) -> Line<'static> {
    let (text, color) = match state {
        LoopState::Running => ("Press Enter or q to stop", MUTED),
        LoopState::Stopping => ("Stopping after the current round…", Color::Yellow),
        LoopState::Done => ("Done", Color::Green),
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}
