use crate::features::throughput::{TransferBoard, TransferEntry, TransferStatus};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use super::format::{
    MUTED, format_mib, format_percent, format_speed, progress_bar, style_for_tag,
    truncate_string,
};

const BAR_WIDTH: usize = 30;
const MAX_TITLE: usize = 24;

pub(super) fn transfer_text(board: &TransferBoard) -> Text<'static> {
    let width = board
        .entries
        .iter()
        .map(|e| e.title.chars().count().min(MAX_TITLE))
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        Line::from(Span::styled(
            " Download throughput ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    lines.extend(board.entries.iter().map(|entry| entry_line(entry, width)));
    Text::from(lines)
}

fn entry_line(entry: &TransferEntry, width: usize) -> Line<'static> {
    let mut spans = vec![
        Span::styled("■ ", style_for_tag(entry.color)),
        Span::styled(
            format!("{:<width$}  ", truncate_string(&entry.title, MAX_TITLE)),
            style_for_tag(entry.color),
        ),
    ];

    match &entry.status {
        TransferStatus::Pending => {
            spans.push(Span::styled("waiting", Style::default().fg(MUTED)));
        }
        TransferStatus::Running(progress) => {
            if let Some(fraction) = progress.fraction() {
                spans.push(Span::raw(format!(
                    "[{}] {}  ",
                    progress_bar(fraction, BAR_WIDTH, '=', '-'),
                    format_percent(fraction)
                )));
            }
            spans.push(Span::raw(format!(
                "{}  {}",
                format_mib(progress.bytes_received),
                format_speed(progress.speed_mbps)
            )));
        }
        TransferStatus::Completed(result) => {
            spans.push(Span::styled(
                format!(
                    "{} in {:.2}s  {}",
                    format_mib(result.bytes_received),
                    result.elapsed_seconds,
                    format_speed(result.speed_mbps)
                ),
                Style::default().fg(Color::Green),
            ));
        }
        TransferStatus::Failed(reason) => {
            spans.push(Span::styled(
                format!("failed: {reason}"),
                Style::default().fg(Color::Red),
            ));
        }
    }

    Line::from(spans)
}
