use crate::config::ColorTag;
use ratatui::style::{Color, Style};

/// Fill drawn where two overlapping series meet.
pub(super) const OVERLAP_COLOR: Color = Color::Gray;
pub(super) const MUTED: Color = Color::DarkGray;

pub(super) fn color_for_tag(tag: ColorTag) -> Color {
    match tag {
        ColorTag::Green => Color::Green,
        ColorTag::Red => Color::Red,
        ColorTag::Yellow => Color::Yellow,
        ColorTag::Blue => Color::Blue,
        ColorTag::Magenta => Color::Magenta,
        ColorTag::Cyan => Color::Cyan,
        ColorTag::White => Color::White,
        ColorTag::Orange => Color::Indexed(214),
        ColorTag::Gray => Color::Gray,
    }
}

pub(super) fn style_for_tag(tag: ColorTag) -> Style {
    Style::default().fg(color_for_tag(tag))
}

pub(super) fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

pub(super) fn format_latency(ms: u64) -> String {
    if ms >= 10_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else if ms >= 1000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}

pub(super) fn format_mean(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{ms:.1}ms")
    }
}

pub(super) fn format_optional(ms: Option<u64>) -> String {
    ms.map(format_latency).unwrap_or_else(|| "N/A".to_string())
}

pub(super) fn format_mib(bytes: u64) -> String {
    format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
}

pub(super) fn format_speed(mbps: f64) -> String {
    if mbps >= 1000.0 {
        format!("{:.2} Gbps", mbps / 1024.0)
    } else {
        format!("{mbps:.2} Mbps")
    }
}

/// `filled`/`empty` glyphs for a `width`-cell bar at `fraction` complete.
pub(super) fn progress_bar(fraction: f64, width: usize, filled: char, empty: char) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let done = ((fraction * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width * filled.len_utf8());
    bar.extend(std::iter::repeat_n(filled, done));
    bar.extend(std::iter::repeat_n(empty, width - done));
    bar
}

pub(super) fn format_percent(fraction: f64) -> String {
    format!("{:>3.0}%", fraction.clamp(0.0, 1.0) * 100.0)
}
