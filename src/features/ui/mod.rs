mod keys;

pub use keys::{is_stop_key, spawn_key_listener};

use crate::config::ChartConfig;
use crate::error::RenderError;
use crate::features::metrics::ChartState;
use crate::features::render::{render, render_transfer, to_plain};
use crate::features::throughput::{TransferBoard, TransferStatus};
use crate::runtime::{FrameSink, LoopState, RoundProgress};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{QueueableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::text::Text;
use ratatui::widgets::Paragraph;
use std::io::{self, IsTerminal, Stdout, Write};
use tracing::warn;

/// Redraws the chart in place on the alternate screen.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    config: ChartConfig,
    last_frame: Option<Text<'static>>,
    restored: bool,
}

impl TerminalDisplay {
    pub fn enter(config: ChartConfig) -> Result<Self, RenderError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        unwind_on_err(execute!(stdout, EnterAlternateScreen), || {
            let _ = disable_raw_mode();
        })?;
        let mut terminal =
            unwind_on_err(Terminal::new(CrosstermBackend::new(stdout)), abandon_screen)?;
        unwind_on_err(terminal.hide_cursor(), abandon_screen)?;
        Ok(Self {
            terminal,
            config,
            last_frame: None,
            restored: false,
        })
    }

    fn draw(&mut self, text: Text<'static>) -> Result<(), RenderError> {
        self.terminal.draw(|frame| {
            frame.render_widget(Paragraph::new(text.clone()), frame.area());
        })?;
        self.last_frame = Some(text);
        Ok(())
    }

    /// Restores the terminal and hands back the last frame drawn.
    pub fn leave(mut self) -> Result<Option<Text<'static>>, RenderError> {
        self.cleanup_terminal()?;
        Ok(self.last_frame.take())
    }

    fn cleanup_terminal(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        self.terminal.backend_mut().queue(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        self.terminal.backend_mut().flush()?;
        Ok(())
    }
}

/// Runs `unwind` when a setup step fails, before the display owns cleanup.
fn unwind_on_err<T, E>(result: Result<T, E>, unwind: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        unwind();
    }
    result
}

fn abandon_screen() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = self.cleanup_terminal();
    }
}

/// Writes frames as plain text, for pipes and dumb terminals.
pub struct PlainDisplay<W: Write> {
    out: W,
    config: ChartConfig,
    /// Final frame, kept back for the caller to print after closing.
    held: Option<String>,
}

impl<W: Write> PlainDisplay<W> {
    pub fn new(out: W, config: ChartConfig) -> Self {
        Self {
            out,
            config,
            held: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.out.write_all(frame.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> FrameSink for PlainDisplay<W> {
    fn show_chart(&mut self, chart: &ChartState, progress: &RoundProgress) {
        if progress.state == LoopState::Done {
            self.held = Some(to_plain(&render(chart, progress, &self.config)));
            return;
        }
        let frame = to_plain(&render(chart, progress, &self.config));
        if let Err(err) = self.write_frame(&frame) {
            warn!(error = %err, "failed to write frame");
        }
    }

    fn show_transfer(&mut self, board: &TransferBoard) {
        let finished = board.entries.iter().all(|entry| {
            matches!(
                entry.status,
                TransferStatus::Completed(_) | TransferStatus::Failed(_)
            )
        });
        if !finished {
            return;
        }
        if let Err(err) = self.write_frame(&to_plain(&render_transfer(board))) {
            warn!(error = %err, "failed to write transfer summary");
        }
    }
}

/// The client's output surface. Falls back to plain text when the terminal
/// cannot be driven.
pub enum Display {
    Terminal(TerminalDisplay),
    Plain(PlainDisplay<Stdout>),
}

impl Display {
    pub fn open(config: ChartConfig, force_plain: bool) -> Self {
        if force_plain || !io::stdout().is_terminal() {
            return Display::Plain(PlainDisplay::new(io::stdout(), config));
        }
        match TerminalDisplay::enter(config.clone()) {
            Ok(terminal) => Display::Terminal(terminal),
            Err(err) => {
                warn!(error = %err, "terminal unavailable, using plain output");
                Display::Plain(PlainDisplay::new(io::stdout(), config))
            }
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Display::Terminal(_))
    }

    /// Closes the display and returns the last frame as plain text.
    pub fn finish(self) -> Option<String> {
        match self {
            Display::Terminal(terminal) => match terminal.leave() {
                Ok(frame) => frame.map(|text| to_plain(&text)),
                Err(err) => {
                    warn!(error = %err, "failed to restore terminal");
                    None
                }
            },
            Display::Plain(plain) => plain.held,
        }
    }

    fn degrade(&mut self, err: RenderError) {
        warn!(error = %err, "terminal draw failed, switching to plain output");
        let config = match self {
            Display::Terminal(terminal) => terminal.config.clone(),
            Display::Plain(_) => return,
        };
        // Dropping the terminal display restores the screen.
        *self = Display::Plain(PlainDisplay::new(io::stdout(), config));
    }
}

impl FrameSink for Display {
    fn show_chart(&mut self, chart: &ChartState, progress: &RoundProgress) {
        let result = match self {
            Display::Terminal(terminal) => {
                let text = render(chart, progress, &terminal.config);
                terminal.draw(text)
            }
            Display::Plain(plain) => {
                plain.show_chart(chart, progress);
                Ok(())
            }
        };
        if let Err(err) = result {
            self.degrade(err);
            self.show_chart(chart, progress);
        }
    }

    fn show_transfer(&mut self, board: &TransferBoard) {
        let result = match self {
            Display::Terminal(terminal) => terminal.draw(render_transfer(board)),
            Display::Plain(plain) => {
                plain.show_transfer(board);
                Ok(())
            }
        };
        if let Err(err) = result {
            self.degrade(err);
            self.show_transfer(board);
        }
    }
}
