use crate::runtime::StopSignal;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Watches the keyboard and raises `stop` on a stop key. The thread exits
/// once the signal is raised, from here or elsewhere.
pub fn spawn_key_listener(stop: StopSignal) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name("keys".to_string())
        .spawn(move || {
            while !stop.is_stopped() {
                match event::poll(POLL_INTERVAL) {
                    Ok(false) => {}
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) if is_stop_key(&key) => {
                            info!("stop requested from keyboard");
                            stop.stop();
                        }
                        Ok(_) => {}
                        Err(err) => {
                            warn!(error = %err, "failed to read key event");
                            break;
                        }
                    },
                    Err(err) => {
                        debug!(error = %err, "keyboard unavailable");
                        break;
                    }
                }
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!(error = %err, "failed to spawn key listener");
            None
        }
    }
}
