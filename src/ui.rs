pub use crate::features::ui::{
    Display, PlainDisplay, TerminalDisplay, is_stop_key, spawn_key_listener,
};
