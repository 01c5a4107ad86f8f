pub use crate::features::render::{render, render_transfer, to_plain};
