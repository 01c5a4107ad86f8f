mod projection;
mod stats;

pub use projection::project;
pub use stats::{bucket_height, overlapping, window_stats};
