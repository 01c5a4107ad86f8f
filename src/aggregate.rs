pub use crate::features::metrics::aggregate::{bucket_height, overlapping, project, window_stats};
pub use crate::features::metrics::{ChartState, RoundSpan, SeriesInput, SeriesView, WindowStats};
