pub mod aggregate;

use crate::config::{ColorTag, Target};
use crate::error::{NetworkError, NetworkErrorKind};
use crate::features::throughput::ThroughputOutcome;
use crate::probe::Sample;

/// Mean/min/max over the retained, non-placeholder samples of one window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowStats {
    pub count: usize,
    pub mean: f64,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub latest: Option<u64>,
}

impl WindowStats {
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            min: None,
            max: None,
            latest: None,
        }
    }
}

/// The rounds a chart shows: the most recent `width` of them, ending at `latest`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RoundSpan {
    pub latest: u64,
    pub width: usize,
}

impl RoundSpan {
    pub fn new(latest: u64, width: usize) -> Self {
        Self { latest, width }
    }

    pub fn columns(&self) -> usize {
        usize::try_from(self.latest).map_or(self.width, |latest| latest.min(self.width))
    }

    /// Column holding `round`, if it is still on screen.
    pub fn column_of(&self, round: u64) -> Option<usize> {
        let columns = self.columns() as u64;
        let first = (self.latest + 1).checked_sub(columns)?;
        if round < first || round > self.latest || columns == 0 {
            return None;
        }
        usize::try_from(round - first).ok()
    }
}

/// Everything the aggregator needs to know about one target this tick.
#[derive(Clone, Copy, Debug)]
pub struct SeriesInput<'a> {
    pub target: &'a Target,
    pub samples: &'a [Sample],
    pub last_error: Option<&'a NetworkError>,
    pub throughput: Option<&'a ThroughputOutcome>,
}

#[derive(Clone, Debug)]
pub struct SeriesView {
    pub title: String,
    pub color: ColorTag,
    /// Left out of scaling, bars and overlap detection.
    pub excluded: bool,
    pub stats: WindowStats,
    /// Latency per chart column; `None` for failed rounds and placeholders.
    pub values: Vec<Option<u64>>,
    /// Bar height per chart column; `None` where the series has no value.
    pub bars: Vec<Option<u16>>,
    pub last_error: Option<NetworkErrorKind>,
    pub throughput: Option<ThroughputOutcome>,
    /// Indices of series whose latest value overlaps this one.
    pub overlaps_with: Vec<usize>,
}

/// Per-tick projection of every sample window; rebuilt from scratch each time.
#[derive(Clone, Debug)]
pub struct ChartState {
    pub series: Vec<SeriesView>,
    /// One column per round in the span, oldest first.
    pub columns: usize,
    pub height: u16,
    pub peak_ms: u64,
    /// Overlapping series pairs per column, lower index first.
    pub column_overlaps: Vec<Vec<(usize, usize)>>,
    /// Pairs whose latest values overlap.
    pub overlaps: Vec<(usize, usize)>,
}

impl ChartState {
    pub fn is_overlapping(&self, left: usize, right: usize) -> bool {
        let pair = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        self.overlaps.contains(&pair)
    }

    pub fn has_samples(&self) -> bool {
        self.columns > 0
    }
}

#[cfg(test)]
mod tests {
    use super::RoundSpan;

    #[test]
    fn span_covers_the_most_recent_rounds() {
        let span = RoundSpan::new(7, 5);
        assert_eq!(span.columns(), 5);
        assert_eq!(span.column_of(3), Some(0));
        assert_eq!(span.column_of(7), Some(4));
        assert_eq!(span.column_of(2), None);
        assert_eq!(span.column_of(8), None);
    }

    #[test]
    fn span_is_narrow_before_the_window_fills() {
        let span = RoundSpan::new(2, 30);
        assert_eq!(span.columns(), 2);
        assert_eq!(span.column_of(1), Some(0));
        assert_eq!(RoundSpan::new(0, 30).columns(), 0);
        assert_eq!(RoundSpan::new(0, 30).column_of(0), None);
    }
}
