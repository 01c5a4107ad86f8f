use super::super::{ChartState, RoundSpan, SeriesInput, SeriesView};
use super::stats::{bucket_height, overlapping, window_stats};
use crate::config::{AggregateConfig, ChartConfig};
use crate::probe::Sample;

/// Places every sample in the column of the round that measured it and
/// derives the chart.
pub fn project(
    inputs: &[SeriesInput<'_>],
    span: RoundSpan,
    aggregate: &AggregateConfig,
    chart: &ChartConfig,
) -> ChartState {
    let sentinel = aggregate.sentinel_ms;
    let columns = span.columns();
    let included: Vec<bool> = inputs
        .iter()
        .map(|s| !aggregate.excluded_colors.contains(&s.target.color))
        .collect();
    let aligned: Vec<Vec<Option<u64>>> = inputs
        .iter()
        .map(|s| align(s.samples, span, sentinel))
        .collect();

    let peak_ms = aligned
        .iter()
        .zip(&included)
        .filter(|(_, included)| **included)
        .flat_map(|(values, _)| values.iter().flatten().copied())
        .max()
        .unwrap_or(0);

    let tolerance = aggregate.overlap_tolerance_ms;
    let column_overlaps: Vec<Vec<(usize, usize)>> = (0..columns)
        .map(|column| overlapping_pairs(&aligned, &included, column, tolerance))
        .collect();

    let overlaps = columns
        .checked_sub(1)
        .map(|last| column_overlaps[last].clone())
        .unwrap_or_default();

    let series = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let bars = if included[index] {
                aligned[index]
                    .iter()
                    .map(|value| {
                        value.map(|v| bucket_height(v, peak_ms, chart.height, chart.rounding))
                    })
                    .collect()
            } else {
                vec![None; columns]
            };
            let overlaps_with = overlaps
                .iter()
                .filter_map(|&(a, b)| match index {
                    i if i == a => Some(b),
                    i if i == b => Some(a),
                    _ => None,
                })
                .collect();

            SeriesView {
                title: input.target.id.clone(),
                color: input.target.color,
                excluded: !included[index],
                stats: window_stats(input.samples.iter().map(|s| s.latency_ms), sentinel),
                values: aligned[index].clone(),
                bars,
                last_error: input.last_error.map(|err| err.kind),
                throughput: input.throughput.cloned(),
                overlaps_with,
            }
        })
        .collect();

    ChartState {
        series,
        columns,
        height: chart.height,
        peak_ms,
        column_overlaps,
        overlaps,
    }
}

fn overlapping_pairs(
    aligned: &[Vec<Option<u64>>],
    included: &[bool],
    column: usize,
    tolerance: u64,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for left in 0..aligned.len() {
        for right in left + 1..aligned.len() {
            if !(included[left] && included[right]) {
                continue;
            }
            if let (Some(a), Some(b)) = (aligned[left][column], aligned[right][column])
                && overlapping(a, b, tolerance)
            {
                pairs.push((left, right));
            }
        }
    }
    pairs
}

/// One slot per round in `span`; missed rounds and sentinels become gaps.
fn align(samples: &[Sample], span: RoundSpan, sentinel: Option<u64>) -> Vec<Option<u64>> {
    let mut slots = vec![None; span.columns()];
    for sample in samples {
        if Some(sample.latency_ms) == sentinel {
            continue;
        }
        if let Some(column) = span.column_of(sample.round) {
            slots[column] = Some(sample.latency_ms);
        }
    }
    slots
}

#[cfg(test)]
mod tests;
