use super::project;
use crate::config::{AggregateConfig, ChartConfig, ColorTag, Target};
use crate::error::{NetworkError, NetworkErrorKind};
use crate::features::metrics::{RoundSpan, SeriesInput};
use crate::probe::Sample;

fn target(id: &str, color: ColorTag) -> Target {
    Target::new(id, "127.0.0.1", color)
}

/// Consecutive samples starting at `first_round`.
fn rounds_from(first_round: u64, values: &[u64]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, &latency_ms)| Sample {
            round: first_round + i as u64,
            latency_ms,
        })
        .collect()
}

fn input<'a>(target: &'a Target, samples: &'a [Sample]) -> SeriesInput<'a> {
    SeriesInput {
        target,
        samples,
        last_error: None,
        throughput: None,
    }
}

fn span(latest: u64) -> RoundSpan {
    RoundSpan::new(latest, 30)
}

#[test]
fn two_targets_scale_to_shared_peak() {
    let a = target("A", ColorTag::Red);
    let b = target("B", ColorTag::Blue);
    let fast = rounds_from(1, &[50; 5]);
    let slow = rounds_from(1, &[120; 5]);
    let state = project(
        &[input(&a, &fast), input(&b, &slow)],
        span(5),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );

    assert_eq!(state.columns, 5);
    assert_eq!(state.peak_ms, 120);
    assert_eq!(state.series[0].stats.mean, 50.0);
    assert_eq!(state.series[1].stats.mean, 120.0);
    assert!(state.series[0].bars.iter().all(|bar| *bar == Some(4)));
    assert!(state.series[1].bars.iter().all(|bar| *bar == Some(10)));
    assert_eq!(state.series[0].values, vec![Some(50); 5]);
    assert!(state.overlaps.is_empty());
    assert!(state.column_overlaps.iter().all(Vec::is_empty));
}

#[test]
fn mean_follows_evicted_window() {
    let a = target("A", ColorTag::Red);
    // Capacity 3 after recording rounds 1..=4.
    let retained = rounds_from(2, &[20, 30, 40]);
    let state = project(
        &[input(&a, &retained)],
        RoundSpan::new(4, 3),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );
    assert_eq!(state.columns, 3);
    assert_eq!(state.series[0].stats.mean, 30.0);
    assert_eq!(state.series[0].stats.latest, Some(40));
    assert_eq!(state.series[0].values, vec![Some(20), Some(30), Some(40)]);
}

#[test]
fn latest_values_within_tolerance_overlap() {
    let a = target("A", ColorTag::Red);
    let b = target("B", ColorTag::Blue);
    let c = target("C", ColorTag::Cyan);
    let config = AggregateConfig {
        overlap_tolerance_ms: 2,
        ..AggregateConfig::default()
    };
    let (sa, sb, sc) = (
        rounds_from(1, &[80, 50]),
        rounds_from(1, &[10, 51]),
        rounds_from(1, &[81, 52]),
    );
    let state = project(
        &[input(&a, &sa), input(&b, &sb), input(&c, &sc)],
        span(2),
        &config,
        &ChartConfig::default(),
    );

    assert_eq!(state.overlaps, vec![(0, 1), (1, 2)]);
    assert!(state.is_overlapping(1, 0));
    assert!(!state.is_overlapping(0, 2));
    assert_eq!(state.series[1].overlaps_with, vec![0, 2]);
    assert_eq!(state.column_overlaps, vec![vec![(0, 2)], vec![(0, 1), (1, 2)]]);
}

#[test]
fn late_joiner_lines_up_with_its_round() {
    let a = target("A", ColorTag::Red);
    let b = target("B", ColorTag::Blue);
    let sa = rounds_from(1, &[100, 100, 100]);
    let sb = rounds_from(3, &[100]);
    let state = project(
        &[input(&a, &sa), input(&b, &sb)],
        span(3),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );

    assert_eq!(state.columns, 3);
    assert_eq!(state.series[1].bars, vec![None, None, Some(10)]);
    assert_eq!(state.column_overlaps, vec![vec![], vec![], vec![(0, 1)]]);
    assert_eq!(state.overlaps, vec![(0, 1)]);
}

#[test]
fn failed_round_leaves_a_gap_without_shifting_older_samples() {
    let a = target("A", ColorTag::Red);
    let b = target("B", ColorTag::Blue);
    let steady = rounds_from(1, &[10, 20, 30, 40, 50]);
    // Round 3 failed for B.
    let flaky: Vec<Sample> = steady.iter().copied().filter(|s| s.round != 3).collect();
    let state = project(
        &[input(&a, &steady), input(&b, &flaky)],
        span(5),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );

    assert_eq!(state.columns, 5);
    assert_eq!(
        state.series[0].bars,
        vec![Some(2), Some(4), Some(6), Some(8), Some(10)]
    );
    assert_eq!(
        state.series[1].bars,
        vec![Some(2), Some(4), None, Some(8), Some(10)]
    );
    assert_eq!(
        state.series[1].values,
        vec![Some(10), Some(20), None, Some(40), Some(50)]
    );
    assert_eq!(
        state.column_overlaps,
        vec![vec![(0, 1)], vec![(0, 1)], vec![], vec![(0, 1)], vec![(0, 1)]]
    );
    assert_eq!(state.series[1].stats.count, 4);
}

#[test]
fn latest_round_failure_clears_the_latest_overlap() {
    let a = target("A", ColorTag::Red);
    let b = target("B", ColorTag::Blue);
    let sa = rounds_from(1, &[40, 40]);
    let sb = rounds_from(1, &[40]);
    let state = project(
        &[input(&a, &sa), input(&b, &sb)],
        span(2),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );

    assert_eq!(state.series[1].bars, vec![Some(10), None]);
    assert_eq!(state.column_overlaps, vec![vec![(0, 1)], vec![]]);
    assert!(state.overlaps.is_empty());
}

#[test]
fn samples_older_than_the_span_are_not_drawn() {
    let a = target("A", ColorTag::Red);
    // Rounds 2..=6 retained, but only the last four rounds are on screen.
    let samples = rounds_from(2, &[500, 10, 20, 30, 40]);
    let state = project(
        &[input(&a, &samples)],
        RoundSpan::new(6, 4),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );

    assert_eq!(state.columns, 4);
    assert_eq!(state.peak_ms, 40);
    assert_eq!(state.series[0].values, vec![Some(10), Some(20), Some(30), Some(40)]);
}

#[test]
fn excluded_colors_do_not_scale_or_overlap() {
    let a = target("A", ColorTag::Green);
    let b = target("B", ColorTag::Blue);
    let config = AggregateConfig {
        excluded_colors: vec![ColorTag::Green],
        ..AggregateConfig::default()
    };
    let (sa, sb) = (rounds_from(1, &[500]), rounds_from(1, &[499]));
    let state = project(
        &[input(&a, &sa), input(&b, &sb)],
        span(1),
        &config,
        &ChartConfig::default(),
    );

    assert_eq!(state.peak_ms, 499);
    assert!(state.series[0].excluded);
    assert_eq!(state.series[0].bars, vec![None]);
    assert_eq!(state.series[0].stats.mean, 500.0);
    assert!(state.overlaps.is_empty());
}

#[test]
fn sentinel_samples_leave_gaps() {
    let a = target("A", ColorTag::Red);
    let config = AggregateConfig {
        sentinel_ms: Some(0),
        ..AggregateConfig::default()
    };
    let samples = rounds_from(1, &[0, 40]);
    let state = project(&[input(&a, &samples)], span(2), &config, &ChartConfig::default());
    assert_eq!(state.series[0].bars, vec![None, Some(10)]);
    assert_eq!(state.series[0].values, vec![None, Some(40)]);
    assert_eq!(state.series[0].stats.mean, 40.0);
}

#[test]
fn unreachable_target_keeps_its_error_kind() {
    let a = target("A", ColorTag::Red);
    let b = target("B", ColorTag::Blue);
    let refused = NetworkError::new(NetworkErrorKind::ConnectionRefused, "refused");
    let sa = rounds_from(1, &[30]);
    let inputs = [
        input(&a, &sa),
        SeriesInput {
            target: &b,
            samples: &[],
            last_error: Some(&refused),
            throughput: None,
        },
    ];
    let state = project(
        &inputs,
        span(1),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );

    assert_eq!(state.series[1].stats.count, 0);
    assert_eq!(state.series[1].stats.mean, 0.0);
    assert_eq!(state.series[1].bars, vec![None]);
    assert_eq!(
        state.series[1].last_error,
        Some(NetworkErrorKind::ConnectionRefused)
    );
}

#[test]
fn nothing_sampled_yet() {
    let a = target("A", ColorTag::Red);
    let state = project(
        &[input(&a, &[])],
        span(0),
        &AggregateConfig::default(),
        &ChartConfig::default(),
    );
    assert!(!state.has_samples());
    assert_eq!(state.peak_ms, 0);
    assert!(state.overlaps.is_empty());
}
