//! Price-sequence scenarios run through the state machine

use chrono::{NaiveDate, Utc};
use levelwatch::models::{Direction, PriceSample, ReferenceLevels, Signal};
use levelwatch::signals::engine::SignalEngine;

fn levels(high: f64, low: f64) -> ReferenceLevels {
    ReferenceLevels {
        high,
        low,
        as_of: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
        fetched_at: Utc::now(),
    }
}

fn run_sequence(engine: &mut SignalEngine, levels: &ReferenceLevels, prices: &[f64]) -> Vec<Signal> {
    prices
        .iter()
        .filter_map(|price| {
            engine
                .evaluate(&PriceSample::new(*price), Some(levels))
                .unwrap()
        })
        .collect()
}

#[test]
fn session_sequence_emits_buy_then_sell() {
    let mut engine = SignalEngine::new();
    let levels = levels(48_000.0, 47_500.0);

    let signals = run_sequence(
        &mut engine,
        &levels,
        &[47_800.0, 48_100.0, 48_050.0, 47_900.0, 47_400.0, 47_600.0],
    );

    assert_eq!(signals.len(), 2);
    assert_eq!(signals[0].direction, Direction::Buy);
    assert_eq!(signals[0].price, 48_100.0);
    assert_eq!(signals[0].trigger_level, 48_000.0);
    assert_eq!(signals[1].direction, Direction::Sell);
    assert_eq!(signals[1].price, 47_400.0);
    assert_eq!(signals[1].trigger_level, 47_500.0);
}

#[test]
fn whipsaw_across_both_levels_fires_each_flip() {
    let mut engine = SignalEngine::new();
    let levels = levels(48_000.0, 47_500.0);

    let signals = run_sequence(&mut engine, &levels, &[48_100.0, 47_400.0, 48_100.0]);

    assert_eq!(signals.len(), 3);
    assert_eq!(signals[0].direction, Direction::Buy);
    assert_eq!(signals[1].direction, Direction::Sell);
    assert_eq!(signals[2].direction, Direction::Buy);
}

#[test]
fn level_change_rearms_against_new_thresholds() {
    let mut engine = SignalEngine::new();
    let old = levels(48_000.0, 47_500.0);

    let first = run_sequence(&mut engine, &old, &[48_100.0]);
    assert_eq!(first.len(), 1);

    // Replaced thresholds invalidate the armed state.
    let new = levels(48_200.0, 47_600.0);
    engine.reset();

    // The same price is now inside the new range and stays quiet; only a
    // breakout of the new high fires.
    let signals = run_sequence(&mut engine, &new, &[48_100.0, 48_250.0]);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].direction, Direction::Buy);
    assert_eq!(signals[0].trigger_level, 48_200.0);
}

#[test]
fn flat_sequence_inside_range_stays_quiet() {
    let mut engine = SignalEngine::new();
    let levels = levels(48_000.0, 47_500.0);

    let signals = run_sequence(
        &mut engine,
        &levels,
        &[47_600.0, 47_700.0, 47_950.0, 48_000.0, 47_500.0, 47_800.0],
    );

    assert!(signals.is_empty());
}
