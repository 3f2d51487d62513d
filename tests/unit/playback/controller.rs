use super::*;
use crate::sequence::index::DuplicateDatePolicy;
use crate::sequence::snapshot::{Ring, Snapshot};
use chrono::NaiveDate;

const TICK: Duration = Duration::from_millis(50);

fn seq(n: usize) -> SequenceIndex {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    SequenceIndex::new(
        (0..n)
            .map(|i| {
                Snapshot::new(
                    base + chrono::Days::new(i as u64 * 31),
                    Ring::from_pairs(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]),
                )
            })
            .collect(),
        DuplicateDatePolicy::KeepFirst,
    )
}

#[test]
fn ticker_carries_remainder() {
    let mut t = Ticker::new(TICK);
    assert_eq!(t.advance(Duration::from_millis(120)), 2);
    assert_eq!(t.advance(Duration::from_millis(29)), 0);
    assert_eq!(t.advance(Duration::from_millis(1)), 1);
    assert_eq!(t.advance(Duration::from_millis(500)), 10);
}

#[test]
fn starts_stopped_at_zero_or_without_position() {
    let c = PlaybackController::new(3, TICK);
    assert_eq!(c.position(), Some(0));
    assert!(!c.is_playing());
    let mut empty = PlaybackController::new(0, TICK);
    assert_eq!(empty.position(), None);
    assert_eq!(empty.play(DisplayMode::Shape), PlayOutcome::NoData);
    assert!(!empty.is_playing());
}

#[test]
fn double_play_keeps_a_single_tick_source() {
    let s = seq(50);
    let mut c = PlaybackController::new(s.len(), TICK);
    assert_eq!(c.play(DisplayMode::Shape), PlayOutcome::Started);
    assert_eq!(c.play(DisplayMode::Shape), PlayOutcome::AlreadyPlaying);

    let mut seen = Vec::new();
    for _ in 0..10 {
        c.advance(&s, TICK, |p| seen.push(p)).unwrap();
    }
    assert_eq!(seen, (1..=10).collect::<Vec<_>>());
    assert_eq!(c.position(), Some(10));
}

#[test]
fn ticks_wrap_to_start() {
    let s = seq(3);
    let mut c = PlaybackController::new(s.len(), TICK);
    c.scrub(&s, 2).unwrap();
    c.play(DisplayMode::Shape);
    let mut seen = Vec::new();
    c.advance(&s, TICK * 2, |p| seen.push(p)).unwrap();
    assert_eq!(seen, vec![0, 1]);
}

#[test]
fn pause_stops_ticks_immediately() {
    let s = seq(4);
    let mut c = PlaybackController::new(s.len(), TICK);
    c.play(DisplayMode::Shape);
    c.advance(&s, Duration::from_millis(70), |_| {}).unwrap();
    assert_eq!(c.position(), Some(1));
    assert!(c.pause());
    assert!(!c.pause());
    assert_eq!(c.advance(&s, Duration::from_secs(1), |_| {}).unwrap(), 0);
    assert_eq!(c.position(), Some(1));
}

#[test]
fn play_is_blocked_in_heatmap_mode() {
    let mut c = PlaybackController::new(3, TICK);
    assert_eq!(c.play(DisplayMode::Heatmap), PlayOutcome::BlockedByMode);
    assert!(!c.is_playing());
}

#[test]
fn scrub_rejects_bad_position_and_keeps_state() {
    let s = seq(3);
    let mut c = PlaybackController::new(s.len(), TICK);
    c.scrub(&s, 1).unwrap();
    assert!(c.scrub(&s, 3).is_err());
    assert_eq!(c.position(), Some(1));
}

#[test]
fn scrub_while_playing_continues_from_new_position() {
    let s = seq(5);
    let mut c = PlaybackController::new(s.len(), TICK);
    c.play(DisplayMode::Shape);
    c.scrub(&s, 3).unwrap();
    assert!(c.is_playing());
    c.advance(&s, TICK, |_| {}).unwrap();
    assert_eq!(c.position(), Some(4));
}

#[test]
fn stalled_host_backlog_is_capped() {
    let s = seq(5);
    let mut c = PlaybackController::new(s.len(), TICK);
    c.play(DisplayMode::Shape);
    let mut count = 0;
    let ticks = c.advance(&s, Duration::from_secs(60), |_| count += 1).unwrap();
    assert_eq!(ticks, MAX_CATCH_UP_TICKS);
    assert_eq!(count, MAX_CATCH_UP_TICKS);
}
