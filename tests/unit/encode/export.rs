use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::foundation::opts::ShorelineOpts;
use crate::render::surface::FrameRGBA;
use crate::sequence::index::DuplicateDatePolicy;
use crate::sequence::snapshot::{Ring, Snapshot};
use std::time::Duration;

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn rings() -> [Ring; 3] {
    [
        Ring::from_pairs(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
        Ring::from_pairs(&[[0.0, 0.0], [2.0, 0.0], [1.0, 3.0]]),
        Ring::from_pairs(&[[0.0, 0.0], [5.0, 0.0], [5.0, 1.0], [0.0, 1.0]]),
    ]
}

fn fixture() -> (SequenceIndex, FrameRenderer, Surface) {
    let [a, b, c] = rings();
    let seq = SequenceIndex::new(
        vec![
            Snapshot::new(d(3, 1), c),
            Snapshot::new(d(1, 1), a),
            Snapshot::new(d(2, 1), b),
        ],
        DuplicateDatePolicy::KeepFirst,
    );
    let canvas = Canvas::new(48, 32).unwrap();
    let opts = ShorelineOpts {
        canvas,
        ..ShorelineOpts::default()
    };
    (seq, FrameRenderer::from_opts(&opts), Surface::new(canvas).unwrap())
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 48,
        height: 32,
        frame_delay: Duration::from_millis(100),
    }
}

#[test]
fn file_name_uses_lake_and_start_date() {
    assert_eq!(
        export_file_name("Tuz", d(9, 5)),
        "Tuz_polygons_2024-09-05_to_end.gif"
    );
}

#[test]
fn exports_tail_in_order() {
    let (seq, renderer, mut surface) = fixture();
    let mut sink = InMemorySink::new();
    let n = export_frames(&seq, 1, &renderer, &mut surface, &mut sink, cfg(), None).unwrap();
    assert_eq!(n, 2);
    assert!(sink.is_ended());
    let positions: Vec<usize> = sink.frames().iter().map(|(p, _)| *p).collect();
    assert_eq!(positions, vec![1, 2]);

    let [_, b, c] = rings();
    let mut reference = Surface::new(surface.canvas()).unwrap();
    renderer.render(&mut reference, Some(&b));
    assert_eq!(sink.frames()[0].1, reference.snapshot());
    renderer.render(&mut reference, Some(&c));
    assert_eq!(sink.frames()[1].1, reference.snapshot());
    assert_ne!(sink.frames()[0].1, sink.frames()[1].1);
}

#[test]
fn past_the_end_is_empty_range_and_sink_untouched() {
    let (seq, renderer, mut surface) = fixture();
    let mut sink = InMemorySink::new();
    let err = export_frames(&seq, 3, &renderer, &mut surface, &mut sink, cfg(), None).unwrap_err();
    assert!(matches!(err, ShorelineError::EmptyRange { from: 3, len: 3 }));
    assert!(sink.config().is_none());
    assert!(!sink.is_ended());
}

#[test]
fn passed_deadline_fails_without_finalizing() {
    let (seq, renderer, mut surface) = fixture();
    let mut sink = InMemorySink::new();
    let deadline = Instant::now();
    let err = export_frames(
        &seq,
        0,
        &renderer,
        &mut surface,
        &mut sink,
        cfg(),
        Some(deadline),
    )
    .unwrap_err();
    assert!(matches!(err, ShorelineError::EncodeFailed(m) if m.contains("timed out")));
    assert!(!sink.is_ended());
}

#[test]
fn mismatched_sink_size_is_rejected() {
    let (seq, renderer, mut surface) = fixture();
    let mut sink = InMemorySink::new();
    let bad = SinkConfig {
        width: 10,
        ..cfg()
    };
    assert!(matches!(
        export_frames(&seq, 0, &renderer, &mut surface, &mut sink, bad, None),
        Err(ShorelineError::EncodeFailed(_))
    ));
}

/// Sink whose per-frame encode takes `cost`, like a quantizing encoder.
struct SlowSink {
    inner: InMemorySink,
    cost: Duration,
}

impl FrameSink for SlowSink {
    fn begin(&mut self, cfg: SinkConfig) -> ShorelineResult<()> {
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, position: usize, frame: &FrameRGBA) -> ShorelineResult<()> {
        std::thread::sleep(self.cost);
        self.inner.push_frame(position, frame)
    }

    fn end(&mut self) -> ShorelineResult<()> {
        self.inner.end()
    }
}

#[test]
fn slow_frame_encoding_counts_against_the_deadline() {
    let (seq, renderer, mut surface) = fixture();
    let mut sink = SlowSink {
        inner: InMemorySink::new(),
        cost: Duration::from_millis(40),
    };
    let deadline = Instant::now() + Duration::from_millis(10);
    let err = export_frames(
        &seq,
        0,
        &renderer,
        &mut surface,
        &mut sink,
        cfg(),
        Some(deadline),
    )
    .unwrap_err();
    assert!(matches!(err, ShorelineError::EncodeFailed(m) if m.contains("after 1 of 3")));
    assert!(!sink.inner.is_ended());
}

#[test]
fn overrun_on_the_last_frame_still_fails() {
    let (seq, renderer, mut surface) = fixture();
    let mut sink = SlowSink {
        inner: InMemorySink::new(),
        cost: Duration::from_millis(40),
    };
    let deadline = Instant::now() + Duration::from_millis(10);
    let err = export_frames(
        &seq,
        2,
        &renderer,
        &mut surface,
        &mut sink,
        cfg(),
        Some(deadline),
    )
    .unwrap_err();
    assert!(matches!(err, ShorelineError::EncodeFailed(m) if m.contains("after 1 of 1")));
    assert_eq!(sink.inner.frames().len(), 1);
    assert!(!sink.inner.is_ended());
}
