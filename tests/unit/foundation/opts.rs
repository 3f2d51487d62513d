use super::*;

#[test]
fn defaults_match_dashboard_constants() {
    let o = ShorelineOpts::default();
    o.validate().unwrap();
    assert_eq!(o.canvas, Canvas::new(540, 360).unwrap());
    assert_eq!(o.tick_period(), Duration::from_millis(50));
    assert_eq!(o.frame_delay_ms, 100);
    assert_eq!(o.heatmap_cutoff, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    assert_eq!(o.heatmap_end, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
    assert_eq!(o.fill.a, 128);
}

#[test]
fn validate_rejects_bad_values() {
    let bad = [
        ShorelineOpts {
            tick_ms: 0,
            ..ShorelineOpts::default()
        },
        ShorelineOpts {
            heatmap_timeout_ms: 0,
            ..ShorelineOpts::default()
        },
        ShorelineOpts {
            export_timeout_ms: 0,
            ..ShorelineOpts::default()
        },
        ShorelineOpts {
            gif_speed: 0,
            ..ShorelineOpts::default()
        },
        ShorelineOpts {
            padding: 200.0,
            ..ShorelineOpts::default()
        },
        ShorelineOpts {
            heatmap_cutoff: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ..ShorelineOpts::default()
        },
    ];
    for o in bad {
        assert!(o.validate().is_err(), "{o:?}");
    }
}

#[test]
fn partial_json_fills_defaults() {
    let o: ShorelineOpts =
        serde_json::from_str(r##"{ "tick_ms": 20, "stroke": "#ff0000" }"##).unwrap();
    assert_eq!(o.tick_ms, 20);
    assert_eq!(o.stroke, Rgba8::opaque(255, 0, 0));
    assert_eq!(o.canvas, Canvas::default());
    assert_eq!(o.duplicate_policy, DuplicateDatePolicy::KeepFirst);
}
