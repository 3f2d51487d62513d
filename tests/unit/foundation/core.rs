use super::*;

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(Canvas::new(540, 360).unwrap(), Canvas::default());
}

#[test]
fn canvas_rgba_len_is_tightly_packed() {
    assert_eq!(Canvas::new(4, 3).unwrap().rgba_len(), 48);
}

#[test]
fn hex_parsing_accepts_both_lengths() {
    assert_eq!(
        Rgba8::parse_hex("#3498db").unwrap(),
        Rgba8::opaque(0x34, 0x98, 0xdb)
    );
    assert_eq!(
        Rgba8::parse_hex("3498DB80").unwrap(),
        Rgba8 {
            r: 0x34,
            g: 0x98,
            b: 0xdb,
            a: 0x80
        }
    );
    assert!(Rgba8::parse_hex("#123").is_err());
    assert!(Rgba8::parse_hex("#zzzzzz").is_err());
}

#[test]
fn color_deserializes_from_hex_and_array() {
    let c: Rgba8 = serde_json::from_str("\"#ff0000\"").unwrap();
    assert_eq!(c, Rgba8::opaque(255, 0, 0));
    let c: Rgba8 = serde_json::from_str("[1, 2, 3, 4]").unwrap();
    assert_eq!(c.to_array(), [1, 2, 3, 4]);
    assert!(serde_json::from_str::<Rgba8>("[1, 2]").is_err());
}

#[test]
fn premul_halves_channels_at_half_alpha() {
    let c = Rgba8::opaque(52, 152, 219).with_alpha(0.5);
    assert_eq!(c.a, 128);
    assert_eq!(c.to_premul(), [26, 76, 110, 128]);
    assert_eq!(Rgba8::transparent().to_premul(), [0, 0, 0, 0]);
}
