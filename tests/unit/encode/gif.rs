use super::*;
use image::AnimationDecoder as _;
use std::time::Duration;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        frame_delay: Duration::from_millis(100),
    }
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

#[test]
fn flatten_premul_over_black_produces_expected_rgb() {
    // Premultiplied red @ 50% alpha => rgb is 128,0,0 when premul.
    let src = vec![128u8, 0u8, 0u8, 128u8];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128u8, 0u8, 0u8, 255u8]);
}

#[test]
fn flatten_transparent_takes_background() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [255, 255, 255, 255]).unwrap();
    assert_eq!(dst, vec![255, 255, 255, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 4], true, [0; 4]).is_err());
}

#[test]
fn encodes_decodable_animation_with_delay() {
    let mut sink = GifSink::new(GifSinkOpts::default());
    sink.begin(cfg(8, 6)).unwrap();
    sink.push_frame(0, &solid(8, 6, [255, 0, 0, 255])).unwrap();
    sink.push_frame(1, &solid(8, 6, [0, 0, 255, 255])).unwrap();
    sink.push_frame(2, &solid(8, 6, [0, 0, 0, 0])).unwrap();
    assert_eq!(sink.frame_count(), 3);
    sink.end().unwrap();
    let bytes = sink.into_bytes().unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");

    let decoder = image::codecs::gif::GifDecoder::new(std::io::Cursor::new(bytes)).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[0].delay(),
        Delay::from_saturating_duration(Duration::from_millis(100))
    );
    let first = frames[0].buffer().get_pixel(4, 3).0;
    assert!(first[0] > 200 && first[2] < 50, "{first:?}");
    let last = frames[2].buffer().get_pixel(0, 0).0;
    assert!(last[0] > 200 && last[1] > 200 && last[2] > 200, "{last:?}");
}

#[test]
fn size_mismatch_is_an_encode_error() {
    let mut sink = GifSink::new(GifSinkOpts::default());
    sink.begin(cfg(4, 4)).unwrap();
    assert!(matches!(
        sink.push_frame(0, &solid(2, 2, [0, 0, 0, 255])),
        Err(ShorelineError::EncodeFailed(_))
    ));
}

#[test]
fn no_bytes_without_successful_end() {
    let mut sink = GifSink::new(GifSinkOpts::default());
    sink.begin(cfg(4, 4)).unwrap();
    assert!(sink.end().is_err());
    assert!(sink.into_bytes().is_err());

    let unstarted = GifSink::new(GifSinkOpts::default());
    assert!(unstarted.into_bytes().is_err());
}

#[test]
fn frames_are_encoded_as_they_arrive() {
    let mut sink = GifSink::new(GifSinkOpts::default());
    sink.begin(cfg(8, 6)).unwrap();
    let header_only = sink.buf.0.borrow().len();
    sink.push_frame(0, &solid(8, 6, [0, 200, 0, 255])).unwrap();
    assert_eq!(sink.frame_count(), 1);
    assert!(sink.buf.0.borrow().len() > header_only);

    // A new run starts from an empty stream.
    sink.begin(cfg(8, 6)).unwrap();
    assert_eq!(sink.frame_count(), 0);
    assert!(sink.end().is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = GifSink::new(GifSinkOpts::default());
    assert!(sink.push_frame(0, &solid(1, 1, [0; 4])).is_err());
}
