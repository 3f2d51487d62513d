use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ShorelineError, ShorelineResult};
use crate::foundation::opts::ShorelineOpts;
use crate::render::surface::FrameRGBA;

/// Options for [`GifSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GifSinkOpts {
    /// Quantizer speed, 1 (best quality) to 30 (fastest).
    pub speed: i32,
    /// Color partially transparent pixels are flattened over. GIF has no partial alpha.
    pub background: Rgba8,
    /// Loop forever instead of playing once.
    pub repeat: bool,
}

impl Default for GifSinkOpts {
    fn default() -> Self {
        Self {
            speed: 10,
            background: Rgba8::opaque(255, 255, 255),
            repeat: true,
        }
    }
}

impl GifSinkOpts {
    /// GIF settings from view options.
    pub fn from_opts(opts: &ShorelineOpts) -> Self {
        Self {
            speed: opts.gif_speed,
            background: opts.export_background,
            repeat: true,
        }
    }
}

/// Frame sink producing one animated GIF in memory.
///
/// Each frame is flattened, quantized and written as it arrives, so only the encoded stream is
/// held in memory. The bytes are only available after a successful `end`; a failed run never
/// yields a partial file.
pub struct GifSink {
    opts: GifSinkOpts,
    cfg: Option<SinkConfig>,
    encoder: Option<GifEncoder<SharedBuf>>,
    buf: SharedBuf,
    frames: usize,
    output: Option<Vec<u8>>,
}

impl GifSink {
    /// New sink with `opts`.
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            cfg: None,
            encoder: None,
            buf: SharedBuf::default(),
            frames: 0,
            output: None,
        }
    }

    /// Number of frames encoded since `begin`.
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Take the finished GIF. Fails if `end` has not completed.
    pub fn into_bytes(self) -> ShorelineResult<Vec<u8>> {
        self.output
            .ok_or_else(|| ShorelineError::encode("gif sink was not finalized"))
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> ShorelineResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ShorelineError::validation(
                "gif width/height must be non-zero",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(ShorelineError::validation(
                "gif width/height must fit in u16",
            ));
        }

        let buf = SharedBuf::default();
        let mut enc = GifEncoder::new_with_speed(buf.clone(), self.opts.speed.clamp(1, 30));
        let repeat = if self.opts.repeat {
            Repeat::Infinite
        } else {
            Repeat::Finite(0)
        };
        enc.set_repeat(repeat)
            .map_err(|e| ShorelineError::encode(format!("failed to set gif repeat: {e}")))?;

        self.cfg = Some(cfg);
        self.encoder = Some(enc);
        self.buf = buf;
        self.frames = 0;
        self.output = None;
        Ok(())
    }

    fn push_frame(&mut self, position: usize, frame: &FrameRGBA) -> ShorelineResult<()> {
        let (Some(cfg), Some(enc)) = (self.cfg.as_ref(), self.encoder.as_mut()) else {
            return Err(ShorelineError::encode("gif sink used before begin"));
        };
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ShorelineError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        let mut rgba = vec![0u8; frame.data.len()];
        flatten_to_opaque_rgba8(
            &mut rgba,
            &frame.data,
            frame.premultiplied,
            self.opts.background.to_array(),
        )?;
        let img = RgbaImage::from_raw(frame.width, frame.height, rgba).ok_or_else(|| {
            ShorelineError::encode("frame.data size mismatch with width*height*4")
        })?;

        let delay = Delay::from_saturating_duration(cfg.frame_delay);
        enc.encode_frame(Frame::from_parts(img, 0, 0, delay))
            .map_err(|e| ShorelineError::encode(format!("failed to encode gif frame: {e}")))?;
        self.frames += 1;
        tracing::trace!(position, frames = self.frames, "gif frame encoded");
        Ok(())
    }

    fn end(&mut self) -> ShorelineResult<()> {
        if self.frames == 0 {
            return Err(ShorelineError::encode("gif needs at least one frame"));
        }
        let Some(enc) = self.encoder.take() else {
            return Err(ShorelineError::encode("gif sink ended before begin"));
        };
        // Dropping the encoder writes the trailer.
        drop(enc);

        let bytes = self.buf.take();
        tracing::debug!(frames = self.frames, bytes = bytes.len(), "gif finalized");
        self.output = Some(bytes);
        Ok(())
    }
}

/// Growable byte buffer the encoder writes into while the sink keeps a handle to read it back.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl Write for SharedBuf {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ShorelineResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ShorelineError::encode(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;

        let (r, g, b) = if src_is_premul {
            (
                s[0] as u16 + mul_div255(bg_r, inv),
                s[1] as u16 + mul_div255(bg_g, inv),
                s[2] as u16 + mul_div255(bg_b, inv),
            )
        } else {
            (
                mul_div255(s[0] as u16, a) + mul_div255(bg_r, inv),
                mul_div255(s[1] as u16, a) + mul_div255(bg_g, inv),
                mul_div255(s[2] as u16, a) + mul_div255(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
