use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ShorelineError, ShorelineResult};

/// One captured frame of pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8, tightly packed.
    pub data: Vec<u8>,
    /// `true` when `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Copy with straight (non-premultiplied) alpha, as PNG encoders expect.
    pub fn to_straight(&self) -> FrameRGBA {
        if !self.premultiplied {
            return self.clone();
        }
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }
}

/// Fixed-size CPU raster target shared by scrub, autoplay, mode exit and export.
///
/// Pixels are premultiplied RGBA8. The size is fixed at construction.
pub struct Surface {
    canvas: Canvas,
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
}

impl Surface {
    /// Allocate a transparent surface of `canvas` size.
    pub fn new(canvas: Canvas) -> ShorelineResult<Self> {
        canvas.validate()?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ShorelineError::validation("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ShorelineError::validation("surface height exceeds u16"))?;
        Ok(Self {
            canvas,
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            ctx: None,
        })
    }

    /// Surface size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Rgba8) {
        let premul = color.to_premul();
        if premul == [0, 0, 0, 0] {
            self.pixmap.data_as_u8_slice_mut().fill(0);
            return;
        }
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        let px = self.data().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// `true` when every pixel equals the premultiplied `color`.
    pub fn is_uniform(&self, color: Rgba8) -> bool {
        let premul = color.to_premul();
        self.data().chunks_exact(4).all(|px| px == premul.as_slice())
    }

    /// Copy the current pixels out as a frame.
    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }

    /// Run `f` against a reset render context, then rasterize its commands onto the surface.
    pub(crate) fn draw(&mut self, f: impl FnOnce(&mut vello_cpu::RenderContext)) {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == self.width && ctx.height() == self.height => ctx,
            _ => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();
        f(&mut ctx);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx = Some(ctx);
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
