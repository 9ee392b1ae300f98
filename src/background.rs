use std::fmt;

use tiny_skia::{IntSize, Pixmap};

use crate::error::DrawingError;

/// Decoded underlay image supplied by the host.
///
/// Pixels are straight (non-premultiplied) RGBA, row-major. The drawing core
/// never decodes files itself; see [`crate::gallery`] for that.
#[derive(Clone)]
pub struct BackgroundImage {
    width: u32,
    height: u32,
    pixmap: Pixmap,
}

impl fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl BackgroundImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, DrawingError> {
        let expected = width as usize * height as usize * 4;
        let invalid = |actual| DrawingError::InvalidBackground {
            width,
            height,
            expected,
            actual,
        };
        if rgba.len() != expected {
            return Err(invalid(rgba.len()));
        }
        let size = IntSize::from_wh(width, height).ok_or_else(|| invalid(rgba.len()))?;

        let mut data = rgba;
        premultiply(&mut data);
        let pixmap = Pixmap::from_vec(data, size).ok_or_else(|| invalid(expected))?;

        Ok(Self {
            width,
            height,
            pixmap,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

// tiny-skia stores premultiplied alpha
fn premultiply(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}
