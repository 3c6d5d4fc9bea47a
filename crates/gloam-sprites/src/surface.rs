//! Decoded pixel surfaces and the sub-image helpers renderers use.

/// A `width × height` image of premultiplied RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Surface {
    /// Bytes per pixel.
    pub const BPP: usize = 4;

    /// Wraps a pixel buffer. Returns `None` if its length doesn't match the
    /// dimensions.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width * height * Self::BPP).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw premultiplied RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * Self::BPP;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[i..i + Self::BPP]);
        Some(px)
    }

    /// Copies out the `w × h` rectangle at `(x, y)`.
    ///
    /// Returns `None` unless the rectangle lies entirely inside the surface.
    pub fn crop(&self, x: usize, y: usize, w: usize, h: usize) -> Option<Surface> {
        if x.checked_add(w)? > self.width || y.checked_add(h)? > self.height {
            return None;
        }
        let mut pixels = Vec::with_capacity(w * h * Self::BPP);
        for row in y..y + h {
            let start = (row * self.width + x) * Self::BPP;
            pixels.extend_from_slice(&self.pixels[start..start + w * Self::BPP]);
        }
        Some(Surface {
            width: w,
            height: h,
            pixels,
        })
    }
}

/// Cuts animation frame `frame` out of a vertically stacked sheet.
///
/// Each frame is `height / frames` rows tall; `frame` wraps modulo `frames`
/// and a frame count of zero is treated as one.
pub fn animation_frame(sheet: &Surface, frame: usize, frames: usize) -> Option<Surface> {
    let frames = frames.max(1);
    let h = sheet.height / frames;
    sheet.crop(0, (frame % frames) * h, sheet.width, h)
}

/// Cuts the cell for `pose` out of a mobile sheet.
///
/// Mobile sheets are 16 square cells wide. The low nibble of the pose picks
/// the column and the high nibble the row. Poses that fall off the sheet
/// have no cell.
pub fn mobile_frame(sheet: &Surface, pose: u8) -> Option<Surface> {
    let size = sheet.width / 16;
    if size == 0 {
        return None;
    }
    let x = usize::from(pose & 0x0F) * size;
    let y = usize::from(pose >> 4) * size;
    sheet.crop(x, y, size, size)
}
