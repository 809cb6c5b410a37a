use crate::foundation::core::{TARGET_HEIGHT, TARGET_WIDTH};

const PIXELS: usize = (TARGET_WIDTH * TARGET_HEIGHT) as usize;

/// Bytes per packed 1-bit row.
pub const ROW_BYTES: usize = TARGET_WIDTH.div_ceil(8) as usize;

/// A 128x64 two-level frame, row-major, `true` meaning white (on).
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryFrame {
    bits: Vec<bool>,
}

impl BinaryFrame {
    pub const WIDTH: u32 = TARGET_WIDTH;
    pub const HEIGHT: u32 = TARGET_HEIGHT;

    /// Build a frame by sampling `f(x, y)` for every target pixel.
    pub fn from_fn(mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(PIXELS);
        for y in 0..Self::HEIGHT {
            for x in 0..Self::WIDTH {
                bits.push(f(x, y));
            }
        }
        Self { bits }
    }

    pub fn filled(on: bool) -> Self {
        Self {
            bits: vec![on; PIXELS],
        }
    }

    pub fn width(&self) -> u32 {
        Self::WIDTH
    }

    pub fn height(&self) -> u32 {
        Self::HEIGHT
    }

    /// Panics if `(x, y)` lies outside the frame.
    pub fn get(&self, x: u32, y: u32) -> bool {
        assert!(x < Self::WIDTH && y < Self::HEIGHT, "pixel out of bounds");
        self.bits[(y * Self::WIDTH + x) as usize]
    }

    pub fn lit_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// 8-bit grayscale view with values 0 and 255 only.
    pub fn to_luma8(&self) -> image::GrayImage {
        image::GrayImage::from_fn(Self::WIDTH, Self::HEIGHT, |x, y| {
            image::Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// Pack rows MSB-first, one bit per pixel, 1 = white.
    pub fn pack_rows(&self) -> Vec<u8> {
        let mut out = vec![0u8; ROW_BYTES * Self::HEIGHT as usize];
        for (row_idx, row) in self.bits.chunks_exact(Self::WIDTH as usize).enumerate() {
            let dst = &mut out[row_idx * ROW_BYTES..(row_idx + 1) * ROW_BYTES];
            for (x, &on) in row.iter().enumerate() {
                if on {
                    dst[x / 8] |= 0x80 >> (x % 8);
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for BinaryFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryFrame")
            .field("width", &Self::WIDTH)
            .field("height", &Self::HEIGHT)
            .field("lit", &self.lit_count())
            .finish()
    }
}
