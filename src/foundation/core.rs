use std::num::NonZeroU64;

use crate::foundation::error::{FlipError, FlipResult};

/// Output frame width expected by the display.
pub const TARGET_WIDTH: u32 = 128;
/// Output frame height expected by the display.
pub const TARGET_HEIGHT: u32 = 64;
/// Playback rate written to every manifest.
pub const FRAME_RATE: u32 = 6;
/// Animation duration written to every manifest.
pub const DURATION: u32 = 28800;

pub const DEFAULT_THRESHOLD: i32 = 200;
pub const DEFAULT_STRIDE: NonZeroU64 = NonZeroU64::MIN;

/// Luminance cutoff. A pixel is lit when its luminance is `>=` the threshold.
///
/// Values outside `0..=255` are accepted: `<= 0` lights every pixel, `> 255` lights none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Threshold(pub i32);

impl Threshold {
    pub fn is_lit(self, luma: u8) -> bool {
        i32::from(luma) >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

/// Number of source positions advanced between two retained frames (1 keeps every frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct Stride(NonZeroU64);

impl Stride {
    pub fn new(v: i64) -> FlipResult<Self> {
        u64::try_from(v)
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or_else(|| FlipError::invalid(format!("stride must be >= 1, got {v}")))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for Stride {
    fn default() -> Self {
        Self(DEFAULT_STRIDE)
    }
}

impl TryFrom<i64> for Stride {
    type Error = FlipError;

    fn try_from(v: i64) -> FlipResult<Self> {
        Self::new(v)
    }
}

impl From<Stride> for u64 {
    fn from(s: Stride) -> Self {
        s.get()
    }
}

/// Per-run conversion settings. Immutable once a run starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConversionParams {
    pub threshold: Threshold,
    pub stride: Stride,
}

impl ConversionParams {
    /// Build params from raw caller integers, rejecting a non-positive stride.
    pub fn new(threshold: i32, stride: i64) -> FlipResult<Self> {
        Ok(Self {
            threshold: Threshold(threshold),
            stride: Stride::new(stride)?,
        })
    }
}
