//! Turn animated images (GIF, APNG, animated WebP, or a still image) into 128x64 monochrome
//! animation assets for the Flipper Zero: one 1-bit PNG per frame plus a `meta.txt` manifest.
//!
//! The pipeline is [`FrameSource`] -> [`transform`] -> [`Sequencer`] -> [`AssetWriter`], wired
//! together by [`convert`].
#![forbid(unsafe_code)]

mod foundation;

pub mod asset;
pub mod frame;
pub mod pipeline;
pub mod sequence;
pub mod source;
pub mod transform;

pub use crate::asset::{
    AnimationAsset, AssetWriter, MANIFEST_FILE_NAME, Manifest, frame_file_name, inspect_asset,
};
pub use crate::foundation::core::{
    ConversionParams, DEFAULT_STRIDE, DEFAULT_THRESHOLD, DURATION, FRAME_RATE, Stride,
    TARGET_HEIGHT, TARGET_WIDTH, Threshold,
};
pub use crate::foundation::error::{FlipError, FlipResult};
pub use crate::frame::BinaryFrame;
pub use crate::pipeline::{ConversionReport, ConvertOpts, convert, convert_with};
pub use crate::sequence::{CancelFlag, Sequencer};
pub use crate::source::{FrameSource, RawFrame, Step};
pub use crate::transform::transform;
