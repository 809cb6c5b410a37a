pub mod manifest;
pub mod writer;

pub use manifest::{MANIFEST_FILE_NAME, Manifest};
pub use writer::{AnimationAsset, AssetWriter, frame_file_name, inspect_asset};
