use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use crate::{
    asset::manifest::{MANIFEST_FILE_NAME, Manifest},
    foundation::error::{FlipError, FlipResult},
    frame::BinaryFrame,
};

const FRAME_EXT: &str = "png";

/// `frame_<i>.png`, index unpadded.
pub fn frame_file_name(index: u32) -> String {
    format!("frame_{index}.{FRAME_EXT}")
}

/// An animation directory on disk: frame files in output order plus the manifest.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AnimationAsset {
    pub dir: PathBuf,
    pub frame_files: Vec<PathBuf>,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

impl AnimationAsset {
    pub fn frame_count(&self) -> usize {
        self.frame_files.len()
    }
}

/// Persists a frame sequence as `frame_<i>.png` files plus `meta.txt`.
#[derive(Clone, Debug)]
pub struct AssetWriter {
    dir: PathBuf,
}

impl AssetWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every frame, in order, then the manifest.
    ///
    /// Files are written one by one with no rollback: on failure the directory may hold a prefix
    /// of the frames and no manifest.
    #[tracing::instrument(skip(self, frames), fields(dir = %self.dir.display(), frames = frames.len()))]
    pub fn write(&self, frames: &[BinaryFrame]) -> FlipResult<AnimationAsset> {
        ensure_dir(&self.dir)?;

        let count = u32::try_from(frames.len())
            .map_err(|_| FlipError::invalid("too many frames for one animation"))?;

        let mut frame_files = Vec::with_capacity(frames.len());
        for (i, frame) in (0..count).zip(frames) {
            let path = self.dir.join(frame_file_name(i));
            let bytes = encode_png(frame)?;
            std::fs::write(&path, bytes).map_err(|e| FlipError::io(&path, e))?;
            tracing::debug!(path = %path.display(), "wrote frame");
            frame_files.push(path);
        }

        let manifest = Manifest::for_frames(count);
        let manifest_path = self.dir.join(MANIFEST_FILE_NAME);
        std::fs::write(&manifest_path, manifest.render())
            .map_err(|e| FlipError::io(&manifest_path, e))?;

        tracing::info!(frames = count, "animation asset written");
        Ok(AnimationAsset {
            dir: self.dir.clone(),
            frame_files,
            manifest_path,
            manifest,
        })
    }
}

fn ensure_dir(dir: &Path) -> FlipResult<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(FlipError::io(
            dir,
            std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "output path exists and is not a directory",
            ),
        ));
    }
    std::fs::create_dir_all(dir).map_err(|e| FlipError::io(dir, e))
}

/// 1-bit grayscale PNG, white = 1.
pub fn encode_png(frame: &BinaryFrame) -> FlipResult<Vec<u8>> {
    use anyhow::Context as _;

    let mut out = Vec::new();
    let mut enc = png::Encoder::new(&mut out, frame.width(), frame.height());
    enc.set_color(png::ColorType::Grayscale);
    enc.set_depth(png::BitDepth::One);
    let mut writer = enc.write_header().context("write png header")?;
    writer
        .write_image_data(&frame.pack_rows())
        .context("write png image data")?;
    writer.finish().context("finish png stream")?;
    Ok(out)
}

/// Read back an asset directory and check it against its manifest.
///
/// Every listed frame must exist as a 128x64 1-bit grayscale PNG, and the directory must hold no
/// other `frame_<i>.png` files.
pub fn inspect_asset(dir: &Path) -> FlipResult<AnimationAsset> {
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    let text =
        std::fs::read_to_string(&manifest_path).map_err(|e| FlipError::io(&manifest_path, e))?;
    let manifest = Manifest::parse(&text)?;

    let mut frame_files = Vec::with_capacity(manifest.passive_frames as usize);
    for i in 0..manifest.passive_frames {
        let path = dir.join(frame_file_name(i));
        let bytes = std::fs::read(&path).map_err(|e| FlipError::io(&path, e))?;
        check_frame_png(&path, bytes)?;
        frame_files.push(path);
    }

    let on_disk = std::fs::read_dir(dir)
        .map_err(|e| FlipError::io(dir, e))?
        .filter_map(Result::ok)
        .filter(|entry| is_frame_file_name(&entry.file_name().to_string_lossy()))
        .count();
    if on_disk != frame_files.len() {
        return Err(FlipError::manifest(format!(
            "manifest declares {} frames but {on_disk} frame files are present",
            frame_files.len()
        )));
    }

    Ok(AnimationAsset {
        dir: dir.to_path_buf(),
        frame_files,
        manifest_path,
        manifest,
    })
}

fn is_frame_file_name(name: &str) -> bool {
    name.strip_prefix("frame_")
        .and_then(|rest| rest.strip_suffix(FRAME_EXT))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|idx| !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()))
}

fn check_frame_png(path: &Path, bytes: Vec<u8>) -> FlipResult<()> {
    let reader = png::Decoder::new(Cursor::new(bytes))
        .read_info()
        .map_err(|e| FlipError::decode(format!("'{}': {e}", path.display())))?;
    let info = reader.info();
    let ok = info.width == BinaryFrame::WIDTH
        && info.height == BinaryFrame::HEIGHT
        && info.bit_depth == png::BitDepth::One
        && info.color_type == png::ColorType::Grayscale;
    if !ok {
        return Err(FlipError::manifest(format!(
            "'{}' is {}x{} {:?}/{:?}, expected 128x64 1-bit grayscale",
            path.display(),
            info.width,
            info.height,
            info.color_type,
            info.bit_depth
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> BinaryFrame {
        BinaryFrame::from_fn(|x, y| (x / 8 + y / 8) % 2 == 0)
    }

    #[test]
    fn frame_names_are_unpadded() {
        assert_eq!(frame_file_name(0), "frame_0.png");
        assert_eq!(frame_file_name(12), "frame_12.png");
        assert!(is_frame_file_name("frame_12.png"));
        assert!(!is_frame_file_name("frame_.png"));
        assert!(!is_frame_file_name("frame_1.txt"));
        assert!(!is_frame_file_name("meta.txt"));
    }

    #[test]
    fn png_round_trips_through_image_crate() {
        let frame = checker();
        let bytes = encode_png(&frame).unwrap();

        let header = png::Decoder::new(Cursor::new(bytes.clone()))
            .read_info()
            .unwrap();
        assert_eq!(header.info().bit_depth, png::BitDepth::One);
        assert_eq!(header.info().color_type, png::ColorType::Grayscale);

        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (128, 64));
        for (x, y, p) in decoded.enumerate_pixels() {
            assert_eq!(p.0[0] != 0, frame.get(x, y), "pixel {x},{y}");
        }
    }

    #[test]
    fn write_then_inspect() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("anim");
        let frames = vec![checker(), BinaryFrame::filled(true), BinaryFrame::filled(false)];

        let asset = AssetWriter::new(&dir).write(&frames).unwrap();
        assert_eq!(asset.frame_count(), 3);
        assert_eq!(asset.manifest, Manifest::for_frames(3));
        assert!(dir.join("frame_2.png").is_file());

        let inspected = inspect_asset(&dir).unwrap();
        assert_eq!(inspected, asset);
    }

    #[test]
    fn empty_sequence_writes_manifest_only() {
        let tmp = tempfile::tempdir().unwrap();
        let asset = AssetWriter::new(tmp.path()).write(&[]).unwrap();
        assert_eq!(asset.frame_count(), 0);
        let text = std::fs::read_to_string(tmp.path().join(MANIFEST_FILE_NAME)).unwrap();
        assert!(text.contains("Passive frames: 0\nActive frames: 0\nFrames order: \n"));
    }

    #[test]
    fn file_in_the_way_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("taken");
        std::fs::write(&blocker, b"x").unwrap();

        let err = AssetWriter::new(&blocker)
            .write(&[checker()])
            .unwrap_err();
        assert!(matches!(err, FlipError::Io { .. }));
    }

    #[test]
    fn failure_mid_sequence_keeps_written_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("frame_1.png")).unwrap();

        let frames = vec![checker(), checker(), checker()];
        let err = AssetWriter::new(tmp.path()).write(&frames).unwrap_err();
        match err {
            FlipError::Io { path, .. } => assert_eq!(path, tmp.path().join("frame_1.png")),
            other => panic!("expected io error, got {other}"),
        }
        assert!(tmp.path().join("frame_0.png").is_file());
        assert!(!tmp.path().join("frame_2.png").exists());
        assert!(!tmp.path().join(MANIFEST_FILE_NAME).exists());
    }

    #[test]
    fn inspect_flags_stray_frames() {
        let tmp = tempfile::tempdir().unwrap();
        AssetWriter::new(tmp.path()).write(&[checker()]).unwrap();
        std::fs::copy(tmp.path().join("frame_0.png"), tmp.path().join("frame_7.png")).unwrap();

        assert!(matches!(
            inspect_asset(tmp.path()),
            Err(FlipError::Manifest(_))
        ));
    }
}
