//! Lazy, cursor-style access to the frames of an image container.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use image::{AnimationDecoder as _, ImageFormat, ImageReader, RgbaImage};

use crate::foundation::{
    core::Stride,
    error::{FlipError, FlipResult},
};

/// One decoded source frame, composited to the container's full canvas.
#[derive(Clone, Debug)]
pub struct RawFrame {
    /// 0-based index of this frame inside the container.
    pub source_index: u64,
    pub image: RgbaImage,
}

/// Result of advancing a [`FrameSource`].
#[derive(Debug)]
pub enum Step {
    Frame(RawFrame),
    /// The container has no frame at the requested position. Not an error.
    End,
}

enum Frames {
    Animated(image::Frames<'static>),
    Still(Option<RgbaImage>),
}

impl Frames {
    fn next_image(&mut self) -> Option<image::ImageResult<RgbaImage>> {
        match self {
            Frames::Animated(frames) => frames.next().map(|r| r.map(image::Frame::into_buffer)),
            Frames::Still(img) => img.take().map(Ok),
        }
    }
}

/// Open container walked front to back. Frames are decoded on demand.
pub struct FrameSource {
    path: PathBuf,
    format: ImageFormat,
    frames: Frames,
    /// Index the next decoded frame will carry.
    next_index: u64,
    last_yielded: Option<u64>,
    exhausted: bool,
}

impl FrameSource {
    /// Open `path`, sniffing the container format from its content.
    ///
    /// GIF, APNG and animated WebP are read frame by frame; every other format the `image`
    /// crate understands is treated as a single-frame source.
    #[tracing::instrument]
    pub fn open(path: &Path) -> FlipResult<Self> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| FlipError::decode(format!("open '{}': {e}", path.display())))?;
        let Some(format) = reader.format() else {
            return Err(FlipError::decode(format!(
                "'{}' is not a recognized image format",
                path.display()
            )));
        };

        let decode_err =
            |e: image::ImageError| FlipError::decode(format!("'{}': {e}", path.display()));
        let frames = match format {
            ImageFormat::Gif => {
                let dec = image::codecs::gif::GifDecoder::new(reader.into_inner())
                    .map_err(decode_err)?;
                Frames::Animated(dec.into_frames())
            }
            ImageFormat::Png => open_png(reader.into_inner()).map_err(decode_err)?,
            ImageFormat::WebP => open_webp(reader.into_inner()).map_err(decode_err)?,
            _ => Frames::Still(Some(reader.decode().map_err(decode_err)?.to_rgba8())),
        };

        tracing::debug!(?format, "opened frame source");
        Ok(Self {
            path: path.to_path_buf(),
            format,
            frames,
            next_index: 0,
            last_yielded: None,
            exhausted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Source index of the most recently yielded frame.
    pub fn position(&self) -> Option<u64> {
        self.last_yielded
    }

    /// Number of frames decoded so far, skipped ones included.
    pub fn frames_visited(&self) -> u64 {
        self.next_index
    }

    /// Move the cursor forward by `stride` positions and return the frame found there.
    ///
    /// The first call yields frame 0 whatever the stride. Running past the last frame, including
    /// while skipping, yields [`Step::End`]. Frames that are skipped are still decoded, so a
    /// corrupt skipped frame surfaces as a decode error.
    pub fn advance(&mut self, stride: Stride) -> FlipResult<Step> {
        let skip = match self.last_yielded {
            None => 0,
            Some(_) => stride.get() - 1,
        };
        for _ in 0..skip {
            if self.pull()?.is_none() {
                return Ok(Step::End);
            }
        }

        match self.pull()? {
            Some(image) => {
                let source_index = self.next_index - 1;
                self.last_yielded = Some(source_index);
                Ok(Step::Frame(RawFrame {
                    source_index,
                    image,
                }))
            }
            None => Ok(Step::End),
        }
    }

    fn pull(&mut self) -> FlipResult<Option<RgbaImage>> {
        if self.exhausted {
            return Ok(None);
        }
        match self.frames.next_image() {
            Some(Ok(img)) => {
                self.next_index += 1;
                Ok(Some(img))
            }
            Some(Err(e)) => Err(FlipError::decode(format!(
                "'{}' frame {}: {e}",
                self.path.display(),
                self.next_index
            ))),
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("next_index", &self.next_index)
            .finish()
    }
}

fn open_png(r: BufReader<File>) -> image::ImageResult<Frames> {
    let dec = image::codecs::png::PngDecoder::new(r)?;
    if dec.is_apng()? {
        return Ok(Frames::Animated(dec.apng()?.into_frames()));
    }
    let img = image::DynamicImage::from_decoder(dec)?;
    Ok(Frames::Still(Some(img.to_rgba8())))
}

fn open_webp(r: BufReader<File>) -> image::ImageResult<Frames> {
    let dec = image::codecs::webp::WebPDecoder::new(r)?;
    if dec.has_animation() {
        return Ok(Frames::Animated(dec.into_frames()));
    }
    let img = image::DynamicImage::from_decoder(dec)?;
    Ok(Frames::Still(Some(img.to_rgba8())))
}

#[cfg(test)]
mod tests {
    use image::{Delay, Frame, Rgba, codecs::gif::GifEncoder};

    use super::*;

    fn write_gif(path: &Path, count: u8) {
        let f = File::create(path).unwrap();
        let mut enc = GifEncoder::new(f);
        let frames = (0..count).map(|i| {
            let v = if i % 2 == 0 { 0 } else { 255 };
            let img = RgbaImage::from_pixel(4, 4, Rgba([v, v, v, 255]));
            Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(100, 1))
        });
        enc.encode_frames(frames).unwrap();
    }

    fn indices(src: &mut FrameSource, stride: i64) -> Vec<u64> {
        let stride = Stride::new(stride).unwrap();
        let mut out = Vec::new();
        while let Step::Frame(f) = src.advance(stride).unwrap() {
            out.push(f.source_index);
        }
        out
    }

    #[test]
    fn stride_walks_expected_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ten.gif");
        write_gif(&path, 10);

        let mut src = FrameSource::open(&path).unwrap();
        assert_eq!(src.format(), ImageFormat::Gif);
        assert_eq!(indices(&mut src, 3), vec![0, 3, 6, 9]);
        assert_eq!(src.position(), Some(9));

        let mut src = FrameSource::open(&path).unwrap();
        assert_eq!(indices(&mut src, 1), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn oversized_stride_ends_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.gif");
        write_gif(&path, 3);

        let mut src = FrameSource::open(&path).unwrap();
        assert_eq!(indices(&mut src, 50), vec![0]);
        let stride = Stride::new(50).unwrap();
        assert!(matches!(src.advance(stride).unwrap(), Step::End));

        let mut src = FrameSource::open(&path).unwrap();
        assert_eq!(indices(&mut src, i64::MAX), vec![0]);
    }

    #[test]
    fn still_image_has_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let mut src = FrameSource::open(&path).unwrap();
        assert_eq!(indices(&mut src, 1), vec![0]);
    }

    #[test]
    fn garbage_and_missing_inputs_are_decode_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.gif");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(
            FrameSource::open(&path),
            Err(FlipError::Decode(_))
        ));

        let missing = dir.path().join("missing.gif");
        assert!(matches!(
            FrameSource::open(&missing),
            Err(FlipError::Decode(_))
        ));
    }
}
