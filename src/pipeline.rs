use std::path::{Path, PathBuf};

use crate::{
    asset::{AnimationAsset, AssetWriter},
    foundation::{core::ConversionParams, error::FlipResult},
    frame::BinaryFrame,
    sequence::{CancelFlag, Sequencer},
    source::FrameSource,
};

/// Options for [`convert_with`].
#[derive(Clone, Debug)]
pub struct ConvertOpts {
    pub input: PathBuf,
    /// `None` keeps the frames in memory only (preview).
    pub output_dir: Option<PathBuf>,
    pub params: ConversionParams,
    pub cancel: Option<CancelFlag>,
}

/// Summary of one conversion run.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    /// `None` for preview-only runs.
    pub output_dir: Option<PathBuf>,
    pub params: ConversionParams,
    pub frames: usize,
    pub source_frames_visited: u64,
    pub asset: Option<AnimationAsset>,
}

/// Convert `input` into display frames, writing an asset to `output_dir` when given.
///
/// The stride is validated before the input is opened. Nothing is written unless the whole
/// source decodes.
pub fn convert(
    input: &Path,
    output_dir: Option<&Path>,
    threshold: i32,
    stride: i64,
) -> FlipResult<Vec<BinaryFrame>> {
    let params = ConversionParams::new(threshold, stride)?;
    let (frames, _) = convert_with(ConvertOpts {
        input: input.to_path_buf(),
        output_dir: output_dir.map(Path::to_path_buf),
        params,
        cancel: None,
    })?;
    Ok(frames)
}

#[tracing::instrument(skip_all, fields(input = %opts.input.display()))]
pub fn convert_with(opts: ConvertOpts) -> FlipResult<(Vec<BinaryFrame>, ConversionReport)> {
    let mut source = FrameSource::open(&opts.input)?;

    let mut sequencer = Sequencer::new(opts.params);
    if let Some(cancel) = opts.cancel {
        sequencer = sequencer.with_cancel(cancel);
    }
    let frames = sequencer.run(&mut source)?;

    let asset = match &opts.output_dir {
        Some(dir) => Some(AssetWriter::new(dir).write(&frames)?),
        None => None,
    };

    let report = ConversionReport {
        input: opts.input,
        output_dir: opts.output_dir,
        params: opts.params,
        frames: frames.len(),
        source_frames_visited: source.frames_visited(),
        asset,
    };
    Ok((frames, report))
}
