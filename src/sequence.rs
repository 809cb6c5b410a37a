use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    foundation::{
        core::ConversionParams,
        error::{FlipError, FlipResult},
    },
    frame::BinaryFrame,
    source::{FrameSource, Step},
    transform::transform,
};

/// Shared stop request, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Walks a [`FrameSource`] with a fixed stride and transforms every retained frame.
#[derive(Debug)]
pub struct Sequencer {
    params: ConversionParams,
    cancel: Option<CancelFlag>,
}

impl Sequencer {
    pub fn new(params: ConversionParams) -> Self {
        Self {
            params,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn params(&self) -> ConversionParams {
        self.params
    }

    /// Collect the transformed frames in output order.
    ///
    /// Any decode error or a raised cancel flag aborts the run and drops what was collected.
    #[tracing::instrument(skip_all, fields(path = %source.path().display(), stride = self.params.stride.get()))]
    pub fn run(&self, source: &mut FrameSource) -> FlipResult<Vec<BinaryFrame>> {
        let mut frames = Vec::new();
        loop {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                tracing::info!(collected = frames.len(), "conversion cancelled");
                return Err(FlipError::Cancelled);
            }

            let raw = match source.advance(self.params.stride)? {
                Step::Frame(raw) => raw,
                Step::End => break,
            };
            let out = transform(&raw, self.params.threshold);
            tracing::debug!(
                source_index = raw.source_index,
                output_index = frames.len(),
                lit = out.lit_count(),
                "frame converted"
            );
            frames.push(out);
        }

        tracing::info!(
            frames = frames.len(),
            visited = source.frames_visited(),
            "sequence complete"
        );
        Ok(frames)
    }
}
