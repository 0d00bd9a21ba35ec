use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::patch_classifier::PatchClassifier;
use crate::detection::domain::window_scanner::WindowScanner;
use crate::report::domain::detection_sink::DetectionSink;
use crate::shared::source_metadata::SourceMetadata;

/// What to do when a whole frame fails to scan (decode error or a
/// classifier contract violation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameErrorPolicy {
    /// Log the error, count the frame as skipped, and continue.
    #[default]
    SkipFrame,
    /// Abort the run with the frame's error.
    Halt,
}

/// Configuration for a pipeline execution run.
pub struct PipelineConfig {
    pub frame_error_policy: FrameErrorPolicy,
    pub on_progress: Option<Box<dyn Fn(usize, Option<usize>) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_error_policy: FrameErrorPolicy::default(),
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Totals for a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub frames_scanned: usize,
    pub frames_skipped: usize,
    pub windows_failed: usize,
    pub detections: usize,
}

/// Abstracts how the capture → scan → report pipeline is executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. threaded, single-threaded).
pub trait PipelineExecutor: Send {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        classifier: Box<dyn PatchClassifier>,
        scanner: WindowScanner,
        sink: Box<dyn DetectionSink>,
        metadata: &SourceMetadata,
        config: PipelineConfig,
    ) -> Result<PipelineSummary, Box<dyn std::error::Error>>;
}
