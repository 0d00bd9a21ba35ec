use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::patch_classifier::PatchClassifier;
use crate::detection::domain::window_scanner::WindowScanner;
use crate::report::domain::detection_sink::DetectionSink;
use crate::shared::source_metadata::SourceMetadata;

use super::pipeline_executor::{
    FrameErrorPolicy, PipelineConfig, PipelineExecutor, PipelineSummary,
};

/// Orchestrates the full frame scanning pipeline.
///
/// Wires domain components together and delegates execution to a
/// `PipelineExecutor`. This is a single-use struct: `execute` consumes
/// the owned components, so calling it twice will fail.
pub struct ScanFramesUseCase {
    source: Option<Box<dyn FrameSource>>,
    classifier: Option<Box<dyn PatchClassifier>>,
    scanner: Option<WindowScanner>,
    sink: Option<Box<dyn DetectionSink>>,
    executor: Box<dyn PipelineExecutor>,
    frame_error_policy: FrameErrorPolicy,
    on_progress: Option<Box<dyn Fn(usize, Option<usize>) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl ScanFramesUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        classifier: Box<dyn PatchClassifier>,
        scanner: WindowScanner,
        sink: Box<dyn DetectionSink>,
        executor: Box<dyn PipelineExecutor>,
        frame_error_policy: FrameErrorPolicy,
        on_progress: Option<Box<dyn Fn(usize, Option<usize>) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source: Some(source),
            classifier: Some(classifier),
            scanner: Some(scanner),
            sink: Some(sink),
            executor,
            frame_error_policy,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        metadata: &SourceMetadata,
    ) -> Result<PipelineSummary, Box<dyn std::error::Error>> {
        let config = PipelineConfig {
            frame_error_policy: self.frame_error_policy,
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };

        let summary = self.executor.execute(
            self.source.take().ok_or("Pipeline already executed")?,
            self.classifier.take().ok_or("Pipeline already executed")?,
            self.scanner.take().ok_or("Pipeline already executed")?,
            self.sink.take().ok_or("Pipeline already executed")?,
            metadata,
            config,
        )?;

        log::info!(
            "Scan complete: {} frame(s) scanned, {} skipped, {} detection(s), {} window failure(s)",
            summary.frames_scanned,
            summary.frames_skipped,
            summary.detections,
            summary.windows_failed
        );
        Ok(summary)
    }
}
