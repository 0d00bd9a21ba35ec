use std::sync::atomic::Ordering;

use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::patch_classifier::PatchClassifier;
use crate::detection::domain::window_scanner::{ScanReport, WindowScanner};
use crate::pipeline::pipeline_executor::{
    FrameErrorPolicy, PipelineConfig, PipelineExecutor, PipelineSummary,
};
use crate::report::domain::detection_sink::DetectionSink;
use crate::shared::frame::Frame;
use crate::shared::source_metadata::SourceMetadata;

const HANDOFF_CAPACITY: usize = 1;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Executes the scan pipeline with dedicated threads for capture and
/// classification.
///
/// Layout: `capture → scan → main [report]`
///
/// Channels hold a single frame, so capture decodes the next frame while
/// the scanner works on the current one without buffering further ahead.
pub struct ThreadedPipelineExecutor {
    handoff_capacity: usize,
}

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self {
            handoff_capacity: HANDOFF_CAPACITY,
        }
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        classifier: Box<dyn PatchClassifier>,
        scanner: WindowScanner,
        mut sink: Box<dyn DetectionSink>,
        metadata: &SourceMetadata,
        config: PipelineConfig,
    ) -> Result<PipelineSummary, Box<dyn std::error::Error>> {
        let total_frames = metadata.frame_count;
        let cap = self.handoff_capacity;

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Result<Frame, SendError>>(cap);
        let (scanned_tx, scanned_rx) =
            crossbeam_channel::bounded::<Result<(Frame, ScanReport), SendError>>(cap);

        let capture_handle = spawn_capture(source, frame_tx, config.cancelled.clone());
        let scan_handle = spawn_scanner(
            classifier,
            scanner,
            frame_rx,
            scanned_tx,
            config.cancelled.clone(),
        );

        let (summary, main_error) = run_main_loop(scanned_rx, &mut *sink, total_frames, &config);

        join_threads(capture_handle, scan_handle, &mut *sink, main_error)?;
        Ok(summary)
    }
}

fn spawn_capture(
    mut source: Box<dyn FrameSource>,
    frame_tx: crossbeam_channel::Sender<Result<Frame, SendError>>,
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
) -> std::thread::JoinHandle<Box<dyn FrameSource>> {
    std::thread::spawn(move || {
        for frame_result in source.frames() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
            if frame_tx.send(mapped).is_err() {
                break;
            }
        }
        source.close();
        source
    })
}

fn spawn_scanner(
    mut classifier: Box<dyn PatchClassifier>,
    scanner: WindowScanner,
    frame_rx: crossbeam_channel::Receiver<Result<Frame, SendError>>,
    scanned_tx: crossbeam_channel::Sender<Result<(Frame, ScanReport), SendError>>,
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
) -> std::thread::JoinHandle<Box<dyn PatchClassifier>> {
    std::thread::spawn(move || {
        for frame_result in frame_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }

            let result = match frame_result {
                Ok(frame) => match scanner.scan(&frame, classifier.as_mut()) {
                    Ok(report) => Ok((frame, report)),
                    Err(e) => Err(e.to_string().into()),
                },
                Err(e) => Err(e),
            };

            if scanned_tx.send(result).is_err() {
                break;
            }
        }
        classifier
    })
}

/// Runs the main thread loop: receive scanned frames, apply the frame
/// error policy, and hand results to the sink.
fn run_main_loop(
    scanned_rx: crossbeam_channel::Receiver<Result<(Frame, ScanReport), SendError>>,
    sink: &mut dyn DetectionSink,
    total_frames: Option<usize>,
    config: &PipelineConfig,
) -> (PipelineSummary, Option<Box<dyn std::error::Error>>) {
    let mut summary = PipelineSummary::default();

    for scanned_result in scanned_rx {
        if config.cancelled.load(Ordering::Relaxed) {
            break;
        }

        let (frame, report) = match scanned_result {
            Ok(pair) => pair,
            Err(e) => match config.frame_error_policy {
                FrameErrorPolicy::SkipFrame => {
                    log::warn!("skipping frame: {e}");
                    summary.frames_skipped += 1;
                    continue;
                }
                FrameErrorPolicy::Halt => return (summary, Some(e.to_string().into())),
            },
        };

        summary.frames_scanned += 1;
        summary.windows_failed += report.windows_failed;
        summary.detections += report.detections.len();

        if let Err(e) = sink.report(&frame, &report.detections) {
            return (summary, Some(e));
        }

        if let Some(ref callback) = config.on_progress {
            let done = summary.frames_scanned + summary.frames_skipped;
            if !callback(done, total_frames) {
                return (summary, Some("Cancelled".into()));
            }
        }
    }

    (summary, None)
}

/// Joins the pipeline threads, closes the sink, and coalesces the first
/// error encountered.
fn join_threads(
    capture_handle: std::thread::JoinHandle<Box<dyn FrameSource>>,
    scan_handle: std::thread::JoinHandle<Box<dyn PatchClassifier>>,
    sink: &mut dyn DetectionSink,
    mut first_error: Option<Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    fn set_if_none(slot: &mut Option<Box<dyn std::error::Error>>, err: Box<dyn std::error::Error>) {
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    match capture_handle.join() {
        Ok(mut s) => s.close(),
        Err(_) => set_if_none(&mut first_error, "Capture thread panicked".into()),
    }

    if scan_handle.join().is_err() {
        set_if_none(&mut first_error, "Scan thread panicked".into());
    }

    if let Err(e) = sink.close() {
        set_if_none(&mut first_error, e);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
