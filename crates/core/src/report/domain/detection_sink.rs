use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Consumes per-frame scan results.
///
/// The pipeline calls [`report`](DetectionSink::report) exactly once per
/// successfully scanned frame, in frame order, with the detections already
/// in raster order. An empty slice means the frame was scanned and nothing
/// cleared the threshold. Sink failures are fatal to the run, so
/// implementations should only error when output is genuinely lost.
pub trait DetectionSink: Send {
    /// Records the detections for one frame.
    fn report(
        &mut self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes and releases any resources. Default: no-op.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
