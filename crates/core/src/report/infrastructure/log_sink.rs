use crate::report::domain::detection_sink::DetectionSink;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Reports detections through the `log` crate.
///
/// Frames with hits are logged at info level with one line per box;
/// empty frames are logged at debug level so a quiet run stays quiet.
pub struct LogSink {
    target_label: String,
    frames_reported: usize,
    detections_reported: usize,
}

impl LogSink {
    pub fn new(target_label: impl Into<String>) -> Self {
        Self {
            target_label: target_label.into(),
            frames_reported: 0,
            detections_reported: 0,
        }
    }

    pub fn frames_reported(&self) -> usize {
        self.frames_reported
    }

    pub fn detections_reported(&self) -> usize {
        self.detections_reported
    }
}

impl DetectionSink for LogSink {
    fn report(
        &mut self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.frames_reported += 1;
        self.detections_reported += detections.len();

        if detections.is_empty() {
            log::debug!("frame {}: no {} found", frame.index(), self.target_label);
            return Ok(());
        }

        log::info!(
            "frame {}: {} {} detection(s)",
            frame.index(),
            detections.len(),
            self.target_label
        );
        for d in detections {
            log::info!(
                "  {}x{} at ({}, {}) score {:.3}",
                d.width,
                d.height,
                d.x,
                d.y,
                d.score
            );
        }
        Ok(())
    }
}
