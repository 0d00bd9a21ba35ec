use crate::report::domain::detection_sink::DetectionSink;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Forwards every report to a list of sinks in order.
///
/// A failing sink aborts the report immediately; on close every sink is
/// still closed and the first error wins.
pub struct FanoutSink {
    sinks: Vec<Box<dyn DetectionSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn DetectionSink>>) -> Self {
        Self { sinks }
    }
}

impl DetectionSink for FanoutSink {
    fn report(
        &mut self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<(), Box<dyn std::error::Error>> {
        for sink in &mut self.sinks {
            sink.report(frame, detections)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.close() {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
