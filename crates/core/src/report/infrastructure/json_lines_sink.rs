use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::report::domain::detection_sink::DetectionSink;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: usize,
    detections: &'a [Detection],
}

/// Writes one JSON object per frame, newline-delimited.
///
/// Every scanned frame gets a line, including frames with no detections,
/// so downstream consumers can distinguish "nothing found" from "frame
/// skipped".
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        // Ensure parent directory exists (infrastructure concern)
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> DetectionSink for JsonLinesSink<W> {
    fn report(
        &mut self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let record = FrameRecord {
            frame: frame.index(),
            detections,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.writer.flush()?;
        Ok(())
    }
}
