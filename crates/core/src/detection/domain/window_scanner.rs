use thiserror::Error;

use crate::detection::domain::patch_classifier::PatchClassifier;
use crate::detection::domain::window_grid::WindowGrid;
use crate::shared::detection::Detection;
use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::labels::LabelSet;
use crate::shared::scan_config::{ConfigError, ScanConfig};

#[derive(Error, Debug, PartialEq)]
pub enum ScanError {
    /// The classifier returned a probability vector of the wrong length.
    /// Every probability from such a backend is suspect, so the frame's
    /// scan is abandoned rather than partially reported.
    #[error("classifier returned {got} probabilities for window at ({x}, {y}), expected {expected}")]
    ContractViolation {
        expected: usize,
        got: usize,
        x: u32,
        y: u32,
    },
    /// The source broke its fixed-geometry contract mid-stream.
    #[error(
        "frame {index} is {width}x{height} {format}, scan expects \
         {expected_width}x{expected_height} {expected_format}"
    )]
    FrameMismatch {
        index: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
        expected_width: u32,
        expected_height: u32,
        expected_format: PixelFormat,
    },
}

/// Outcome of one frame scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanReport {
    /// Detections in raster order, never sorted by score.
    pub detections: Vec<Detection>,
    /// Windows evaluated, including ones whose classification failed.
    pub windows_scanned: usize,
    /// Windows skipped after a transient classifier failure.
    pub windows_failed: usize,
}

/// The scan driver: slides the window grid across one frame and aggregates
/// per-window classifier scores into detections for the target class.
///
/// Stateless between frames; one scanner serves the whole stream.
#[derive(Clone, Debug)]
pub struct WindowScanner {
    grid: WindowGrid,
    pixel_format: PixelFormat,
    target_index: usize,
    class_count: usize,
    threshold: f32,
}

impl WindowScanner {
    /// Fixes the grid geometry and resolves the target label to its index.
    /// All configuration errors surface here, before the first frame.
    pub fn new(config: &ScanConfig, labels: &LabelSet) -> Result<Self, ConfigError> {
        let grid = WindowGrid::from_config(config)?;
        let target_index = labels
            .index_of(&config.target_label)
            .ok_or_else(|| ConfigError::TargetLabelMissing(config.target_label.clone()))?;
        Ok(Self {
            grid,
            pixel_format: config.pixel_format,
            target_index,
            class_count: labels.len(),
            threshold: config.threshold,
        })
    }

    pub fn grid(&self) -> &WindowGrid {
        &self.grid
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Scans one frame, invoking the classifier once per window in raster
    /// order. Strictly sequential: a window's classification finishes
    /// before the next begins.
    ///
    /// A failing classification skips that window with a warning; the
    /// window is simply absent from the detections. A wrong-length
    /// probability vector aborts the frame with
    /// [`ScanError::ContractViolation`]. No retries either way.
    pub fn scan(
        &self,
        frame: &Frame,
        classifier: &mut dyn PatchClassifier,
    ) -> Result<ScanReport, ScanError> {
        if frame.width() != self.grid.frame_width()
            || frame.height() != self.grid.frame_height()
            || frame.format() != self.pixel_format
        {
            return Err(ScanError::FrameMismatch {
                index: frame.index(),
                width: frame.width(),
                height: frame.height(),
                format: frame.format(),
                expected_width: self.grid.frame_width(),
                expected_height: self.grid.frame_height(),
                expected_format: self.pixel_format,
            });
        }

        let window_width = self.grid.window_width();
        let window_height = self.grid.window_height();
        let mut detections = Vec::new();
        let mut windows_failed = 0;

        for (x, y) in self.grid.positions() {
            let patch = frame.patch(x, y, window_width, window_height);
            let probs = match classifier.classify(&patch) {
                Ok(probs) => probs,
                Err(e) => {
                    log::warn!(
                        "frame {}: classifier failed on window at ({x}, {y}), skipping: {e}",
                        frame.index()
                    );
                    windows_failed += 1;
                    continue;
                }
            };
            if probs.len() != self.class_count {
                return Err(ScanError::ContractViolation {
                    expected: self.class_count,
                    got: probs.len(),
                    x,
                    y,
                });
            }
            let score = probs[self.target_index];
            if score >= self.threshold {
                detections.push(Detection {
                    x,
                    y,
                    width: window_width,
                    height: window_height,
                    score,
                });
            }
        }

        Ok(ScanReport {
            detections,
            windows_scanned: self.grid.window_count(),
            windows_failed,
        })
    }
}
