use crate::shared::scan_config::{ConfigError, ScanConfig};

/// Deterministic window placement over a frame.
///
/// Columns advance left to right and rows top to bottom, both in steps of
/// `stride`. Per axis the count is `(frame - window) / stride + 1` with
/// integer division, so the last row and column of pixels that no full
/// window reaches are never scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGrid {
    frame_width: u32,
    frame_height: u32,
    window_width: u32,
    window_height: u32,
    stride: u32,
    horizontal_count: u32,
    vertical_count: u32,
}

impl WindowGrid {
    /// Builds the grid for a configuration, validating it first.
    pub fn from_config(config: &ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            frame_width: config.frame_width,
            frame_height: config.frame_height,
            window_width: config.window_width,
            window_height: config.window_height,
            stride: config.stride,
            horizontal_count: (config.frame_width - config.window_width) / config.stride + 1,
            vertical_count: (config.frame_height - config.window_height) / config.stride + 1,
        })
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    pub fn window_width(&self) -> u32 {
        self.window_width
    }

    pub fn window_height(&self) -> u32 {
        self.window_height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn horizontal_count(&self) -> u32 {
        self.horizontal_count
    }

    pub fn vertical_count(&self) -> u32 {
        self.vertical_count
    }

    /// Total windows in one frame scan. At least 1 for any valid grid.
    pub fn window_count(&self) -> usize {
        self.horizontal_count as usize * self.vertical_count as usize
    }

    /// Window origins in raster order: top-to-bottom rows, left-to-right
    /// within a row. This order is part of the scan contract; it fixes the
    /// emission order of detections.
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32)> {
        let stride = self.stride;
        let horizontal = self.horizontal_count;
        (0..self.vertical_count).flat_map(move |row| {
            (0..horizontal).map(move |col| (col * stride, row * stride))
        })
    }
}
