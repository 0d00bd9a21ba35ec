use thiserror::Error;

use crate::shared::frame::PixelFormat;
use crate::shared::source_metadata::SourceMetadata;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("window {window_width}x{window_height} exceeds frame {frame_width}x{frame_height}")]
    WindowExceedsFrame {
        window_width: u32,
        window_height: u32,
        frame_width: u32,
        frame_height: u32,
    },
    #[error("frame and window dimensions must be positive")]
    ZeroDimension,
    #[error("stride must be at least 1")]
    ZeroStride,
    #[error("threshold must be within 0.0..=1.0, got {0}")]
    ThresholdOutOfRange(f32),
    #[error("target label '{0}' is not in the label set")]
    TargetLabelMissing(String),
    #[error(
        "source is {actual_width}x{actual_height} but the scan is configured \
         for {expected_width}x{expected_height}"
    )]
    ResolutionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("source pixel format is {actual} but the scan is configured for {expected}")]
    PixelFormatMismatch {
        expected: PixelFormat,
        actual: PixelFormat,
    },
}

/// Immutable scan settings, assembled once at startup and passed explicitly.
///
/// Geometry is validated before any scan; a window larger than the frame is
/// a configuration error here, never a silent empty scan later.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub stride: u32,
    pub pixel_format: PixelFormat,
    pub target_label: String,
    pub threshold: f32,
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_width == 0
            || self.frame_height == 0
            || self.window_width == 0
            || self.window_height == 0
        {
            return Err(ConfigError::ZeroDimension);
        }
        if self.stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if self.window_width > self.frame_width || self.window_height > self.frame_height {
            return Err(ConfigError::WindowExceedsFrame {
                window_width: self.window_width,
                window_height: self.window_height,
                frame_width: self.frame_width,
                frame_height: self.frame_height,
            });
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        Ok(())
    }

    /// Checks an opened source against the configured scan geometry.
    /// Mismatches are caught here, at startup, not per frame.
    pub fn check_source(&self, meta: &SourceMetadata) -> Result<(), ConfigError> {
        if meta.width != self.frame_width || meta.height != self.frame_height {
            return Err(ConfigError::ResolutionMismatch {
                expected_width: self.frame_width,
                expected_height: self.frame_height,
                actual_width: meta.width,
                actual_height: meta.height,
            });
        }
        if meta.pixel_format != self.pixel_format {
            return Err(ConfigError::PixelFormatMismatch {
                expected: self.pixel_format,
                actual: meta.pixel_format,
            });
        }
        Ok(())
    }
}
