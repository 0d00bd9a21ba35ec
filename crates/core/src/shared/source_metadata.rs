use std::path::PathBuf;

use crate::shared::frame::PixelFormat;

/// What a frame source reports when opened. Sources supply one fixed
/// resolution and format for their whole stream.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    /// `None` for unbounded sources (e.g. a live feed).
    pub frame_count: Option<usize>,
    pub source_path: Option<PathBuf>,
}
