/// Default probability threshold for reporting a window.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Default window step in pixels, applied along both axes.
pub const DEFAULT_STRIDE: u32 = 24;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
