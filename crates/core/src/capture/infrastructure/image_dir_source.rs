use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::source_metadata::SourceMetadata;

/// Adapts a single image file or a directory of stills to the
/// [`FrameSource`] interface.
///
/// Directory entries are filtered to known image extensions and visited in
/// name order. Every image is decoded with the `image` crate and converted
/// to the configured pixel format at the I/O boundary, so downstream code
/// only ever sees one format. A frame whose dimensions differ from the
/// first image surfaces as a per-frame error, not a panic.
pub struct ImageDirSource {
    path: PathBuf,
    format: PixelFormat,
    files: Vec<PathBuf>,
    metadata: Option<SourceMetadata>,
}

impl ImageDirSource {
    pub fn new(path: impl Into<PathBuf>, format: PixelFormat) -> Self {
        Self {
            path: path.into(),
            format,
            files: Vec::new(),
            metadata: None,
        }
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn collect_files(path: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(format!("No image files found in {}", path.display()).into());
    }
    Ok(files)
}

fn decode(
    path: &Path,
    format: PixelFormat,
    index: usize,
) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)?;
    let frame = match format {
        PixelFormat::Gray8 => {
            let gray = img.to_luma8();
            let (width, height) = gray.dimensions();
            Frame::new(gray.into_raw(), width, height, PixelFormat::Gray8, index)
        }
        PixelFormat::Rgb8 => {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            Frame::new(rgb.into_raw(), width, height, PixelFormat::Rgb8, index)
        }
    };
    Ok(frame)
}

impl FrameSource for ImageDirSource {
    fn open(&mut self) -> Result<SourceMetadata, Box<dyn std::error::Error>> {
        let files = collect_files(&self.path)?;
        let first = decode(&files[0], self.format, 0)?;

        let metadata = SourceMetadata {
            width: first.width(),
            height: first.height(),
            pixel_format: self.format,
            frame_count: Some(files.len()),
            source_path: Some(self.path.clone()),
        };
        self.files = files;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(metadata) = self.metadata.clone() else {
            return Box::new(std::iter::once(Err("ImageDirSource: not opened".into())));
        };
        let format = self.format;
        Box::new(
            self.files
                .drain(..)
                .enumerate()
                .map(move |(index, path)| {
                    let frame = decode(&path, format, index)?;
                    if frame.width() != metadata.width || frame.height() != metadata.height {
                        return Err(format!(
                            "{}: expected {}x{}, got {}x{}",
                            path.display(),
                            metadata.width,
                            metadata.height,
                            frame.width(),
                            frame.height()
                        )
                        .into());
                    }
                    Ok(frame)
                }),
        )
    }

    fn close(&mut self) {
        self.files.clear();
        self.metadata = None;
    }
}
