use std::path::{Path, PathBuf};

use crate::report::domain::detection_sink::DetectionSink;
use crate::shared::detection::Detection;
use crate::shared::frame::{Frame, PixelFormat};

/// Saves frames that contain detections as PNG files with the boxes drawn
/// in as one-pixel white borders.
///
/// Frames without detections are not written. Output files are named
/// `frame-NNNNNN.png` after the frame index.
pub struct AnnotatedFrameSink {
    dir: PathBuf,
    frames_written: usize,
}

impl AnnotatedFrameSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

fn draw_box(frame: &mut Frame, region: &Detection) {
    let right = region.right() as usize;
    let bottom = region.bottom() as usize;
    let top = region.y as usize;
    let left = region.x as usize;
    let channels = frame.channels() as usize;
    let mut pixels = frame.as_ndarray_mut();

    for x in left..=right {
        for ch in 0..channels {
            pixels[[top, x, ch]] = 255;
            pixels[[bottom, x, ch]] = 255;
        }
    }
    for y in top..=bottom {
        for ch in 0..channels {
            pixels[[y, left, ch]] = 255;
            pixels[[y, right, ch]] = 255;
        }
    }
}

fn save_frame(frame: &Frame, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match frame.format() {
        PixelFormat::Gray8 => {
            let img =
                image::GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                    .ok_or("Failed to create image from frame data")?;
            img.save(path)?;
        }
        PixelFormat::Rgb8 => {
            let img =
                image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                    .ok_or("Failed to create image from frame data")?;
            img.save(path)?;
        }
    }
    Ok(())
}

impl DetectionSink for AnnotatedFrameSink {
    fn report(
        &mut self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if detections.is_empty() {
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir)?;

        let mut annotated = frame.clone();
        for d in detections {
            draw_box(&mut annotated, d);
        }

        let path = self.dir.join(format!("frame-{:06}.png", frame.index()));
        save_frame(&annotated, &path)?;
        self.frames_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(index: usize) -> Frame {
        Frame::new(vec![0; 100], 10, 10, PixelFormat::Gray8, index)
    }

    fn detection(x: u32, y: u32, size: u32) -> Detection {
        Detection {
            x,
            y,
            width: size,
            height: size,
            score: 0.9,
        }
    }

    #[test]
    fn test_writes_annotated_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AnnotatedFrameSink::new(dir.path());
        sink.report(&gray_frame(3), &[detection(2, 2, 4)]).unwrap();

        let path = dir.path().join("frame-000003.png");
        assert!(path.exists());
        assert_eq!(sink.frames_written(), 1);
    }

    #[test]
    fn test_border_pixels_are_white() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AnnotatedFrameSink::new(dir.path());
        sink.report(&gray_frame(0), &[detection(2, 2, 4)]).unwrap();

        let img = image::open(dir.path().join("frame-000000.png"))
            .unwrap()
            .to_luma8();
        // Corners of the box border
        assert_eq!(img.get_pixel(2, 2).0, [255]);
        assert_eq!(img.get_pixel(5, 2).0, [255]);
        assert_eq!(img.get_pixel(2, 5).0, [255]);
        assert_eq!(img.get_pixel(5, 5).0, [255]);
        // Interior and exterior stay untouched
        assert_eq!(img.get_pixel(3, 3).0, [0]);
        assert_eq!(img.get_pixel(6, 6).0, [0]);
    }

    #[test]
    fn test_rgb_border_covers_all_channels() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AnnotatedFrameSink::new(dir.path());
        let frame = Frame::new(vec![10; 300], 10, 10, PixelFormat::Rgb8, 0);
        sink.report(&frame, &[detection(0, 0, 10)]).unwrap();

        let img = image::open(dir.path().join("frame-000000.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(9, 9).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(5, 5).0, [10, 10, 10]);
    }

    #[test]
    fn test_empty_frame_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AnnotatedFrameSink::new(dir.path());
        sink.report(&gray_frame(0), &[]).unwrap();

        assert!(!dir.path().join("frame-000000.png").exists());
        assert_eq!(sink.frames_written(), 0);
    }

    #[test]
    fn test_multiple_boxes_drawn() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = AnnotatedFrameSink::new(dir.path());
        sink.report(&gray_frame(0), &[detection(0, 0, 3), detection(6, 6, 3)])
            .unwrap();

        let img = image::open(dir.path().join("frame-000000.png"))
            .unwrap()
            .to_luma8();
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        assert_eq!(img.get_pixel(8, 8).0, [255]);
    }
}
