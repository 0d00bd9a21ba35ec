use std::fmt;

use ndarray::{s, ArrayView3, ArrayViewMut3};

/// Pixel layout of a frame's byte buffer.
///
/// Classifier models are trained on one of these; conversion happens at I/O
/// boundaries only, the scan layer treats pixel data as opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
}

impl PixelFormat {
    pub fn channels(self) -> u8 {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Gray8 => write!(f, "gray8"),
            PixelFormat::Rgb8 => write!(f, "rgb8"),
        }
    }
}

/// A single captured frame: contiguous pixel bytes in row-major order.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (format.channels() as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            format,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> u8 {
        self.format.channels()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Borrows the window at `(x, y)` with size `width` × `height` as a
    /// read-only view. Extraction never copies or mutates the frame.
    ///
    /// Panics if the window does not lie fully inside the frame.
    pub fn patch(&self, x: u32, y: u32, width: u32, height: u32) -> Patch<'_> {
        assert!(
            x.checked_add(width).is_some_and(|r| r <= self.width)
                && y.checked_add(height).is_some_and(|b| b <= self.height),
            "patch {width}x{height} at ({x}, {y}) exceeds frame {}x{}",
            self.width,
            self.height
        );
        let pixels = self.as_ndarray().slice_move(s![
            y as usize..(y + height) as usize,
            x as usize..(x + width) as usize,
            ..
        ]);
        Patch {
            pixels,
            x,
            y,
            format: self.format,
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.format.channels() as usize,
        )
    }
}

/// A window-sized view into a frame, tagged with its origin.
///
/// Shape is `[H, W, C]` like the parent frame. Rows are not contiguous in
/// the parent buffer; use [`Patch::to_vec`] when a flat copy is needed.
pub struct Patch<'a> {
    pixels: ArrayView3<'a, u8>,
    x: u32,
    y: u32,
    format: PixelFormat,
}

impl Patch<'_> {
    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.pixels.shape()[1] as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.shape()[0] as u32
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channels(&self) -> u8 {
        self.format.channels()
    }

    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Copies the window into a contiguous row-major buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.pixels.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, PixelFormat::Rgb8, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.format(), PixelFormat::Rgb8);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_gray_frame_single_channel() {
        let frame = Frame::new(vec![7u8; 6], 3, 2, PixelFormat::Gray8, 0);
        assert_eq!(frame.channels(), 1);
        assert_eq!(frame.as_ndarray().shape(), &[2, 3, 1]);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::new(vec![100u8; 12], 2, 2, PixelFormat::Rgb8, 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, PixelFormat::Rgb8, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, PixelFormat::Rgb8, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_as_ndarray_mut_modification() {
        let mut frame = Frame::new(vec![0u8; 12], 2, 2, PixelFormat::Rgb8, 0);
        {
            let mut arr = frame.as_ndarray_mut();
            arr[[0, 1, 2]] = 128;
        }
        assert_eq!(frame.as_ndarray()[[0, 1, 2]], 128);
    }

    /// 4x4 gray frame where each pixel holds `10 * row + col`.
    fn indexed_frame() -> Frame {
        let mut data = Vec::with_capacity(16);
        for row in 0..4u8 {
            for col in 0..4u8 {
                data.push(10 * row + col);
            }
        }
        Frame::new(data, 4, 4, PixelFormat::Gray8, 0)
    }

    #[test]
    fn test_patch_views_expected_pixels() {
        let frame = indexed_frame();
        let patch = frame.patch(1, 2, 2, 2);
        assert_eq!(patch.x(), 1);
        assert_eq!(patch.y(), 2);
        assert_eq!(patch.width(), 2);
        assert_eq!(patch.height(), 2);
        let px = patch.pixels();
        assert_eq!(px[[0, 0, 0]], 21); // frame row 2, col 1
        assert_eq!(px[[0, 1, 0]], 22);
        assert_eq!(px[[1, 0, 0]], 31);
        assert_eq!(px[[1, 1, 0]], 32);
    }

    #[test]
    fn test_patch_covering_whole_frame() {
        let frame = indexed_frame();
        let patch = frame.patch(0, 0, 4, 4);
        assert_eq!((patch.width(), patch.height()), (4, 4));
        assert_eq!(patch.to_vec(), frame.data());
    }

    #[test]
    fn test_patch_to_vec_is_row_major() {
        let frame = indexed_frame();
        let patch = frame.patch(2, 0, 2, 3);
        assert_eq!(patch.to_vec(), vec![2, 3, 12, 13, 22, 23]);
    }

    #[test]
    fn test_patch_rgb_keeps_channels_interleaved() {
        // 2x1 RGB pixels: (1,2,3) then (4,5,6)
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6], 2, 1, PixelFormat::Rgb8, 0);
        let patch = frame.patch(1, 0, 1, 1);
        assert_eq!(patch.channels(), 3);
        assert_eq!(patch.to_vec(), vec![4, 5, 6]);
    }

    #[test]
    #[should_panic(expected = "exceeds frame")]
    fn test_patch_out_of_bounds_panics() {
        let frame = indexed_frame();
        frame.patch(3, 3, 2, 2);
    }

    #[test]
    fn test_pixel_format_display() {
        assert_eq!(PixelFormat::Gray8.to_string(), "gray8");
        assert_eq!(PixelFormat::Rgb8.to_string(), "rgb8");
    }
}
