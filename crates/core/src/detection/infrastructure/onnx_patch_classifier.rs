use std::path::Path;

use crate::detection::domain::patch_classifier::PatchClassifier;
use crate::shared::frame::{Patch, PixelFormat};

/// Patch classifier backed by an ONNX Runtime session.
///
/// Expects an image-classification model with a fixed NCHW input and one
/// score per class label on the first output. The input shape is read from
/// the model so callers can size the scan window to match. Classification
/// heads commonly emit raw logits, so a softmax is applied by default;
/// disable it for models that already produce probabilities.
pub struct OnnxPatchClassifier {
    session: ort::session::Session,
    input_width: Option<u32>,
    input_height: Option<u32>,
    input_channels: Option<u8>,
    softmax: bool,
}

impl OnnxPatchClassifier {
    /// Load a classifier ONNX model and prepare for inference.
    ///
    /// Dynamic input dimensions are left as `None`; callers must then
    /// supply the window size and pixel format themselves.
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        // Try to read the input shape from model metadata (NCHW: [1, C, H, W])
        let dims = session.inputs().first().and_then(|input| {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                if shape.len() >= 4 {
                    Some((shape[1], shape[2], shape[3]))
                } else {
                    None
                }
            } else {
                None
            }
        });

        let mut input_channels = None;
        let mut input_height = None;
        let mut input_width = None;
        if let Some((c, h, w)) = dims {
            if c == 1 || c == 3 {
                input_channels = Some(c as u8);
            }
            if h > 0 {
                input_height = Some(h as u32);
            }
            if w > 0 {
                input_width = Some(w as u32);
            }
        }

        Ok(Self {
            session,
            input_width,
            input_height,
            input_channels,
            softmax: true,
        })
    }

    pub fn with_softmax(mut self, enabled: bool) -> Self {
        self.softmax = enabled;
        self
    }

    /// Input width from the model metadata, if static.
    pub fn input_width(&self) -> Option<u32> {
        self.input_width
    }

    /// Input height from the model metadata, if static.
    pub fn input_height(&self) -> Option<u32> {
        self.input_height
    }

    /// Pixel format implied by the model's channel count, if static.
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        match self.input_channels {
            Some(1) => Some(PixelFormat::Gray8),
            Some(3) => Some(PixelFormat::Rgb8),
            _ => None,
        }
    }
}

impl PatchClassifier for OnnxPatchClassifier {
    fn classify(&mut self, patch: &Patch<'_>) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        if self.input_width.is_some_and(|w| w != patch.width())
            || self.input_height.is_some_and(|h| h != patch.height())
            || self.input_channels.is_some_and(|c| c != patch.channels())
        {
            return Err(format!(
                "patch {}x{}x{} does not match the model input shape",
                patch.width(),
                patch.height(),
                patch.channels()
            )
            .into());
        }

        let input_tensor = patch_to_tensor(patch);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("classifier model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let mut scores = data.to_vec();
        if self.softmax {
            softmax_in_place(&mut scores);
        }
        Ok(scores)
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Converts a patch to an NCHW float32 tensor, scaling bytes to `0.0..=1.0`.
fn patch_to_tensor(patch: &Patch<'_>) -> ndarray::Array4<f32> {
    let h = patch.height() as usize;
    let w = patch.width() as usize;
    let c = patch.channels() as usize;
    let src = patch.pixels();

    let mut tensor = ndarray::Array4::<f32>::zeros((1, c, h, w));
    for y in 0..h {
        for x in 0..w {
            for ch in 0..c {
                tensor[[0, ch, y, x]] = src[[y, x, ch]] as f32 / 255.0;
            }
        }
    }
    tensor
}

// ---------------------------------------------------------------------------
// Post-processing
// ---------------------------------------------------------------------------

/// Stable softmax: shifts by the max logit before exponentiating so large
/// magnitudes don't overflow.
fn softmax_in_place(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0f32;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;
    use approx::assert_relative_eq;

    #[test]
    fn test_patch_to_tensor_shape_gray() {
        let frame = Frame::new(vec![0u8; 8 * 6], 8, 6, PixelFormat::Gray8, 0);
        let patch = frame.patch(0, 0, 4, 6);
        let tensor = patch_to_tensor(&patch);
        assert_eq!(tensor.shape(), &[1, 1, 6, 4]);
    }

    #[test]
    fn test_patch_to_tensor_normalizes_bytes() {
        let frame = Frame::new(vec![255u8; 4], 2, 2, PixelFormat::Gray8, 0);
        let tensor = patch_to_tensor(&frame.patch(0, 0, 2, 2));
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0f32);
        assert_relative_eq!(tensor[[0, 0, 1, 1]], 1.0f32);
    }

    #[test]
    fn test_patch_to_tensor_splits_channels() {
        // One RGB pixel: pure red
        let frame = Frame::new(vec![255, 0, 0], 1, 1, PixelFormat::Rgb8, 0);
        let tensor = patch_to_tensor(&frame.patch(0, 0, 1, 1));
        assert_eq!(tensor.shape(), &[1, 3, 1, 1]);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0f32);
        assert_relative_eq!(tensor[[0, 1, 0, 0]], 0.0f32);
        assert_relative_eq!(tensor[[0, 2, 0, 0]], 0.0f32);
    }

    #[test]
    fn test_patch_to_tensor_reads_window_origin() {
        // 4x1 gray row 10, 20, 30, 40; window over the last two pixels
        let frame = Frame::new(vec![10, 20, 30, 40], 4, 1, PixelFormat::Gray8, 0);
        let tensor = patch_to_tensor(&frame.patch(2, 0, 2, 1));
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 30.0f32 / 255.0);
        assert_relative_eq!(tensor[[0, 0, 0, 1]], 40.0f32 / 255.0);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let mut values = vec![1.0f32, 2.0, 3.0];
        softmax_in_place(&mut values);
        let sum: f32 = values.iter().sum();
        assert_relative_eq!(sum, 1.0f32, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_preserves_ordering() {
        let mut values = vec![0.5f32, 2.5, 1.0];
        softmax_in_place(&mut values);
        assert!(values[1] > values[2]);
        assert!(values[2] > values[0]);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let mut values = vec![1000.0f32, 1001.0];
        softmax_in_place(&mut values);
        assert!(values.iter().all(|v| v.is_finite()));
        let sum: f32 = values.iter().sum();
        assert_relative_eq!(sum, 1.0f32, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_uniform_input_gives_uniform_output() {
        let mut values = vec![0.7f32; 4];
        softmax_in_place(&mut values);
        for v in &values {
            assert_relative_eq!(*v, 0.25f32, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_softmax_empty_is_noop() {
        let mut values: Vec<f32> = Vec::new();
        softmax_in_place(&mut values);
        assert!(values.is_empty());
    }
}
