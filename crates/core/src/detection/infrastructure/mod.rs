pub mod http_patch_classifier;
pub mod onnx_patch_classifier;
