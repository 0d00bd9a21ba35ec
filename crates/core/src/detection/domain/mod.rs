pub mod patch_classifier;
pub mod window_grid;
pub mod window_scanner;
