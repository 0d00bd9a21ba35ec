use crate::shared::frame::Patch;

/// Domain interface for single-window classification.
///
/// Given one window-sized patch, returns one probability per known class
/// label in the label set's fixed order. Implementations may hold inference
/// sessions or connections, hence `&mut self`.
pub trait PatchClassifier: Send {
    fn classify(&mut self, patch: &Patch<'_>) -> Result<Vec<f32>, Box<dyn std::error::Error>>;
}
