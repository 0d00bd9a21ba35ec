use std::time::Duration;

use serde::Deserialize;

use crate::detection::domain::patch_classifier::PatchClassifier;
use crate::shared::frame::Patch;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct ClassifyResponse {
    probabilities: Vec<f32>,
}

/// Patch classifier that delegates to a remote inference endpoint.
///
/// POSTs the raw patch bytes with the window geometry as query parameters
/// and expects a JSON `{"probabilities": [...]}` reply in label-set order.
/// Transport and service failures surface per window; the scanner skips
/// the window and carries on.
pub struct HttpPatchClassifier {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpPatchClassifier {
    pub fn new(endpoint: String) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: String,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

impl PatchClassifier for HttpPatchClassifier {
    fn classify(&mut self, patch: &Patch<'_>) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("width", patch.width().to_string()),
                ("height", patch.height().to_string()),
                ("format", patch.format().to_string()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(patch.to_vec())
            .send()?
            .error_for_status()?;

        let parsed: ClassifyResponse = response.json()?;
        Ok(parsed.probabilities)
    }
}
