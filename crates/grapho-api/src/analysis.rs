//! Sample intake: boundary validation and the analysis upload.

use std::sync::Arc;

use grapho_core::ScoreMap;

use crate::envelope::{decode_score_envelope, ScoreEnvelopeError};
use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::transport::FilePart;

/// Largest accepted sample image.
pub const MAX_SAMPLE_BYTES: u64 = 5 * 1024 * 1024;

/// Accepted sample image extensions.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Validate a sample before any network traffic.
///
/// Rejections are user-facing validation errors; nothing is transmitted.
pub fn validate_sample(file_name: &str, len: u64) -> Result<(), ApiError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let allowed = extension
        .as_deref()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));
    if !allowed {
        return Err(ApiError::Validation(
            "Please upload a PNG, JPEG, or JPG file".to_string(),
        ));
    }

    if len > MAX_SAMPLE_BYTES {
        return Err(ApiError::Validation(
            "File size must be less than 5MB".to_string(),
        ));
    }

    Ok(())
}

pub struct AnalysisApi {
    gateway: Arc<Gateway>,
}

impl AnalysisApi {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Upload a handwriting sample and return its per-category scores.
    ///
    /// Takes `&mut self`: a second upload cannot start while one is in
    /// flight. The upload runs under the long analysis deadline and is
    /// abandoned (reported as a timeout) when it elapses.
    pub async fn analyze_sample(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ScoreMap, ApiError> {
        validate_sample(file_name, bytes.len() as u64)?;

        let file = FilePart {
            field: "file",
            file_name: file_name.to_string(),
            bytes,
        };
        let response = self.gateway.upload("/upload", file).await?;

        decode_score_envelope(&response.body).map_err(|err| match err {
            ScoreEnvelopeError::Rejected(message) => ApiError::Http {
                status: response.status,
                message,
            },
            other => ApiError::decode("analysis/upload", other.to_string()),
        })
    }
}
