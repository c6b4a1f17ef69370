//! API configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Endpoints and deadlines for the remote collaborators.
///
/// The main backend (session, admin, clients) and the analysis service
/// (sample upload) are separate deployments with separate base URLs. The
/// upload deadline is much longer than the default because image analysis
/// is slow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the session/admin/client backend.
    pub api_base_url: String,
    /// Base URL of the handwriting-analysis service.
    pub analysis_base_url: String,
    /// Deadline for ordinary JSON requests, in seconds.
    pub request_timeout_secs: u64,
    /// Deadline for the multipart sample upload, in seconds.
    pub upload_timeout_secs: u64,
}

impl ApiConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_analysis_base_url(mut self, url: impl Into<String>) -> Self {
        self.analysis_base_url = url.into();
        self
    }

    /// Parse a TOML configuration document.
    pub fn from_toml_str(document: &str) -> Result<Self, ApiError> {
        toml::from_str(document).map_err(|e| ApiError::Config(e.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[inline]
    #[must_use]
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://handwritingbackendnode.onrender.com".to_string(),
            analysis_base_url: "https://handwriting-backend-239409431927.asia-south1.run.app"
                .to_string(),
            request_timeout_secs: 30,
            upload_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ApiConfig::new();
        assert_eq!(config.upload_timeout(), Duration::from_secs(120));
        assert!(config.api_base_url.starts_with("https://"));
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = ApiConfig::from_toml_str(
            r#"
            api_base_url = "http://localhost:5000"
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout_secs, 5);
        // Unset keys keep their defaults.
        assert_eq!(config.upload_timeout_secs, 120);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ApiConfig::from_toml_str("api_base_url = [").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
