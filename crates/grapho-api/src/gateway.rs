//! Authenticated request gateway.
//!
//! Owns the 401 policy: requests against the primary session API get one
//! transparent token-refresh-and-retry; every other 401, and a failed
//! refresh, invalidates the session through its single entry point. The
//! refresh call itself is never retried.

use std::sync::Arc;

use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{error_message, ApiError, AuthError};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, FilePart, Method, Transport, TransportError};

/// Per-call authentication behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CallOptions {
    /// Attempt one transparent token refresh on a 401.
    pub(crate) refresh_on_unauthorized: bool,
}

impl CallOptions {
    pub(crate) const PLAIN: CallOptions = CallOptions {
        refresh_on_unauthorized: false,
    };
    pub(crate) const REFRESHABLE: CallOptions = CallOptions {
        refresh_on_unauthorized: true,
    };
}

/// Shared entry point for all remote calls.
pub struct Gateway {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    config: ApiConfig,
}

impl Gateway {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        config: ApiConfig,
    ) -> Self {
        Self {
            transport,
            session,
            config,
        }
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub(crate) async fn get(
        &self,
        path: &str,
        options: CallOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::Get, path, None, options).await
    }

    pub(crate) async fn post(
        &self,
        path: &str,
        body: Option<Value>,
        options: CallOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::Post, path, body, options).await
    }

    pub(crate) async fn put(
        &self,
        path: &str,
        body: Option<Value>,
        options: CallOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::Put, path, body, options).await
    }

    pub(crate) async fn delete(
        &self,
        path: &str,
        options: CallOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::Delete, path, None, options).await
    }

    /// Authenticated JSON request with the configured 401 policy.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: CallOptions,
    ) -> Result<ApiResponse, ApiError> {
        let token = self
            .session
            .token()
            .ok_or(ApiError::Auth(AuthError::NotAuthenticated))?;
        let url = join_url(&self.config.api_base_url, path);

        let first = self.execute(method, &url, body.clone(), &token).await?;
        if !first.is_unauthorized() {
            return classify(first);
        }

        if options.refresh_on_unauthorized {
            match self.refresh_token(&token).await {
                Ok(fresh) => {
                    let retried = self.execute(method, &url, body, &fresh).await?;
                    if retried.is_unauthorized() {
                        return Err(self.expire());
                    }
                    return classify(retried);
                }
                Err(err) => {
                    tracing::warn!(%err, "token refresh failed");
                    return Err(self.expire());
                }
            }
        }

        Err(self.expire())
    }

    /// Unauthenticated multipart upload against the analysis service.
    pub(crate) async fn upload(
        &self,
        path: &str,
        file: FilePart,
    ) -> Result<ApiResponse, ApiError> {
        let url = join_url(&self.config.analysis_base_url, path);
        let request = ApiRequest::new(Method::Post, url)
            .with_file(file)
            .with_timeout(self.config.upload_timeout());
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(from_transport)?;
        classify(response)
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        token: &str,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = ApiRequest::new(method, url)
            .with_bearer(token)
            .with_timeout(self.config.request_timeout());
        if let Some(body) = body {
            request = request.with_json(body);
        }
        self.transport
            .execute(request)
            .await
            .map_err(from_transport)
    }

    /// Exchange the current token for a fresh one. Not retried.
    async fn refresh_token(&self, current: &str) -> Result<String, ApiError> {
        let url = join_url(&self.config.api_base_url, "/api/refresh-token");
        let response = self
            .execute(Method::Post, &url, None, current)
            .await?;
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: error_message(response.status, &response.body),
            });
        }
        let token = response
            .body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::decode("refresh-token", "no token in response"))?
            .to_string();
        self.session.update_token(token.clone());
        tracing::debug!("session token refreshed");
        Ok(token)
    }

    /// Invalidate the session; expired exactly once, then not-authenticated.
    fn expire(&self) -> ApiError {
        if self.session.invalidate() {
            ApiError::Auth(AuthError::SessionExpired)
        } else {
            ApiError::Auth(AuthError::NotAuthenticated)
        }
    }
}

fn classify(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Http {
            status: response.status,
            message: error_message(response.status, &response.body),
        })
    }
}

fn from_transport(error: TransportError) -> ApiError {
    match error {
        TransportError::Timeout => ApiError::Timeout,
        TransportError::Network(message) => ApiError::Network(message),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Credentials, MemorySessionStore, UserKind};
    use crate::transport::MockTransport;

    #[tokio::test]
    async fn gateway_injects_bearer_and_deadline() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|request| {
                request.bearer.as_deref() == Some("tok") && request.timeout.is_some()
            })
            .returning(|_| Ok(ApiResponse::new(200, serde_json::json!([]))));

        let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_credentials(
            Credentials::new("tok", UserKind::EndUser),
        ));
        let gateway = Gateway::new(Arc::new(transport), session, ApiConfig::new());

        let response = gateway.get("/api/clients", CallOptions::PLAIN).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn requests_without_a_session_never_reach_the_transport() {
        let transport = MockTransport::new();
        let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let gateway = Gateway::new(Arc::new(transport), session, ApiConfig::new());

        let err = gateway
            .get("/api/clients", CallOptions::PLAIN)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::NotAuthenticated)));
    }

    #[test]
    fn join_url_tolerates_trailing_slash() {
        assert_eq!(
            join_url("http://api.example.com/", "/api/clients"),
            "http://api.example.com/api/clients"
        );
        assert_eq!(
            join_url("http://api.example.com", "/api/clients"),
            "http://api.example.com/api/clients"
        );
    }
}
