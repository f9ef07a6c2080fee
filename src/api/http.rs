//! reqwest-backed task service client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiResult};
use super::types::{AccessGranted, AccessRequest, InstallLink, Task, TokenResponse, VerifyKeyRequest};
use super::{TaskService, LOGIN_PLACEHOLDER_PASSWORD};
use crate::config::Config;

/// HTTP client for the task service.
#[derive(Debug, Clone)]
pub struct HttpTaskService {
    client: Client,
    config: Config,
}

impl HttpTaskService {
    /// Create a client using the configured base URL and request timeout.
    pub fn new(config: Config) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Send a request and read the full body, mapping failures to [`ApiError`].
    async fn execute(&self, request: RequestBuilder, operation: &str) -> ApiResult<String> {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("{} failed before a response arrived: {}", operation, e);
                if e.is_timeout() {
                    return Err(ApiError::Timeout(format!("{}: {}", operation, e)));
                } else if e.is_connect() {
                    return Err(ApiError::Network(format!("Connection failed: {}", e)));
                } else {
                    return Err(ApiError::Network(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(format!("{}: {}", operation, e))
            } else {
                ApiError::Network(format!("Failed to read response body: {}", e))
            }
        })?;

        if !status.is_success() {
            let err = ApiError::rejected(status.as_u16(), &body);
            tracing::warn!("{} rejected: {}", operation, err);
            return Err(err);
        }

        tracing::debug!("{} succeeded with HTTP {}", operation, status.as_u16());
        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> ApiResult<T> {
        let body = self.execute(request, operation).await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::Decode(format!("{} response: {}, body: {}", operation, e, truncate(&body, 200)))
        })
    }
}

#[async_trait]
impl TaskService for HttpTaskService {
    async fn request_access(&self, profile: &AccessRequest) -> ApiResult<AccessGranted> {
        let request = self
            .client
            .post(self.config.endpoint("/request-access"))
            .json(profile);
        let body = self.execute(request, "request-access").await?;
        // The confirmation body is informational only.
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn verify_key(&self, key: &str) -> ApiResult<InstallLink> {
        let request = self
            .client
            .post(self.config.endpoint("/verify-key"))
            .json(&VerifyKeyRequest {
                key: key.to_string(),
            });
        self.execute_json(request, "verify-key").await
    }

    async fn login_with_workspace(&self, workspace_id: &str) -> ApiResult<TokenResponse> {
        let form = [
            ("username", workspace_id),
            ("password", LOGIN_PLACEHOLDER_PASSWORD),
        ];
        let request = self
            .client
            .post(self.config.endpoint("/auth/login"))
            .form(&form);
        self.execute_json(request, "login").await
    }

    async fn fetch_tasks(
        &self,
        credential: &str,
        params: &[(&'static str, String)],
    ) -> ApiResult<Vec<Task>> {
        let request = self
            .client
            .get(self.config.endpoint("/tasks"))
            .query(params)
            .bearer_auth(credential);
        self.execute_json(request, "fetch-tasks").await
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
