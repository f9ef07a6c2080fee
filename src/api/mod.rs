//! Task service API client.
//!
//! A trait-based abstraction over the four service calls the dashboard makes,
//! with [`HttpTaskService`] as the reqwest implementation. Every call is a
//! single request/response with no internal retry.

mod error;
mod http;
mod types;

pub use error::{extract_detail, ApiError, ApiResult};
pub use http::HttpTaskService;
pub use types::{
    AccessGranted, AccessRequest, InstallLink, Priority, Task, TaskStatus, TokenResponse,
    VerifyKeyRequest,
};

use async_trait::async_trait;

/// Form password sent with every workspace login; the service authenticates
/// on the workspace id alone.
pub const LOGIN_PLACEHOLDER_PASSWORD: &str = "placeholder";

/// Trait for task service clients.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// `POST /request-access`
    async fn request_access(&self, profile: &AccessRequest) -> ApiResult<AccessGranted>;

    /// `POST /verify-key`, returning the installation URL.
    async fn verify_key(&self, key: &str) -> ApiResult<InstallLink>;

    /// `POST /auth/login`, exchanging a workspace id for a bearer token.
    async fn login_with_workspace(&self, workspace_id: &str) -> ApiResult<TokenResponse>;

    /// `GET /tasks` with the given query parameters.
    async fn fetch_tasks(
        &self,
        credential: &str,
        params: &[(&'static str, String)],
    ) -> ApiResult<Vec<Task>>;
}
