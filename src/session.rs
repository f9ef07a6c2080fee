//! Workspace session state.
//!
//! Holds the workspace id the user typed, the bearer credential obtained from
//! the login exchange, and the last login error. The credential is published
//! on a watch channel so the task loader can react to sign-in.

use tokio::sync::watch;

use crate::api::TaskService;

/// Shown when a failed login carries no `detail`.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

#[derive(Debug)]
pub struct Session {
    workspace_id: String,
    credential: watch::Sender<Option<String>>,
    error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh, unauthenticated session.
    pub fn new() -> Self {
        let (credential, _rx) = watch::channel(None);
        Self {
            workspace_id: String::new(),
            credential,
            error: None,
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn credential(&self) -> Option<String> {
        self.credential.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.borrow().is_some()
    }

    /// Last login error, cleared by a successful login.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.credential.subscribe()
    }

    /// Exchange `workspace_id` for a credential.
    ///
    /// On failure the error message is recorded and the credential is left as
    /// it was. A blank token counts as a failure. Returns whether the login
    /// succeeded.
    pub async fn login(&mut self, api: &dyn TaskService, workspace_id: &str) -> bool {
        self.workspace_id = workspace_id.to_string();

        match api.login_with_workspace(workspace_id).await {
            Ok(token) if token.access_token.trim().is_empty() => {
                tracing::warn!("Login for workspace '{}' returned an empty token", workspace_id);
                self.error = Some(LOGIN_FALLBACK_MESSAGE.to_string());
                false
            }
            Ok(token) => {
                let token = token.access_token;
                self.credential.send_if_modified(|current| {
                    if current.as_deref() == Some(token.as_str()) {
                        return false;
                    }
                    *current = Some(token);
                    true
                });
                self.error = None;
                tracing::info!("Signed in to workspace {}", workspace_id);
                true
            }
            Err(e) => {
                tracing::warn!("Login for workspace '{}' failed: {}", workspace_id, e);
                self.error = Some(e.user_message(LOGIN_FALLBACK_MESSAGE));
                false
            }
        }
    }
}
