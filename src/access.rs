//! Early-access and unlock-key workflows.
//!
//! Neither flow touches the dashboard session. Each produces a status line for
//! the user; failures are reported through that line and never propagated.

use crate::api::{AccessRequest, TaskService};

pub const ACCESS_SENT_MESSAGE: &str = "Access key sent! Check your inbox.";
pub const ACCESS_FALLBACK_MESSAGE: &str = "Failed to request access";
pub const KEY_VERIFIED_MESSAGE: &str = "Key verified! Install the Slack app below.";
pub const KEY_FALLBACK_MESSAGE: &str = "Invalid or used key";

/// Outcome of a request-access submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessOutcome {
    pub succeeded: bool,
    pub status: String,
}

/// Submit an early-access request.
pub async fn request_access(api: &dyn TaskService, profile: &AccessRequest) -> AccessOutcome {
    match api.request_access(profile).await {
        Ok(granted) => {
            tracing::info!(
                "Access requested for {} ({})",
                profile.company,
                if granted.message.is_empty() {
                    "no confirmation message"
                } else {
                    granted.message.as_str()
                }
            );
            AccessOutcome {
                succeeded: true,
                status: ACCESS_SENT_MESSAGE.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!("Access request failed: {}", e);
            AccessOutcome {
                succeeded: false,
                status: e.user_message(ACCESS_FALLBACK_MESSAGE),
            }
        }
    }
}

/// State of the unlock page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unlock {
    install_url: Option<String>,
    status: Option<String>,
}

impl Unlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installation URL from the last successful verification.
    pub fn install_url(&self) -> Option<&str> {
        self.install_url.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Verify an unlock key. A failure updates only the status line.
    pub async fn verify(&mut self, api: &dyn TaskService, key: &str) -> bool {
        match api.verify_key(key).await {
            Ok(link) => {
                tracing::info!("Unlock key accepted");
                self.install_url = Some(link.slack_install_url);
                self.status = Some(KEY_VERIFIED_MESSAGE.to_string());
                true
            }
            Err(e) => {
                tracing::warn!("Unlock key rejected: {}", e);
                self.status = Some(e.user_message(KEY_FALLBACK_MESSAGE));
                false
            }
        }
    }
}
