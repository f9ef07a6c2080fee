//! In-memory task service for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{
    AccessGranted, AccessRequest, ApiError, ApiResult, InstallLink, Task, TaskService,
    TokenResponse,
};

/// A scripted `fetch_tasks` reply.
pub struct FetchReply {
    pub delay: Duration,
    pub result: ApiResult<Vec<Task>>,
}

/// Scripted responses are consumed in order; once a queue is empty the
/// service answers with a default (an empty task list, or a rejection
/// without detail for the other calls).
#[derive(Default)]
pub struct MockTaskService {
    logins: Mutex<VecDeque<ApiResult<TokenResponse>>>,
    verifications: Mutex<VecDeque<ApiResult<InstallLink>>>,
    access: Mutex<VecDeque<ApiResult<AccessGranted>>>,
    fetches: Mutex<VecDeque<FetchReply>>,
    login_calls: Mutex<Vec<String>>,
    verify_calls: Mutex<Vec<String>>,
    access_calls: Mutex<Vec<AccessRequest>>,
    fetch_calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockTaskService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login(&self, result: ApiResult<TokenResponse>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn push_token(&self, token: &str) {
        self.push_login(Ok(TokenResponse {
            access_token: token.to_string(),
            token_type: "bearer".to_string(),
        }));
    }

    pub fn push_verify(&self, result: ApiResult<InstallLink>) {
        self.verifications.lock().unwrap().push_back(result);
    }

    pub fn push_access(&self, result: ApiResult<AccessGranted>) {
        self.access.lock().unwrap().push_back(result);
    }

    pub fn push_fetch(&self, result: ApiResult<Vec<Task>>) {
        self.push_fetch_delayed(Duration::ZERO, result);
    }

    pub fn push_fetch_delayed(&self, delay: Duration, result: ApiResult<Vec<Task>>) {
        self.fetches
            .lock()
            .unwrap()
            .push_back(FetchReply { delay, result });
    }

    pub fn login_calls(&self) -> Vec<String> {
        self.login_calls.lock().unwrap().clone()
    }

    pub fn verify_calls(&self) -> Vec<String> {
        self.verify_calls.lock().unwrap().clone()
    }

    pub fn access_calls(&self) -> Vec<AccessRequest> {
        self.access_calls.lock().unwrap().clone()
    }

    /// `(credential, params)` for every fetch, in call order.
    pub fn fetch_calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

fn no_detail() -> ApiError {
    ApiError::Rejected {
        status: 400,
        detail: None,
    }
}

#[async_trait]
impl TaskService for MockTaskService {
    async fn request_access(&self, profile: &AccessRequest) -> ApiResult<AccessGranted> {
        self.access_calls.lock().unwrap().push(profile.clone());
        let next = self.access.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(no_detail()))
    }

    async fn verify_key(&self, key: &str) -> ApiResult<InstallLink> {
        self.verify_calls.lock().unwrap().push(key.to_string());
        let next = self.verifications.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(no_detail()))
    }

    async fn login_with_workspace(&self, workspace_id: &str) -> ApiResult<TokenResponse> {
        self.login_calls.lock().unwrap().push(workspace_id.to_string());
        let next = self.logins.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(no_detail()))
    }

    async fn fetch_tasks(
        &self,
        credential: &str,
        params: &[(&'static str, String)],
    ) -> ApiResult<Vec<Task>> {
        let owned: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.fetch_calls
            .lock()
            .unwrap()
            .push((credential.to_string(), owned));
        let next = self.fetches.lock().unwrap().pop_front();
        match next {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.result
            }
            None => Ok(Vec::new()),
        }
    }
}

/// A minimal task with the given id and title.
pub fn task(id: i64, title: &str) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        priority: None,
        assignee_user_id: None,
        due_date: None,
        status: Default::default(),
        tags: String::new(),
        creator_user_id: None,
        workspace_id: None,
        created_at: None,
        updated_at: None,
    }
}
