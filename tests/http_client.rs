//! End-to-end tests of the HTTP client against a fake task service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use tako_dashboard::access::{self, Unlock};
use tako_dashboard::api::{AccessRequest, ApiError, Priority, TaskStatus};
use tako_dashboard::{Config, Dashboard, FilterField, HttpTaskService, TaskService};

#[derive(Default)]
struct Recorded {
    login_forms: Vec<HashMap<String, String>>,
    task_queries: Vec<HashMap<String, String>>,
    auth_headers: Vec<String>,
    access_bodies: Vec<Value>,
    verify_bodies: Vec<Value>,
}

type Shared = Arc<Mutex<Recorded>>;

async fn login(
    State(rec): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let username = form.get("username").cloned().unwrap_or_default();
    rec.lock().unwrap().login_forms.push(form);
    if username == "T012345" {
        (
            StatusCode::OK,
            Json(json!({"access_token": "abc", "token_type": "bearer"})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Workspace not installed"})),
        )
    }
}

async fn tasks(
    State(rec): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let status_filter = query.get("status").cloned();
    {
        let mut rec = rec.lock().unwrap();
        rec.auth_headers.push(auth.clone());
        rec.task_queries.push(query);
    }
    if auth != "Bearer abc" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        );
    }

    let all = vec![
        json!({
            "id": 1, "title": "Write docs", "description": "API guide",
            "assignee_user_id": "U1", "priority": "High", "status": "pending",
            "due_date": "2025-04-01T00:00:00", "tags": "docs",
            "creator_user_id": "U9", "workspace_id": 1,
            "created_at": "2025-03-01T08:00:00", "updated_at": "2025-03-02T08:00:00"
        }),
        json!({
            "id": 2, "title": "Fix login", "description": "",
            "assignee_user_id": "U2", "priority": "normal", "status": "done",
            "due_date": null, "tags": ""
        }),
    ];
    let selected: Vec<Value> = all
        .into_iter()
        .filter(|t| match &status_filter {
            Some(s) => t["status"] == json!(s),
            None => true,
        })
        .collect();
    (StatusCode::OK, Json(Value::Array(selected)))
}

async fn verify_key(
    State(rec): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = body["key"].as_str().unwrap_or("").to_string();
    rec.lock().unwrap().verify_bodies.push(body);
    match key.as_str() {
        "GOOD-KEY-1" => (
            StatusCode::OK,
            Json(json!({"slack_install_url": "https://slack.com/oauth/v2/authorize?client_id=1&state=GOOD-KEY-1"})),
        ),
        "USED-KEY" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Invalid or used key"})),
        ),
        _ => (StatusCode::BAD_REQUEST, Json(json!({}))),
    }
}

async fn request_access(
    State(rec): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let valid_email = body["email"].as_str().map_or(false, |e| e.contains('@'));
    rec.lock().unwrap().access_bodies.push(body);
    if valid_email {
        (
            StatusCode::OK,
            Json(json!({"message": "Access key issued", "id": 12})),
        )
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}]})),
        )
    }
}

async fn spawn_service() -> (Shared, Config) {
    let rec: Shared = Arc::new(Mutex::new(Recorded::default()));
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/tasks", get(tasks))
        .route("/verify-key", post(verify_key))
        .route("/request-access", post(request_access))
        .with_state(rec.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = Config::default()
        .with_api_url(&format!("http://{}/", addr))
        .unwrap();
    (rec, config)
}

#[tokio::test]
async fn test_login_sends_form_with_placeholder_password() {
    let (rec, config) = spawn_service().await;
    let service = HttpTaskService::new(config).unwrap();

    let token = service.login_with_workspace("T012345").await.unwrap();
    assert_eq!(token.access_token, "abc");

    let forms = rec.lock().unwrap().login_forms.clone();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].get("username").map(String::as_str), Some("T012345"));
    assert_eq!(forms[0].get("password").map(String::as_str), Some("placeholder"));
}

#[tokio::test]
async fn test_login_failure_carries_detail() {
    let (_rec, config) = spawn_service().await;
    let service = HttpTaskService::new(config).unwrap();

    let err = service.login_with_workspace("T999").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 401,
            detail: Some("Workspace not installed".to_string())
        }
    );
}

#[tokio::test]
async fn test_fetch_tasks_sends_bearer_and_only_given_params() {
    let (rec, config) = spawn_service().await;
    let service = HttpTaskService::new(config).unwrap();

    let tasks = service
        .fetch_tasks("abc", &[("status", "done".to_string())])
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Fix login");
    assert_eq!(tasks[0].status, TaskStatus::Done);
    assert_eq!(tasks[0].priority, Some(Priority::from("normal")));

    let all = service.fetch_tasks("abc", &[]).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].priority, Some(Priority::from("High")));

    let rec = rec.lock().unwrap();
    assert_eq!(rec.auth_headers, vec!["Bearer abc", "Bearer abc"]);
    assert_eq!(rec.task_queries[0].len(), 1);
    assert_eq!(rec.task_queries[0].get("status").map(String::as_str), Some("done"));
    assert!(rec.task_queries[1].is_empty());
}

#[tokio::test]
async fn test_fetch_tasks_with_bad_token_is_rejected() {
    let (_rec, config) = spawn_service().await;
    let service = HttpTaskService::new(config).unwrap();

    let err = service.fetch_tasks("wrong", &[]).await.unwrap_err();
    assert_eq!(err.detail(), Some("Not authenticated"));
}

#[tokio::test]
async fn test_unlock_flow_over_http() {
    let (rec, config) = spawn_service().await;
    let service = HttpTaskService::new(config).unwrap();

    let mut unlock = Unlock::new();
    assert!(!unlock.verify(&service, "BAD-KEY").await);
    assert_eq!(unlock.status(), Some("Invalid or used key"));

    assert!(!unlock.verify(&service, "USED-KEY").await);
    assert_eq!(unlock.status(), Some("Invalid or used key"));

    assert!(unlock.verify(&service, "GOOD-KEY-1").await);
    assert_eq!(
        unlock.install_url(),
        Some("https://slack.com/oauth/v2/authorize?client_id=1&state=GOOD-KEY-1")
    );

    let bodies = rec.lock().unwrap().verify_bodies.clone();
    assert_eq!(bodies[0], json!({"key": "BAD-KEY"}));
}

#[tokio::test]
async fn test_request_access_over_http() {
    let (rec, config) = spawn_service().await;
    let service = HttpTaskService::new(config).unwrap();

    let mut profile = AccessRequest {
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        company: "Navy".to_string(),
        team_size: "1-10".to_string(),
    };
    let outcome = access::request_access(&service, &profile).await;
    assert!(outcome.succeeded);
    assert_eq!(outcome.status, "Access key sent! Check your inbox.");

    profile.email = "not-an-email".to_string();
    let outcome = access::request_access(&service, &profile).await;
    assert!(!outcome.succeeded);
    assert_eq!(outcome.status, "value is not a valid email address");

    let bodies = rec.lock().unwrap().access_bodies.clone();
    assert_eq!(
        bodies[0],
        json!({"name": "Grace", "email": "grace@example.com", "company": "Navy", "team_size": "1-10"})
    );
}

#[tokio::test]
async fn test_dashboard_end_to_end() {
    let (rec, config) = spawn_service().await;
    let service: Arc<dyn TaskService> = Arc::new(HttpTaskService::new(config.clone()).unwrap());
    let mut dashboard = Dashboard::new(service, &config);

    assert!(!dashboard.login("T000").await);
    assert_eq!(dashboard.session().error(), Some("Workspace not installed"));

    assert!(dashboard.login("T012345").await);
    assert_eq!(dashboard.session().error(), None);
    let view = dashboard.settled_view().await;
    assert_eq!(view.tasks.len(), 2);

    dashboard.set_filter(FilterField::Status, "pending");
    let view = dashboard.settled_view().await;
    assert_eq!(view.tasks.len(), 1);
    assert_eq!(view.tasks[0].title, "Write docs");
    assert_eq!(view.error, None);

    let queries = rec.lock().unwrap().task_queries.clone();
    let last = queries.last().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last.get("status").map(String::as_str), Some("pending"));
}
