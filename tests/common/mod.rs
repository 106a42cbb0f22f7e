// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: an in-process fake task service and a fake host.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taskbot_miniapp::host::{HapticFeedback, HostPlatform, ImpactStyle, NotificationKind};
use taskbot_miniapp::models::{Credentials, HostUser, UserId};
use taskbot_miniapp::services::ApiClient;

/// XP the fake service awards per completion.
#[allow(dead_code)]
pub const COMPLETE_XP: i64 = 20;

/// XP the fake service takes for deleting an unfinished task.
#[allow(dead_code)]
pub const DELETE_PENALTY: i64 = 10;

/// One request as seen by the fake service.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub init_data: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Default)]
struct FakeState {
    tasks: Vec<Value>,
    profile: Value,
    requests: Vec<RecordedRequest>,
    next_id: u64,
    fail_tasks: bool,
    fail_profile: bool,
    fail_parse: bool,
}

type Shared = Arc<Mutex<FakeState>>;

/// Fake task service listening on an ephemeral loopback port.
pub struct FakeTaskService {
    pub base_url: String,
    state: Shared,
}

#[allow(dead_code)]
impl FakeTaskService {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            profile: json!({
                "level": 1, "totalXP": 0, "xpProgress": 0, "xpForNextLevel": 100,
                "streak": 0, "tasksCompleted": 0, "achievements": [],
                "totalAchievements": 12, "activityLog": {}
            }),
            ..FakeState::default()
        }));

        let app = Router::new()
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/tasks/{id}/complete", put(complete_task))
            .route("/tasks/{id}", delete(delete_task))
            .route("/profile", get(get_profile))
            .route("/ai/parse-task", post(parse_task))
            .route("/admin/stats", get(admin_stats))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }

    pub fn seed_task(&self, id: &str, text: &str, remind_at: Value, status: &str) {
        self.state.lock().unwrap().tasks.push(json!({
            "id": id, "text": text, "priority": "medium", "status": status,
            "remindAt": remind_at, "tags": []
        }));
    }

    pub fn set_profile(&self, profile: Value) {
        self.state.lock().unwrap().profile = profile;
    }

    pub fn fail_tasks(&self, fail: bool) {
        self.state.lock().unwrap().fail_tasks = fail;
    }

    pub fn fail_profile(&self, fail: bool) {
        self.state.lock().unwrap().fail_profile = fail;
    }

    pub fn fail_parse(&self, fail: bool) {
        self.state.lock().unwrap().fail_parse = fail;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// `"METHOD /path"` for each recorded request, in order.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let init_data = request
        .headers()
        .get("x-telegram-init-data")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let user_id = request.uri().query().and_then(|query| {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("userId="))
            .map(str::to_string)
    });

    state.lock().unwrap().requests.push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        init_data,
        user_id,
    });

    next.run(request).await
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

async fn list_tasks(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if state.fail_tasks {
        return server_error();
    }
    Json(json!({ "tasks": state.tasks })).into_response()
}

async fn create_task(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.next_id += 1;
    let id = format!("task-{}", state.next_id);
    state.tasks.push(json!({
        "id": id,
        "text": body["text"],
        "priority": body["priority"],
        "status": "pending",
        "remindAt": body["remindAt"].to_string(),
        "tags": body["tags"],
    }));
    (
        StatusCode::CREATED,
        Json(json!({ "taskId": id, "message": "Task created" })),
    )
        .into_response()
}

fn bump(profile: &mut Value, key: &str, delta: i64) {
    let current = profile[key].as_i64().unwrap_or(0);
    profile[key] = json!(current + delta);
}

async fn complete_task(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let Some(task) = state.tasks.iter_mut().find(|t| t["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, "Task not found").into_response();
    };
    task["status"] = json!("done");

    bump(&mut state.profile, "totalXP", COMPLETE_XP);
    bump(&mut state.profile, "tasksCompleted", 1);
    bump(&mut state.profile, "streak", 1);
    let total_xp = state.profile["totalXP"].as_i64().unwrap_or(0);
    let streak = state.profile["streak"].as_i64().unwrap_or(0);

    // Counters read back from the document store are encoded as strings
    Json(json!({
        "message": "Task completed",
        "gamification": {
            "xp_earned": COMPLETE_XP, "streak_bonus": "0", "achievement_xp": 0,
            "total_xp": total_xp, "level_up": false, "new_level": 1,
            "streak": streak.to_string(), "unlocked_achievements": []
        }
    }))
    .into_response()
}

async fn delete_task(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let Some(index) = state.tasks.iter().position(|t| t["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, "Task not found").into_response();
    };
    let task = state.tasks.remove(index);

    let penalty = if task["status"] == "done" {
        Value::Null
    } else {
        bump(&mut state.profile, "totalXP", -DELETE_PENALTY);
        json!({ "xp_lost": DELETE_PENALTY, "total_xp": state.profile["totalXP"] })
    };
    Json(json!({ "message": "Task deleted", "penalty": penalty })).into_response()
}

async fn get_profile(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if state.fail_profile {
        return server_error();
    }
    Json(state.profile.clone()).into_response()
}

async fn parse_task(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if state.lock().unwrap().fail_parse {
        return server_error();
    }
    let text = body["data"]["text"].as_str().unwrap_or_default();
    Json(json!({
        "text": text.trim_end_matches(" tomorrow at 6pm"),
        "priority": "high",
        "due_date": "2024-02-10T18:00:00"
    }))
    .into_response()
}

async fn admin_stats() -> Response {
    Json(json!({ "totalUsers": 3, "totalXP": 540, "totalTasks": 27 })).into_response()
}

/// Haptic calls in the order they happened.
#[derive(Default)]
pub struct RecordingHaptics {
    events: Mutex<Vec<String>>,
}

impl HapticFeedback for RecordingHaptics {
    fn impact_occurred(&self, style: ImpactStyle) {
        self.events.lock().unwrap().push(format!("impact:{:?}", style));
    }

    fn notification_occurred(&self, kind: NotificationKind) {
        self.events.lock().unwrap().push(format!("notify:{:?}", kind));
    }
}

/// Host with a scripted user that counts lifecycle calls.
#[derive(Default)]
pub struct FakeHost {
    pub user: Option<HostUser>,
    pub init_data: String,
    pub ready_calls: AtomicUsize,
    pub expand_calls: AtomicUsize,
    pub haptics: RecordingHaptics,
}

#[allow(dead_code)]
impl FakeHost {
    pub fn signed(id: i64, init_data: &str) -> Self {
        Self {
            user: Some(HostUser::placeholder(UserId(id), "Alice")),
            init_data: init_data.to_string(),
            ..Self::default()
        }
    }

    pub fn haptic_events(&self) -> Vec<String> {
        self.haptics.events.lock().unwrap().clone()
    }
}

impl HostPlatform for FakeHost {
    fn ready(&self) {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn expand(&self) {
        self.expand_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn user(&self) -> Option<HostUser> {
        self.user.clone()
    }

    fn init_data(&self) -> String {
        self.init_data.clone()
    }

    fn haptics(&self) -> Option<&dyn HapticFeedback> {
        Some(&self.haptics)
    }
}

/// Credentials as produced by a signed host identity.
#[allow(dead_code)]
pub fn signed_credentials(id: i64) -> Credentials {
    Credentials::new(UserId(id), format!("query_id=q&user=%7B%22id%22%3A{}%7D&hash=abc", id))
}
