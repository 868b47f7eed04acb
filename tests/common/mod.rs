#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use wotlwedu_console::context::AppContext;

static BACKEND_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Credentials and tokens the fake backend understands.
pub const ROOT_EMAIL: &str = "root@example.com";
pub const ROOT_PASSWORD: &str = "secret";
pub const TWO_FACTOR_EMAIL: &str = "2fa@example.com";
pub const BROKEN_2FA_EMAIL: &str = "2fa-broken@example.com";
pub const VALID_2FA_CODE: &str = "654321";
pub const EXPIRED_TOKEN: &str = "expired-tok";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Value,
    pub content_type: Option<String>,
}

#[derive(Default)]
pub struct BackendState {
    pub calls: Vec<RecordedCall>,
    pub items: Vec<Value>,
    pub users: Vec<Value>,
    pub images: Vec<Value>,
    pub next_id: u32,
    /// When set, item create/update answers with this status and a
    /// backend message instead of persisting.
    pub item_fail_status: Option<u16>,
}

impl BackendState {
    pub fn calls_to(&self, method: &str, path: &str) -> Vec<RecordedCall> {
        self.calls
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .cloned()
            .collect()
    }
}

type Shared = Arc<Mutex<BackendState>>;

pub struct TestBackend {
    pub base_url: String,
    pub state: Shared,
    pub config_dir: PathBuf,
}

impl TestBackend {
    pub async fn spawn() -> Self {
        let mut state = BackendState::default();
        state.items.push(json!({
            "id": "I1",
            "name": "Tacos",
            "description": "Street tacos",
            "url": "",
            "location": "",
            "categoryId": "",
            "workgroupId": "WG1",
        }));
        state.images.push(json!({
            "id": "IMG1",
            "name": "Menu photo",
            "description": "",
            "workgroupId": "WG1",
        }));
        state.next_id = 2;
        Self::spawn_with(state).await
    }

    pub async fn spawn_with(state: BackendState) -> Self {
        let state: Shared = Arc::new(Mutex::new(state));
        let router = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test backend");
        });

        let config_dir = std::env::temp_dir().join(format!(
            "wotlwedu-console-test-{}-{}",
            std::process::id(),
            BACKEND_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_dir_all(&config_dir);
        std::fs::create_dir_all(&config_dir).expect("test config dir");

        Self {
            base_url: format!("http://{}", addr),
            state,
            config_dir,
        }
    }

    /// A context isolated to this backend's config dir and base URL.
    pub fn context(&self) -> Arc<AppContext> {
        AppContext::with_base_url(self.config_dir.clone(), self.base_url.clone())
            .expect("build context")
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state")
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/login", axum::routing::post(login))
        .route("/login/verify2fa", axum::routing::post(verify2fa))
        .route("/item", get(list_items).post(create_item))
        .route("/item/:id", get(show_item).put(update_item).delete(delete_item))
        .route("/user", get(list_users).post(create_user))
        .route("/workgroup", get(list_workgroups))
        .route("/workgroup/:id", get(show_workgroup))
        .route("/capability", get(list_capabilities))
        .route("/capability/:id", get(show_capability))
        .route("/image", get(list_images))
        .route("/image/:id", get(show_image))
        .route("/image/file/:id", axum::routing::post(upload_image_file))
        .route("/helper/status", get(helper_status))
        .route("/ping", get(ping))
        .route("/notification/unreadcount", get(unread_count))
        .with_state(state)
}

fn record(
    state: &Shared,
    method: &str,
    path: String,
    query: HashMap<String, String>,
    body: Value,
    headers: &HeaderMap,
) {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().expect("state").calls.push(RecordedCall {
        method: method.to_string(),
        path,
        query,
        body,
        content_type,
    });
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Every protected route answers 401 for the expired token so tests can
/// drive the unauthorized path.
fn reject_expired(headers: &HeaderMap) -> Option<Response> {
    if bearer(headers).as_deref() == Some(EXPIRED_TOKEN) {
        return Some(
            (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Session expired" })))
                .into_response(),
        );
    }
    None
}

fn session_payload() -> Value {
    json!({
        "authToken": "tok-root",
        "refreshToken": "refresh-root",
        "userId": "U1",
        "email": ROOT_EMAIL,
        "alias": "root",
        "systemAdmin": true,
        "organizationAdmin": false,
        "workgroupAdmin": false,
    })
}

async fn login(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "POST", "/login".into(), HashMap::new(), body.clone(), &headers);

    match body["email"].as_str().unwrap_or_default() {
        ROOT_EMAIL if body["password"] == json!(ROOT_PASSWORD) => {
            Json(session_payload()).into_response()
        }
        TWO_FACTOR_EMAIL => (
            StatusCode::FOUND,
            [("location", "/auth/verify/U123/TOK456")],
            Json(json!({})),
        )
            .into_response(),
        BROKEN_2FA_EMAIL => (
            StatusCode::FOUND,
            [("location", "/auth/verify/U123")],
            Json(json!({})),
        )
            .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response(),
    }
}

async fn verify2fa(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST", "/login/verify2fa".into(), HashMap::new(), body.clone(), &headers);

    let valid = body["userId"] == json!("U123")
        && body["verificationToken"] == json!("TOK456")
        && body["authToken"] == json!(VALID_2FA_CODE);
    if valid {
        Json(session_payload()).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid verification code" })),
        )
            .into_response()
    }
}

async fn list_items(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", "/item".into(), query.clone(), Value::Null, &headers);
    if let Some(rejection) = reject_expired(&headers) {
        return rejection;
    }

    let guard = state.lock().expect("state");
    let rows: Vec<Value> = guard
        .items
        .iter()
        .filter(|item| {
            let filter_ok = query.get("filter").map_or(true, |f| {
                item["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&f.to_lowercase())
            });
            let scope_ok = query
                .get("workgroupId")
                .map_or(true, |wg| item["workgroupId"] == json!(wg.as_str()));
            filter_ok && scope_ok
        })
        .cloned()
        .collect();
    Json(json!({ "data": { "items": rows } })).into_response()
}

async fn show_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&state, "GET", format!("/item/{}", id), HashMap::new(), Value::Null, &headers);

    let guard = state.lock().expect("state");
    match guard.items.iter().find(|i| i["id"] == json!(id.as_str())) {
        Some(item) => Json(json!({ "data": { "item": item } })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response(),
    }
}

async fn create_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST", "/item".into(), HashMap::new(), body.clone(), &headers);

    let mut guard = state.lock().expect("state");
    if let Some(status) = guard.item_fail_status {
        return (
            StatusCode::from_u16(status).unwrap_or(StatusCode::UNPROCESSABLE_ENTITY),
            Json(json!({ "message": "save rejected" })),
        )
            .into_response();
    }
    let id = format!("I{}", guard.next_id);
    guard.next_id += 1;
    let mut entity = body;
    entity["id"] = json!(id);
    guard.items.push(entity.clone());
    Json(json!({ "data": { "item": entity } })).into_response()
}

async fn update_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "PUT", format!("/item/{}", id), HashMap::new(), body.clone(), &headers);

    let mut guard = state.lock().expect("state");
    if let Some(status) = guard.item_fail_status {
        return (
            StatusCode::from_u16(status).unwrap_or(StatusCode::UNPROCESSABLE_ENTITY),
            Json(json!({ "message": "save rejected" })),
        )
            .into_response();
    }
    match guard.items.iter_mut().find(|i| i["id"] == json!(id.as_str())) {
        Some(item) => {
            let mut entity = body;
            entity["id"] = json!(id);
            *item = entity.clone();
            Json(json!({ "data": { "item": entity } })).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response(),
    }
}

async fn delete_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&state, "DELETE", format!("/item/{}", id), HashMap::new(), Value::Null, &headers);

    let mut guard = state.lock().expect("state");
    let before = guard.items.len();
    guard.items.retain(|i| i["id"] != json!(id.as_str()));
    if guard.items.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response();
    }
    Json(json!({ "data": {} })).into_response()
}

async fn list_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", "/user".into(), query, Value::Null, &headers);
    let guard = state.lock().expect("state");
    Json(json!({ "data": { "users": guard.users } })).into_response()
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST", "/user".into(), HashMap::new(), body.clone(), &headers);

    let mut guard = state.lock().expect("state");
    let id = format!("U{}", guard.next_id);
    guard.next_id += 1;
    let mut entity = body;
    entity["id"] = json!(id);
    guard.users.push(entity.clone());
    Json(json!({ "data": { "user": entity } })).into_response()
}

async fn list_workgroups(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", "/workgroup".into(), query, Value::Null, &headers);
    Json(json!({
        "data": {
            "workgroups": [
                { "id": "WG1", "name": "Kitchen", "organizationId": "ORG9" },
                { "id": "WG2", "name": "Front of House", "organizationId": "ORG9" },
            ]
        }
    }))
    .into_response()
}

async fn show_workgroup(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&state, "GET", format!("/workgroup/{}", id), HashMap::new(), Value::Null, &headers);
    Json(json!({
        "data": { "workgroup": { "id": id, "name": "Kitchen", "organizationId": "ORG9" } }
    }))
    .into_response()
}

async fn list_capabilities(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", "/capability".into(), query, Value::Null, &headers);
    Json(json!({
        "data": { "capabilities": [{ "id": "C1", "name": "item.edit", "description": "" }] }
    }))
    .into_response()
}

async fn show_capability(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&state, "GET", format!("/capability/{}", id), HashMap::new(), Value::Null, &headers);
    Json(json!({
        "data": { "capability": { "id": id, "name": "item.edit", "description": "" } }
    }))
    .into_response()
}

async fn list_images(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", "/image".into(), query, Value::Null, &headers);
    let guard = state.lock().expect("state");
    Json(json!({ "data": { "images": guard.images } })).into_response()
}

async fn show_image(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&state, "GET", format!("/image/{}", id), HashMap::new(), Value::Null, &headers);
    let guard = state.lock().expect("state");
    match guard.images.iter().find(|i| i["id"] == json!(id.as_str())) {
        Some(image) => Json(json!({ "data": { "image": image } })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response(),
    }
}

async fn upload_image_file(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    mut multipart: axum::extract::Multipart,
) -> Response {
    let mut fileextension = String::new();
    let mut file_bytes = 0;
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or_default().to_string().as_str() {
            "fileextension" => fileextension = field.text().await.unwrap_or_default(),
            "file" => file_bytes = field.bytes().await.map(|b| b.len()).unwrap_or(0),
            _ => {}
        }
    }
    record(
        &state,
        "POST",
        format!("/image/file/{}", id),
        HashMap::new(),
        json!({ "fileextension": fileextension, "bytes": file_bytes }),
        &headers,
    );
    Json(json!({ "data": {} })).into_response()
}

async fn helper_status(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "GET", "/helper/status".into(), HashMap::new(), Value::Null, &headers);
    Json(json!({ "status": "ok", "uptime": 42 })).into_response()
}

async fn ping(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "GET", "/ping".into(), HashMap::new(), Value::Null, &headers);
    Json(json!({ "data": { "pong": true } })).into_response()
}

async fn unread_count(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "GET", "/notification/unreadcount".into(), HashMap::new(), Value::Null, &headers);
    Json(json!({ "data": { "count": 3 } })).into_response()
}
