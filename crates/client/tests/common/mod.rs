//! In-process fake of the drive backend and its object storage
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

use ::common::auth::CredentialStore;
use ::common::drive::{DrivePath, FileRecord, FOLDER_CONTENT_TYPE};
use client::api::drop::DropRecord;
use client::api::ApiClient;

pub const USERNAME: &str = "ada";
pub const PASSWORD: &str = "correct horse";

/// Unsigned JWT whose `exp` is `ttl` seconds from now
pub fn make_jwt(ttl: i64, extra: Value) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let mut claims = json!({ "exp": now + ttl });
    if let (Some(claims), Some(extra)) = (claims.as_object_mut(), extra.as_object()) {
        claims.extend(extra.clone());
    }
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

/// One field of a storage POST
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub value: Vec<u8>,
}

impl FormField {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.value).to_string()
    }
}

/// Knobs a test can turn before or during a run
#[derive(Debug, Clone)]
pub struct Behavior {
    pub max_file_size: Option<Value>,
    pub security_token: Option<String>,
    pub upload_id: Option<String>,
    /// Storage waits this long before answering
    pub storage_delay: Option<Duration>,
    /// Storage answers 500 for these file names
    pub reject_files: Vec<String>,
    pub notify_status: StatusCode,
    /// Drop the access key id from issued policies
    pub omit_access_key: bool,
    pub logout_status: StatusCode,
    /// List share links as a bare array instead of `{ drops }`
    pub bare_drop_list: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            max_file_size: Some(json!(1024 * 1024)),
            security_token: None,
            upload_id: Some("session-1".to_string()),
            storage_delay: None,
            reject_files: Vec::new(),
            notify_status: StatusCode::OK,
            omit_access_key: false,
            logout_status: StatusCode::OK,
            bare_drop_list: false,
        }
    }
}

#[derive(Default)]
struct Inner {
    behavior: Behavior,
    storage_posts: Vec<Vec<FormField>>,
    notify_bodies: Vec<(Option<String>, Value)>,
    policy_requests: Vec<Value>,
    records: Vec<FileRecord>,
    logout_bodies: Vec<(Option<String>, Value)>,
    download_bodies: Vec<(Option<String>, Value)>,
    drops: Vec<FakeShare>,
}

#[derive(Clone)]
struct FakeShare {
    record: DropRecord,
    files: Vec<i64>,
}

#[derive(Clone)]
pub struct FakeDrive {
    pub addr: SocketAddr,
    inner: Arc<Mutex<Inner>>,
    storage_hits: Arc<AtomicUsize>,
    next_id: Arc<AtomicI64>,
}

impl FakeDrive {
    pub async fn start() -> Self {
        Self::start_with(Behavior::default()).await
    }

    pub async fn start_with(behavior: Behavior) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let fake = FakeDrive {
            addr,
            inner: Arc::new(Mutex::new(Inner {
                behavior,
                ..Default::default()
            })),
            storage_hits: Arc::new(AtomicUsize::new(0)),
            next_id: Arc::new(AtomicI64::new(1)),
        };

        let app = Router::new()
            .route("/api/user/login/", post(login))
            .route("/api/user/refresh-token/", post(refresh))
            .route("/api/user/profile/", get(profile))
            .route("/api/user/logout/", post(logout))
            .route("/api/drop/", get(list_drops))
            .route("/api/drop/create/", post(create_drop))
            .route("/api/drop/get-drop/", post(get_drop))
            .route("/api/drop/:id/delete/", post(delete_drop))
            .route("/api/file/:id/download/", post(download))
            .route("/api/file/get-token/", post(get_token))
            .route("/api/file/uploaded/", post(uploaded))
            .route("/api/file/list/", post(list))
            .route("/api/file/new-folder/", post(new_folder))
            .route("/api/file/:id/update/", post(update))
            .route("/api/file/:id/delete/", post(delete))
            .route("/storage/", post(storage))
            .with_state(fake.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        fake
    }

    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/", self.addr)).unwrap()
    }

    pub fn storage_url(&self) -> String {
        format!("http://{}/storage/", self.addr)
    }

    /// A client with no session
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_url(), CredentialStore::in_memory()).unwrap()
    }

    /// A client already holding a valid session
    pub fn logged_in_client(&self) -> ApiClient {
        let client = self.client();
        assert!(client
            .credentials()
            .store(&make_jwt(3600, json!({})), &make_jwt(86400, json!({}))));
        client
    }

    pub fn set_behavior(&self, f: impl FnOnce(&mut Behavior)) {
        f(&mut self.inner.lock().behavior);
    }

    /// Requests that reached the storage route, including unfinished ones
    pub fn storage_hits(&self) -> usize {
        self.storage_hits.load(Ordering::SeqCst)
    }

    pub fn storage_posts(&self) -> Vec<Vec<FormField>> {
        self.inner.lock().storage_posts.clone()
    }

    pub fn notify_bodies(&self) -> Vec<(Option<String>, Value)> {
        self.inner.lock().notify_bodies.clone()
    }

    pub fn policy_requests(&self) -> Vec<Value> {
        self.inner.lock().policy_requests.clone()
    }

    pub fn add_record(&self, name: &str, path: &str, content_type: &str) -> FileRecord {
        let record = FileRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            content_type: content_type.to_string(),
            size: 0,
            oss_url: String::new(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            path: DrivePath::new(path).to_string(),
        };
        self.inner.lock().records.push(record.clone());
        record
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.inner.lock().records.clone()
    }

    pub fn logout_bodies(&self) -> Vec<(Option<String>, Value)> {
        self.inner.lock().logout_bodies.clone()
    }

    pub fn download_bodies(&self) -> Vec<(Option<String>, Value)> {
        self.inner.lock().download_bodies.clone()
    }

    /// Share links as stored, including deleted ones
    pub fn drops(&self) -> Vec<DropRecord> {
        self.inner.lock().drops.iter().map(|d| d.record.clone()).collect()
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Json(json!({
            "access": make_jwt(3600, json!({"user_id": 1})),
            "refresh": make_jwt(86400, json!({"user_id": 1})),
            "user": {"id": 1, "username": USERNAME, "email": "ada@example.com"},
            "message": "login successful",
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn refresh(Json(body): Json<Value>) -> Response {
    match body["refresh"].as_str() {
        Some(token) if !token.is_empty() => {
            Json(json!({"access": make_jwt(3600, json!({"generation": 2}))})).into_response()
        }
        _ => unauthorized(),
    }
}

async fn profile(headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    Json(json!({
        "user": {"id": 1, "username": USERNAME, "display_name": "Ada", "is_active": true},
        "message": "ok",
    }))
    .into_response()
}

async fn get_token(State(fake): State<FakeDrive>, Json(body): Json<Value>) -> Response {
    let mut inner = fake.inner.lock();
    inner.policy_requests.push(body);
    let behavior = inner.behavior.clone();

    let mut token = json!({
        "access_key_id": "AKIDFAKE",
        "policy": "eyJleHBpcmF0aW9uIjoiMjAzMCJ9",
        "signature": "c2lnbmF0dXJl",
        "host": fake.storage_url(),
        "prefix": "uploads/1",
        "expire": 4102444800u64,
    });
    let Some(obj) = token.as_object_mut() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    if let Some(limit) = behavior.max_file_size {
        obj.insert("max_file_size".into(), limit);
    }
    if let Some(sts) = behavior.security_token {
        obj.insert("x-oss-security-token".into(), json!(sts));
    }
    if behavior.omit_access_key {
        obj.remove("access_key_id");
    }

    Json(json!({
        "token": token,
        "upload_id": behavior.upload_id,
        "message": "ok",
    }))
    .into_response()
}

async fn storage(State(fake): State<FakeDrive>, mut multipart: Multipart) -> StatusCode {
    fake.storage_hits.fetch_add(1, Ordering::SeqCst);
    let delay = fake.inner.lock().behavior.storage_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let value = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(FormField {
            name,
            file_name,
            content_type,
            value,
        });
    }

    let rejected = {
        let inner = fake.inner.lock();
        fields.iter().any(|f| {
            f.file_name
                .as_ref()
                .is_some_and(|n| inner.behavior.reject_files.contains(n))
        })
    };
    fake.inner.lock().storage_posts.push(fields);

    if rejected {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn uploaded(
    State(fake): State<FakeDrive>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = bearer(&headers);
    let status = {
        let mut inner = fake.inner.lock();
        inner.notify_bodies.push((auth.clone(), body.clone()));
        inner.behavior.notify_status
    };
    if auth.is_none() {
        return unauthorized();
    }
    if !status.is_success() {
        return (status, Json(json!({"message": "record rejected"}))).into_response();
    }

    let record = FileRecord {
        id: fake.next_id.fetch_add(1, Ordering::SeqCst),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        content_type: body["content_type"].as_str().unwrap_or_default().to_string(),
        size: body["size"].as_u64().unwrap_or_default(),
        oss_url: body["oss_url"].as_str().unwrap_or_default().to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        path: body["path"].as_str().unwrap_or("/").to_string(),
    };
    fake.inner.lock().records.push(record.clone());
    Json(json!({"file": record, "message": "created"})).into_response()
}

async fn list(State(fake): State<FakeDrive>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let path = DrivePath::new(body["path"].as_str().unwrap_or("/"));
    let files: Vec<FileRecord> = fake
        .records()
        .into_iter()
        .filter(|r| r.path == path.as_str())
        .collect();
    // list responses come wrapped in the envelope
    Json(json!({"code": 0, "msg": "", "data": {"files": files}})).into_response()
}

async fn new_folder(
    State(fake): State<FakeDrive>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let name = body["folder_name"].as_str().unwrap_or_default();
    if name.is_empty() {
        return Json(json!({"code": 40001, "msg": "folder name required"})).into_response();
    }
    let folder = fake.add_record(
        name,
        body["path"].as_str().unwrap_or("/"),
        FOLDER_CONTENT_TYPE,
    );
    Json(json!({"folder": folder, "message": "created"})).into_response()
}

async fn update(
    State(fake): State<FakeDrive>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = fake.inner.lock();
    let Some(record) = inner.records.iter_mut().find(|r| r.id == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    };
    if let Some(path) = body["path"].as_str() {
        record.path = path.to_string();
    }
    if let Some(name) = body["name"].as_str() {
        record.name = name.to_string();
    }
    Json(json!({"file": record.clone()})).into_response()
}

async fn delete(State(fake): State<FakeDrive>, Path(id): Path<i64>) -> Response {
    let mut inner = fake.inner.lock();
    let before = inner.records.len();
    inner.records.retain(|r| r.id != id);
    if inner.records.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    }
    Json(json!({"message": "deleted"})).into_response()
}

async fn logout(
    State(fake): State<FakeDrive>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let status = {
        let mut inner = fake.inner.lock();
        inner.logout_bodies.push((bearer(&headers), body.clone()));
        inner.behavior.logout_status
    };
    if !status.is_success() {
        return (status, Json(json!({"detail": "Token is blacklisted"}))).into_response();
    }
    match body["refresh"].as_str() {
        Some(token) if !token.is_empty() => {
            Json(json!({"message": "logged out"})).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "refresh token required"})),
        )
            .into_response(),
    }
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message}))).into_response()
}

async fn create_drop(
    State(fake): State<FakeDrive>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let code = body["code"].as_str().unwrap_or_default().to_string();
    let ids: Vec<i64> = body["files"]
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();

    let mut inner = fake.inner.lock();
    if code.is_empty() || ids.is_empty() {
        return message(StatusCode::BAD_REQUEST, "code and files are required");
    }
    if inner.drops.iter().any(|d| d.record.code == code && !d.record.is_deleted) {
        return message(StatusCode::BAD_REQUEST, "code already in use");
    }
    let files: Vec<FileRecord> = inner
        .records
        .iter()
        .filter(|r| ids.contains(&r.id))
        .cloned()
        .collect();
    if files.len() != ids.len() {
        return message(StatusCode::BAD_REQUEST, "file does not exist");
    }

    let record = DropRecord {
        id: fake.next_id.fetch_add(1, Ordering::SeqCst),
        code: code.clone(),
        expire_days: body["expire_days"].as_u64().unwrap_or(1) as u32,
        expire_time: None,
        is_expired: false,
        require_login: body["require_login"].as_bool().unwrap_or(false),
        download_count: 0,
        max_download_count: body["max_download_count"].as_u64().unwrap_or(0),
        password: body["password"].as_str().map(str::to_string),
        is_deleted: false,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    };
    inner.drops.push(FakeShare {
        record: record.clone(),
        files: ids,
    });
    Json(json!({
        "drop": record,
        "files": files,
        "message": "created",
        "share_url": format!("http://{}/s/{}", fake.addr, code),
    }))
    .into_response()
}

/// Check access to a share the way the backend does, counting a download
/// when `count` is set
fn admit(
    share: &mut FakeShare,
    headers: &HeaderMap,
    password: Option<&str>,
    count: bool,
) -> Result<(), Response> {
    if share.record.require_login && bearer(headers).is_none() {
        return Err(unauthorized());
    }
    if share.record.password.as_deref().is_some_and(|p| Some(p) != password) {
        return Err(message(StatusCode::FORBIDDEN, "Invalid share password"));
    }
    let max = share.record.max_download_count;
    if max > 0 && share.record.download_count >= max {
        return Err(message(StatusCode::FORBIDDEN, "download limit exceeded"));
    }
    if count {
        share.record.download_count += 1;
    }
    Ok(())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

async fn get_drop(
    State(fake): State<FakeDrive>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let code = body["code"].as_str().unwrap_or_default();
    let password = body["password"].as_str();

    let mut inner = fake.inner.lock();
    let Some(share) = inner
        .drops
        .iter_mut()
        .find(|d| d.record.code == code && !d.record.is_deleted)
    else {
        return not_found();
    };
    if let Err(response) = admit(share, &headers, password, false) {
        return response;
    }
    let share = share.clone();
    let files: Vec<FileRecord> = inner
        .records
        .iter()
        .filter(|r| share.files.contains(&r.id))
        .cloned()
        .collect();
    Json(json!({"drop": share.record, "files": files, "message": "ok"})).into_response()
}

async fn delete_drop(
    State(fake): State<FakeDrive>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let mut inner = fake.inner.lock();
    match inner
        .drops
        .iter_mut()
        .find(|d| d.record.id == id && !d.record.is_deleted)
    {
        Some(share) => {
            share.record.is_deleted = true;
            Json(json!({"message": "deleted"})).into_response()
        }
        None => not_found(),
    }
}

async fn list_drops(State(fake): State<FakeDrive>, headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let inner = fake.inner.lock();
    let drops: Vec<&DropRecord> = inner
        .drops
        .iter()
        .map(|d| &d.record)
        .filter(|r| !r.is_deleted)
        .collect();
    if inner.behavior.bare_drop_list {
        Json(json!(drops)).into_response()
    } else {
        Json(json!({"drops": drops, "message": "ok"})).into_response()
    }
}

async fn download(
    State(fake): State<FakeDrive>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = fake.inner.lock();
    inner.download_bodies.push((bearer(&headers), body.clone()));

    let Some(record) = inner.records.iter().find(|r| r.id == id).cloned() else {
        return not_found();
    };
    let url = format!("http://{}/storage/{}", fake.addr, record.name);

    match body["code"].as_str() {
        Some(code) => {
            let Some(share) = inner
                .drops
                .iter_mut()
                .find(|d| d.record.code == code && !d.record.is_deleted)
            else {
                return not_found();
            };
            if !share.files.contains(&id) {
                return not_found();
            }
            if let Err(response) = admit(share, &headers, body["password"].as_str(), true) {
                return response;
            }
        }
        None if bearer(&headers).is_none() => return unauthorized(),
        None => {}
    }
    Json(json!({"url": url, "message": "ok"})).into_response()
}
