//! In-process stand-in for the Supabase REST, auth and storage APIs, good
//! enough to exercise the client against real HTTP.

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex},
};

use agentok_api::{
    auth::authenticate_with_token, db::UserScopedClient, supabase::SupabaseClient,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const SERVICE_KEY: &str = "test-service-key";

#[derive(Default)]
pub struct MockState {
    pub tables: HashMap<String, Vec<Value>>,
    pub users: HashMap<Uuid, Value>,
    pub tokens: HashMap<String, Uuid>,
    pub buckets: HashMap<String, BTreeMap<String, Vec<u8>>>,
    pub rpc_calls: Vec<(String, Value)>,
    pub rpc_rows: Vec<Value>,
    pub failing_tables: HashSet<String>,
    /// Number of access token verifications served
    pub token_checks: usize,
    next_id: i64,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockSupabase {
    pub base_url: String,
    pub state: Shared,
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl MockSupabase {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route(
                "/rest/v1/*path",
                get(rest_select)
                    .post(rest_insert)
                    .patch(rest_update)
                    .delete(rest_delete),
            )
            .route("/auth/v1/user", get(auth_user))
            .route("/auth/v1/admin/users/:id", get(admin_user))
            .route(
                "/storage/v1/object/*rest",
                axum::routing::post(storage_post).delete(storage_delete),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn client(&self) -> SupabaseClient {
        SupabaseClient::new(&reqwest::Client::new(), &self.base_url, SERVICE_KEY)
            .expect("valid client config")
    }

    /// Register a user that can log in with the returned access token
    pub fn add_user(&self, email: &str) -> TestUser {
        let id = Uuid::new_v4();
        let token = format!("token-{id}");
        let mut state = self.state.lock().unwrap();
        state.users.insert(
            id,
            json!({
                "id": id,
                "email": email,
                "aud": "authenticated",
                "app_metadata": { "provider": "email" },
                "user_metadata": { "name": email },
            }),
        );
        state.tokens.insert(token.clone(), id);
        TestUser { id, token }
    }

    /// Register a user and authenticate as them
    pub async fn login(&self, email: &str) -> UserScopedClient {
        let user = self.add_user(email);
        authenticate_with_token(&self.client(), &user.token)
            .await
            .expect("login should succeed")
    }

    pub fn insert_row(&self, table: &str, row: Value) -> Value {
        self.state.lock().unwrap().insert(table, row)
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn fail_table(&self, table: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_tables.insert(table.to_owned());
    }

    pub fn put_object(&self, bucket: &str, path: &str, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state
            .buckets
            .entry(bucket.to_owned())
            .or_default()
            .insert(path.to_owned(), data.to_vec());
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.buckets.get(bucket)?.get(path).cloned()
    }
}

impl MockState {
    fn insert(&mut self, table: &str, row: Value) -> Value {
        let mut row = match row {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if !row.contains_key("id") {
            self.next_id += 1;
            row.insert("id".into(), self.next_id.into());
        }
        row.entry("created_at")
            .or_insert_with(|| json!("2024-05-01T12:00:00Z"));
        if table == "chats" {
            row.entry("status").or_insert_with(|| json!("ready"));
        }
        let row = Value::Object(row);
        self.tables
            .entry(table.to_owned())
            .or_default()
            .push(row.clone());
        row
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn has_service_key(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(SERVICE_KEY)
}

/// Check the request and resolve the target table, or produce an error response
fn table_for(state: &MockState, headers: &HeaderMap, path: &str) -> Result<String, Response> {
    if !has_service_key(headers) {
        return Err(error(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }
    if state.failing_tables.contains(path) {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "relation is unavailable"));
    }
    Ok(path.to_owned())
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "null".to_owned(),
        Some(other) => other.to_string(),
    }
}

fn check(row: &Value, column: &str, op: &str, expected: &str) -> bool {
    let actual = text(row.get(column));
    match op {
        "eq" => actual == expected,
        "in" => expected
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .any(|candidate| candidate == actual),
        _ => false,
    }
}

fn matches(row: &Value, params: &[(String, String)]) -> bool {
    params
        .iter()
        .filter(|(key, _)| key != "select" && key != "limit")
        .all(|(key, value)| {
            if key == "or" {
                value
                    .trim_start_matches('(')
                    .trim_end_matches(')')
                    .split(',')
                    .any(|condition| {
                        let mut parts = condition.splitn(3, '.');
                        match (parts.next(), parts.next(), parts.next()) {
                            (Some(column), Some(op), Some(expected)) => {
                                check(row, column, op, expected)
                            }
                            _ => false,
                        }
                    })
            } else {
                match value.split_once('.') {
                    Some((op, expected)) => check(row, key, op, expected),
                    None => false,
                }
            }
        })
}

fn project(row: &Value, params: &[(String, String)]) -> Value {
    let columns = params
        .iter()
        .find(|(key, _)| key == "select")
        .map(|(_, value)| value.as_str())
        .unwrap_or("*");
    if columns == "*" {
        return row.clone();
    }
    let projected: Map<String, Value> = columns
        .split(',')
        .map(|column| (column.to_owned(), row.get(column).cloned().unwrap_or(Value::Null)))
        .collect();
    Value::Object(projected)
}

fn limit(params: &[(String, String)]) -> usize {
    params
        .iter()
        .find(|(key, _)| key == "limit")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(usize::MAX)
}

async fn rest_select(
    State(state): State<Shared>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let state = state.lock().unwrap();
    let table = match table_for(&state, &headers, &path) {
        Ok(table) => table,
        Err(response) => return response,
    };
    let rows: Vec<Value> = state
        .tables
        .get(&table)
        .map(|rows| {
            rows.iter()
                .filter(|row| matches(row, &params))
                .take(limit(&params))
                .map(|row| project(row, &params))
                .collect()
        })
        .unwrap_or_default();
    Json(rows).into_response()
}

async fn rest_insert(
    State(state): State<Shared>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(function) = path.strip_prefix("rpc/") {
        if !has_service_key(&headers) {
            return error(StatusCode::UNAUTHORIZED, "Invalid API key");
        }
        let params: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        state.rpc_calls.push((function.to_owned(), params));
        return Json(state.rpc_rows.clone()).into_response();
    }

    let table = match table_for(&state, &headers, &path) {
        Ok(table) => table,
        Err(response) => return response,
    };
    let Ok(row) = serde_json::from_slice::<Value>(&body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid JSON body");
    };
    let created = state.insert(&table, row);
    (StatusCode::CREATED, Json(vec![created])).into_response()
}

async fn rest_update(
    State(state): State<Shared>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().unwrap();
    let table = match table_for(&state, &headers, &path) {
        Ok(table) => table,
        Err(response) => return response,
    };
    let Ok(Value::Object(changes)) = serde_json::from_slice::<Value>(&body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid JSON body");
    };

    let mut updated = Vec::new();
    for row in state.tables.entry(table).or_default().iter_mut() {
        if matches(row, &params) {
            if let Some(fields) = row.as_object_mut() {
                fields.extend(changes.clone());
            }
            updated.push(row.clone());
        }
    }
    Json(updated).into_response()
}

async fn rest_delete(
    State(state): State<Shared>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    let table = match table_for(&state, &headers, &path) {
        Ok(table) => table,
        Err(response) => return response,
    };
    let rows = state.tables.entry(table).or_default();
    let (deleted, kept): (Vec<Value>, Vec<Value>) =
        rows.drain(..).partition(|row| matches(row, &params));
    *rows = kept;
    Json(deleted).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn auth_user(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    state.token_checks += 1;
    let user = bearer(&headers)
        .and_then(|token| state.tokens.get(token))
        .and_then(|id| state.users.get(id));
    match user {
        Some(user) => Json(user.clone()).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "invalid JWT: unable to parse or verify signature" })),
        )
            .into_response(),
    }
}

async fn admin_user(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if bearer(&headers) != Some(SERVICE_KEY) {
        return error(StatusCode::FORBIDDEN, "User not allowed");
    }
    let state = state.lock().unwrap();
    let user = id.parse::<Uuid>().ok().and_then(|id| state.users.get(&id));
    match user {
        Some(user) => Json(user.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "msg": "User not found" }))).into_response(),
    }
}

async fn storage_post(
    State(state): State<Shared>,
    Path(rest): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !has_service_key(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid API key");
    }
    let mut state = state.lock().unwrap();

    if let Some(bucket) = rest.strip_prefix("list/") {
        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let prefix = request["prefix"].as_str().unwrap_or_default();
        let search = request["search"].as_str().unwrap_or_default();
        let limit = request["limit"].as_u64().map_or(usize::MAX, |limit| limit as usize);
        // keys are sorted, so this matches `sortBy: name asc`
        let entries: Vec<Value> = state
            .buckets
            .get(bucket)
            .map(|objects| {
                objects
                    .keys()
                    .filter_map(|path| {
                        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
                        (parent == prefix && name.starts_with(search))
                            .then(|| json!({ "name": name }))
                    })
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default();
        return Json(entries).into_response();
    }

    let Some((bucket, path)) = rest.split_once('/') else {
        return error(StatusCode::BAD_REQUEST, "Missing object path");
    };
    let upsert = headers.get("x-upsert").and_then(|v| v.to_str().ok()) == Some("true");
    let objects = state.buckets.entry(bucket.to_owned()).or_default();
    if objects.contains_key(path) && !upsert {
        return error(StatusCode::BAD_REQUEST, "The resource already exists");
    }
    objects.insert(path.to_owned(), body.to_vec());
    Json(json!({ "Key": format!("{bucket}/{path}") })).into_response()
}

async fn storage_delete(
    State(state): State<Shared>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !has_service_key(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid API key");
    }
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let mut state = state.lock().unwrap();
    let objects = state.buckets.entry(bucket).or_default();
    let removed: Vec<Value> = request["prefixes"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .filter_map(|path| objects.remove(path).map(|_| json!({ "name": path })))
        .collect();
    Json(removed).into_response()
}
