//! In-process stand-in for the catalog backend and TMDB.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use catalogctl::config::Configuration;
use catalogctl::Console;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "good-token";
pub const API_KEY: &str = "good-key";

#[derive(Default)]
pub struct StubState {
    pub tables: HashMap<String, BTreeMap<u64, Value>>,
    pub next_id: u64,
    /// Collections whose GET answers 500.
    pub failing: HashSet<String>,
    /// Episode/season names whose POST answers 422.
    pub rejected_names: HashSet<String>,
    /// When false, POST answers `{"message": ..., "id": ..}` instead of the row.
    pub echo_rows: bool,
    pub requests: Vec<String>,
    pub tmdb_bearer_ok: bool,
    pub tmdb_key_ok: bool,
    /// "bearer" or "api_key" per TMDB request, in order.
    pub tmdb_auth: Vec<&'static str>,
    pub tmdb_episodes: Value,
    pub tmdb_seasons: Value,
}

pub type Shared = Arc<Mutex<StubState>>;

pub struct Stub {
    pub base: String,
    pub state: Shared,
}

impl Stub {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState {
            next_id: 1000,
            echo_rows: true,
            tmdb_bearer_ok: true,
            tmdb_key_ok: true,
            tmdb_episodes: json!([]),
            tmdb_seasons: json!([]),
            ..StubState::default()
        }));

        let app = Router::new()
            .route("/3/tv/{show}/season/{season}", get(tmdb_season))
            .route("/3/tv/{show}", get(tmdb_show))
            .route("/{table}", get(list).post(create))
            .route("/{table}/{id}", put(update).delete(remove))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            state,
        }
    }

    pub fn config(&self) -> Configuration {
        Configuration::from_yaml(&format!(
            "catalog:\n  baseUrl: {base}\ntmdb:\n  baseUrl: {base}/3\n  token: {TOKEN}\n  apiKey: {API_KEY}\n",
            base = self.base
        ))
        .unwrap()
    }

    pub fn console(&self) -> Console {
        Console::from_config(&self.config()).unwrap()
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        let entries = state.tables.entry(table.to_string()).or_default();
        for row in rows {
            let id = row["id"]
                .as_u64()
                .or_else(|| row["id"].as_str().and_then(|s| s.parse().ok()))
                .unwrap();
            entries.insert(id, row);
        }
    }

    /// Stores a row under `key` as is, whatever its `id` holds.
    pub fn seed_at(&self, table: &str, key: u64, row: Value) {
        let mut state = self.state.lock().unwrap();
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .insert(key, row);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn row(&self, table: &str, id: u64) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.tables.get(table).and_then(|t| t.get(&id).cloned())
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut StubState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

pub fn show(id: u64, title: &str, tmdb_id: &str) -> Value {
    json!({"id": id, "title": title, "tmdb_id": tmdb_id, "thumbnail": ""})
}

pub fn season(id: u64, show: u64, order: i64) -> Value {
    json!({
        "id": id,
        "tv_show_id": format!("[\"{show}\"]"),
        "slug": format!("s{order:02}"),
        "season_name": format!("S{order:02}"),
        "order": order,
        "status": 1
    })
}

pub fn episode(id: u64, season: u64, series: u64, order: i64) -> Value {
    json!({
        "id": id,
        "season_id": season,
        "series_id": series,
        "episode_name": format!("Episode {order}"),
        "slug": format!("episode-{order}"),
        "description": "",
        "file_source": "server",
        "source_type": "mp4",
        "file_url": "",
        "order": order,
        "runtime": "45 min",
        "poster": "",
        "total_view": 0
    })
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

async fn list(State(state): State<Shared>, Path(table): Path<String>) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.requests.push(format!("GET /{table}"));
    if state.failing.contains(&table) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    let rows: Vec<Value> = state
        .tables
        .get(&table)
        .map(|t| t.values().cloned().collect())
        .unwrap_or_default();
    (StatusCode::OK, Json(Value::Array(rows)))
}

async fn create(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.requests.push(format!("POST /{table}"));
    let name = body
        .get("episode_name")
        .or_else(|| body.get("season_name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if state.rejected_names.contains(&name) {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "duplicate slug");
    }

    state.next_id += 1;
    let id = state.next_id;
    body["id"] = json!(id);
    state
        .tables
        .entry(table)
        .or_default()
        .insert(id, body.clone());

    if state.echo_rows {
        (StatusCode::CREATED, Json(body))
    } else {
        (StatusCode::CREATED, Json(json!({"message": "created", "id": id})))
    }
}

async fn update(
    State(state): State<Shared>,
    Path((table, id)): Path<(String, u64)>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.requests.push(format!("PUT /{table}/{id}"));
    let echo = state.echo_rows;
    let Some(rows) = state.tables.get_mut(&table) else {
        return error(StatusCode::NOT_FOUND, "no such table");
    };
    if !rows.contains_key(&id) {
        return error(StatusCode::NOT_FOUND, "no such row");
    }
    body["id"] = json!(id);
    rows.insert(id, body.clone());
    if echo {
        (StatusCode::OK, Json(body))
    } else {
        (StatusCode::OK, Json(json!({"message": "updated"})))
    }
}

async fn remove(
    State(state): State<Shared>,
    Path((table, id)): Path<(String, u64)>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.requests.push(format!("DELETE /{table}/{id}"));
    let removed = state
        .tables
        .get_mut(&table)
        .and_then(|rows| rows.remove(&id))
        .is_some();
    if !removed {
        return error(StatusCode::NOT_FOUND, "no such row");
    }

    // cascade the way the PHP backend does
    let mut season_ids: HashSet<u64> = HashSet::new();
    if table == "tv_shows" {
        let marker = format!("\"{id}\"");
        if let Some(seasons) = state.tables.get_mut("seasons") {
            seasons.retain(|sid, row| {
                let owned = row["tv_show_id"]
                    .as_str()
                    .map(|r| r.contains(&marker))
                    .unwrap_or(false);
                if owned {
                    season_ids.insert(*sid);
                }
                !owned
            });
        }
        if let Some(episodes) = state.tables.get_mut("episodes") {
            episodes.retain(|_, row| row["series_id"].as_u64() != Some(id));
        }
    }
    if table == "seasons" {
        season_ids.insert(id);
    }
    if let Some(episodes) = state.tables.get_mut("episodes") {
        episodes.retain(|_, row| {
            row["season_id"]
                .as_u64()
                .map(|sid| !season_ids.contains(&sid))
                .unwrap_or(true)
        });
    }

    (StatusCode::OK, Json(json!({"message": "deleted"})))
}

fn tmdb_authorized(
    state: &mut StubState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> bool {
    match query.get("api_key") {
        Some(key) => {
            state.tmdb_auth.push("api_key");
            state.tmdb_key_ok && key == API_KEY
        }
        None => {
            state.tmdb_auth.push("bearer");
            let bearer = headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .map(|h| h == format!("Bearer {TOKEN}"))
                .unwrap_or(false);
            state.tmdb_bearer_ok && bearer
        }
    }
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"status_code": 7, "status_message": "Invalid API key", "success": false})),
    )
}

async fn tmdb_season(
    State(state): State<Shared>,
    Path((_show, season)): Path<(String, i64)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    if !tmdb_authorized(&mut state, &headers, &query) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({"season_number": season, "episodes": state.tmdb_episodes.clone()})),
    )
}

async fn tmdb_show(
    State(state): State<Shared>,
    Path(_show): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    if !tmdb_authorized(&mut state, &headers, &query) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({"name": "Stub", "seasons": state.tmdb_seasons.clone()})),
    )
}
