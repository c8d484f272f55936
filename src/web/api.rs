//! REST API handlers for the control panel
//!
//! This module defines the API routes and handlers for the web server.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::catalog::Character;
use crate::mac;
use crate::selection::{self, SelectionMode};
use crate::ssid;

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Current broadcast status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub date: String,
    pub mode: String,
    pub character: Option<String>,
    pub mac: Option<String>,
    pub ssid: String,
    pub is_special_ssid: bool,
    pub seconds_until_rotation: i64,
}

/// One catalog character with its rotation state
#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub index: usize,
    pub name: String,
    pub mac: String,
    pub season: Option<String>,
    pub excluded: bool,
}

impl CharacterResponse {
    fn new(index: usize, character: &Character, excluded: bool) -> Self {
        Self {
            index,
            name: character.name.clone(),
            mac: mac::character_mac(character),
            season: character.season.map(|s| s.to_string()),
            excluded,
        }
    }
}

/// One special SSID with its rotation state
#[derive(Debug, Serialize)]
pub struct SpecialSsidResponse {
    pub index: usize,
    pub ssid: String,
    pub character_name: String,
    pub notes: String,
    pub active: bool,
    pub excluded: bool,
}

/// Both exclusion pools
#[derive(Debug, Serialize)]
pub struct ExclusionsResponse {
    pub characters: Vec<usize>,
    pub ssids: Vec<usize>,
}

/// Result of an exclusion toggle
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub index: usize,
    pub excluded: bool,
}

/// Selection settings update; absent fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateConfigRequest {
    pub mode: Option<String>,
    pub fixed_character_index: Option<usize>,
    pub include_special_ssids: Option<bool>,
    pub respect_exclusions: Option<bool>,
    pub seasonal_filter: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default = "default_upcoming_count")]
    pub count: usize,
}

fn default_upcoming_count() -> usize {
    5
}

// ============================================================================
// Router
// ============================================================================

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/status", get(get_status))
        .route("/api/characters", get(list_characters))
        .route("/api/characters/{index}", get(get_character))
        .route("/api/characters/{index}/toggle", post(toggle_character))
        .route("/api/ssids", get(list_ssids))
        .route("/api/ssids/{index}", get(get_ssid))
        .route("/api/ssids/{index}/toggle", post(toggle_ssid))
        .route("/api/exclusions", get(get_exclusions))
        .route("/api/exclusions", delete(clear_exclusions))
        .route("/api/upcoming", get(get_upcoming))
        .route("/api/config", get(get_config))
        .route("/api/config", post(update_config))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    };
    (StatusCode::OK, Json(ApiResponse::success(response)))
}

/// Today's broadcast, computed without advancing the cycle cursor
async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.lock().await;
    let exclusions = state.exclusions.lock().await;
    let cursor = state.cursor.lock().await;

    let now = Local::now().naive_local();
    let today = now.date();

    let selected = if config.selection.mode == SelectionMode::Cycle {
        // peek, not select: a status poll must not step the rotation
        selection::peek_combined(&config.selection, &state.catalog, &exclusions, &cursor, today)
    } else {
        selection::select_combined(&config.selection, &state.catalog, &exclusions, &cursor, today)
    };

    let ssid = match selected.ssid() {
        Some(special) => special.to_string(),
        None => ssid::resolve_ssid(&config.ssid, &state.catalog),
    };

    let response = StatusResponse {
        date: today.to_string(),
        mode: config.selection.mode.to_string(),
        character: selected.name().map(str::to_string),
        mac: selected.character.map(mac::character_mac),
        ssid,
        is_special_ssid: selected.is_special_ssid(),
        seconds_until_rotation: selection::seconds_until_midnight(now),
    };
    (StatusCode::OK, Json(ApiResponse::success(response)))
}

async fn list_characters(State(state): State<AppState>) -> impl IntoResponse {
    let exclusions = state.exclusions.lock().await;
    let characters: Vec<CharacterResponse> = state
        .catalog
        .characters()
        .iter()
        .enumerate()
        .map(|(i, c)| CharacterResponse::new(i, c, exclusions.is_excluded(i)))
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(characters)))
}

async fn get_character(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    match state.catalog.characters().get(index) {
        Some(character) => {
            let excluded = state.exclusions.lock().await.is_excluded(index);
            let response = CharacterResponse::new(index, character, excluded);
            (StatusCode::OK, Json(ApiResponse::success(response))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no character at index {index}"))),
        )
            .into_response(),
    }
}

async fn toggle_character(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    if index >= state.catalog.characters().len() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no character at index {index}"))),
        )
            .into_response();
    }
    let excluded = state.exclusions.lock().await.toggle(index);
    let response = ToggleResponse { index, excluded };
    (StatusCode::OK, Json(ApiResponse::success(response))).into_response()
}

async fn list_ssids(State(state): State<AppState>) -> impl IntoResponse {
    let exclusions = state.exclusions.lock().await;
    let ssids: Vec<SpecialSsidResponse> = state
        .catalog
        .special_ssids()
        .iter()
        .enumerate()
        .map(|(i, s)| SpecialSsidResponse {
            index: i,
            ssid: s.ssid.clone(),
            character_name: s.character_name.clone(),
            notes: s.notes.clone(),
            active: s.active,
            excluded: exclusions.is_ssid_excluded(i),
        })
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(ssids)))
}

async fn get_ssid(State(state): State<AppState>, Path(index): Path<usize>) -> impl IntoResponse {
    match state.catalog.special_ssids().get(index) {
        Some(special) => {
            let excluded = state.exclusions.lock().await.is_ssid_excluded(index);
            let response = SpecialSsidResponse {
                index,
                ssid: special.ssid.clone(),
                character_name: special.character_name.clone(),
                notes: special.notes.clone(),
                active: special.active,
                excluded,
            };
            (StatusCode::OK, Json(ApiResponse::success(response))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no special SSID at index {index}"))),
        )
            .into_response(),
    }
}

async fn toggle_ssid(State(state): State<AppState>, Path(index): Path<usize>) -> impl IntoResponse {
    if index >= state.catalog.special_ssids().len() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no special SSID at index {index}"))),
        )
            .into_response();
    }
    let excluded = state.exclusions.lock().await.toggle_ssid(index);
    let response = ToggleResponse { index, excluded };
    (StatusCode::OK, Json(ApiResponse::success(response))).into_response()
}

async fn get_exclusions(State(state): State<AppState>) -> impl IntoResponse {
    let exclusions = state.exclusions.lock().await;
    let mut characters: Vec<usize> = exclusions.excluded().into_iter().collect();
    characters.sort_unstable();
    let mut ssids: Vec<usize> = exclusions.excluded_ssids().into_iter().collect();
    ssids.sort_unstable();

    let response = ExclusionsResponse { characters, ssids };
    (StatusCode::OK, Json(ApiResponse::success(response)))
}

async fn clear_exclusions(State(state): State<AppState>) -> impl IntoResponse {
    state.exclusions.lock().await.clear_all();
    let response = ExclusionsResponse {
        characters: Vec::new(),
        ssids: Vec::new(),
    };
    (StatusCode::OK, Json(ApiResponse::success(response)))
}

/// Cycle-order preview; empty outside cycle mode
async fn get_upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> impl IntoResponse {
    // Lock order is config, exclusions, cursor everywhere; keep it that way
    let config = state.config.lock().await;
    let exclusions = state.exclusions.lock().await;
    let cursor = state.cursor.lock().await;
    let count = query.count.min(state.catalog.characters().len().max(1));
    let upcoming: Vec<CharacterResponse> =
        selection::upcoming_characters(&config.selection, &state.catalog, &cursor, count)
            .into_iter()
            .map(|character| {
                let index = state
                    .catalog
                    .characters()
                    .iter()
                    .position(|c| c == character)
                    .unwrap_or(0);
                CharacterResponse::new(index, character, exclusions.is_excluded(index))
            })
            .collect();
    (StatusCode::OK, Json(ApiResponse::success(upcoming)))
}

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.lock().await;
    (StatusCode::OK, Json(ApiResponse::success(config.clone())))
}

/// Update selection settings in place
///
/// Changes apply to the running process only; the config file is untouched.
async fn update_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateConfigRequest>,
) -> impl IntoResponse {
    let mut config = state.config.lock().await;

    if let Some(mode) = &request.mode {
        match SelectionMode::from_id(mode) {
            Some(mode) => config.selection.mode = mode,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(format!("unknown selection mode: {mode}"))),
                )
                    .into_response();
            }
        }
    }
    if let Some(index) = request.fixed_character_index {
        if index >= state.catalog.characters().len() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("no character at index {index}"))),
            )
                .into_response();
        }
        config.selection.fixed_character_index = index;
    }
    if let Some(value) = request.include_special_ssids {
        config.selection.include_special_ssids = value;
    }
    if let Some(value) = request.respect_exclusions {
        config.selection.respect_exclusions = value;
    }
    if let Some(value) = request.seasonal_filter {
        config.selection.seasonal_filter = value;
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(config.selection.clone())),
    )
        .into_response()
}
