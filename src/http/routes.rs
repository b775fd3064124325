//! HTTP routes: create/join a game, game actions, state reads, health.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::game::{Card, JoinKind, StateView};
use crate::room::{RoomError, RoomManager};
use crate::ws;

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RoomManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self { rooms: Arc::new(RoomManager::new()), config: Arc::new(config) }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/game/create", post(create_game))
        .route("/api/game/join", post(join_game))
        .route("/api/game/start", post(start_game))
        .route("/api/game/play", post(play_card))
        .route("/api/game/take-hand", post(take_hand))
        .route("/api/game/play-again", post(play_again))
        .route("/api/game/:game_id", get(game_state))
        .route("/ws/:game_id/:player_name", get(ws::connection::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub rooms: usize,
}

pub async fn healthz(State(state): State<AppState>) -> Json<Health> {
    Json(Health { status: "ok".to_string(), rooms: state.rooms.len() })
}

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub player_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: String,
    pub player_name: String,
}

pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, RoomError> {
    let room = state.rooms.create_room(&req.player_name)?;
    Ok(Json(CreateGameResponse { game_id: room.id().to_string(), player_name: room.host_name() }))
}

/// Body shared by the actions that only name a room and a player.
#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    pub game_id: String,
    pub player_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub success: bool,
    pub game_id: String,
    pub rejoined: bool,
    pub game_state: StateView,
}

pub async fn join_game(
    State(state): State<AppState>,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<JoinResponse>, RoomError> {
    let room = state.rooms.get(&req.game_id)?;
    let joined = room.join(&req.player_name)?;
    Ok(Json(JoinResponse {
        success: true,
        game_id: room.id().to_string(),
        rejoined: joined.kind == JoinKind::Rejoined,
        game_state: joined.view,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub game_state: StateView,
}

impl ActionResponse {
    fn ok(game_state: StateView) -> Json<Self> {
        Json(Self { success: true, game_state })
    }
}

pub async fn start_game(
    State(state): State<AppState>,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<ActionResponse>, RoomError> {
    let room = state.rooms.get(&req.game_id)?;
    Ok(ActionResponse::ok(room.start(req.player_name.trim())?))
}

#[derive(Debug, Deserialize)]
pub struct PlayCardRequest {
    pub game_id: String,
    pub player_name: String,
    pub card: Card,
}

pub async fn play_card(
    State(state): State<AppState>,
    Json(req): Json<PlayCardRequest>,
) -> Result<Json<ActionResponse>, RoomError> {
    let room = state.rooms.get(&req.game_id)?;
    Ok(ActionResponse::ok(room.play(req.player_name.trim(), req.card)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TakeHandResponse {
    pub success: bool,
    pub message: String,
    pub taken_from: String,
    pub game_state: StateView,
}

pub async fn take_hand(
    State(state): State<AppState>,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<TakeHandResponse>, RoomError> {
    let room = state.rooms.get(&req.game_id)?;
    let outcome = room.take_hand(req.player_name.trim())?;
    Ok(Json(TakeHandResponse {
        success: true,
        message: format!("Took {} cards from {}", outcome.card_count, outcome.taken_from),
        taken_from: outcome.taken_from,
        game_state: outcome.view,
    }))
}

pub async fn play_again(
    State(state): State<AppState>,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<ActionResponse>, RoomError> {
    let room = state.rooms.get(&req.game_id)?;
    Ok(ActionResponse::ok(room.play_again(req.player_name.trim())?))
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub player_name: Option<String>,
}

pub async fn game_state(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(query): Query<StateQuery>,
) -> Result<Json<StateView>, RoomError> {
    let room = state.rooms.get(&game_id)?;
    let viewer = query.player_name.as_deref().map(str::trim);
    Ok(Json(room.view(viewer)))
}
