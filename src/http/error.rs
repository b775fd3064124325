//! Mapping room and game errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::game::GameError;
use crate::room::RoomError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl RoomError {
    pub fn status(&self) -> StatusCode {
        match self {
            RoomError::NotFound => StatusCode::NOT_FOUND,
            RoomError::Game(GameError::NotHost(_)) => StatusCode::FORBIDDEN,
            RoomError::Game(GameError::NameTaken | GameError::RoomFull | GameError::AlreadyConnected) => {
                StatusCode::CONFLICT
            }
            RoomError::Game(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RoomError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
