//! Messages pushed to subscribers, and what clients send back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::{Card, GameSession, StateView};

/// What happened in a room. Paired with a snapshot in [`RoomEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Connected,
    PlayerJoined { player_name: String },
    PlayerReconnected { player_name: String },
    PlayerDisconnected { player_name: String },
    GameStarted,
    CardPlayed { player: String, card: Card },
    HandTaken { player: String, taken_from: String },
    GameReset,
    HostLeft { player_name: String },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::PlayerJoined { .. } => "player_joined",
            EventKind::PlayerReconnected { .. } => "player_reconnected",
            EventKind::PlayerDisconnected { .. } => "player_disconnected",
            EventKind::GameStarted => "game_started",
            EventKind::CardPlayed { .. } => "card_played",
            EventKind::HandTaken { .. } => "hand_taken",
            EventKind::GameReset => "game_reset",
            EventKind::HostLeft { .. } => "host_left",
        }
    }
}

/// One mutation as every subscriber will see it. The snapshot is taken under
/// the room's write lock; each recipient's view is rendered from it later.
#[derive(Debug)]
pub struct RoomEvent {
    pub kind: EventKind,
    snapshot: GameSession,
}

impl RoomEvent {
    pub fn new(kind: EventKind, session: &GameSession) -> Arc<Self> {
        Arc::new(Self { kind, snapshot: session.clone() })
    }

    /// The message `recipient` receives, with their own hand filled in.
    pub fn render(&self, recipient: &str) -> ServerMessage {
        let state = || self.snapshot.view_for(Some(recipient));
        match &self.kind {
            EventKind::Connected => ServerMessage::Connected { game_state: state() },
            EventKind::PlayerJoined { player_name } => {
                ServerMessage::PlayerJoined { player_name: player_name.clone(), game_state: state() }
            }
            EventKind::PlayerReconnected { player_name } => {
                ServerMessage::PlayerReconnected { player_name: player_name.clone(), game_state: state() }
            }
            EventKind::PlayerDisconnected { player_name } => {
                ServerMessage::PlayerDisconnected { player_name: player_name.clone(), game_state: state() }
            }
            EventKind::GameStarted => ServerMessage::GameStarted { game_state: state() },
            EventKind::CardPlayed { player, card } => {
                ServerMessage::CardPlayed { player: player.clone(), card: *card, game_state: state() }
            }
            EventKind::HandTaken { player, taken_from } => ServerMessage::HandTaken {
                player: player.clone(),
                taken_from: taken_from.clone(),
                game_state: state(),
            },
            EventKind::GameReset => ServerMessage::GameReset { game_state: state() },
            EventKind::HostLeft { player_name } => ServerMessage::HostLeft { player_name: player_name.clone() },
        }
    }
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected { game_state: StateView },
    PlayerJoined { player_name: String, game_state: StateView },
    PlayerReconnected { player_name: String, game_state: StateView },
    PlayerDisconnected { player_name: String, game_state: StateView },
    GameStarted { game_state: StateView },
    CardPlayed { player: String, card: Card, game_state: StateView },
    HandTaken { player: String, taken_from: String, game_state: StateView },
    GameReset { game_state: StateView },
    HostLeft { player_name: String },
    Ping,
}

impl ServerMessage {
    pub fn game_state(&self) -> Option<&StateView> {
        match self {
            ServerMessage::Connected { game_state }
            | ServerMessage::PlayerJoined { game_state, .. }
            | ServerMessage::PlayerReconnected { game_state, .. }
            | ServerMessage::PlayerDisconnected { game_state, .. }
            | ServerMessage::GameStarted { game_state }
            | ServerMessage::CardPlayed { game_state, .. }
            | ServerMessage::HandTaken { game_state, .. }
            | ServerMessage::GameReset { game_state } => Some(game_state),
            ServerMessage::HostLeft { .. } | ServerMessage::Ping => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Pong,
}

impl ClientMessage {
    /// Accepts `{"type":"pong"}` and the bare text `pong`.
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim().eq_ignore_ascii_case("pong") {
            return Some(ClientMessage::Pong);
        }
        serde_json::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Deck;

    #[test]
    fn each_recipient_sees_only_their_hand() {
        let mut session = GameSession::new("ROOM01", "a");
        session.join("b").unwrap();
        session.start_with_deck("a", Deck::ordered()).unwrap();
        let event = RoomEvent::new(EventKind::GameStarted, &session);

        let for_a = event.render("a");
        let for_b = event.render("b");
        let hand_a = for_a.game_state().unwrap().your_hand.clone().unwrap();
        let hand_b = for_b.game_state().unwrap().your_hand.clone().unwrap();
        assert_eq!(hand_a.len() + hand_b.len(), 52);
        assert!(hand_a.iter().all(|card| !hand_b.contains(card)));
    }

    #[test]
    fn wire_shape_is_tagged() {
        let session = GameSession::new("ROOM01", "a");
        let event = RoomEvent::new(EventKind::PlayerJoined { player_name: "b".into() }, &session);
        let json = serde_json::to_value(event.render("a")).unwrap();
        assert_eq!(json["type"], "player_joined");
        assert_eq!(json["player_name"], "b");
        assert_eq!(json["game_state"]["game_id"], "ROOM01");
        assert_eq!(serde_json::to_value(ServerMessage::Ping).unwrap(), serde_json::json!({"type": "ping"}));
    }

    #[test]
    fn pong_in_either_form() {
        assert_eq!(ClientMessage::parse("pong"), Some(ClientMessage::Pong));
        assert_eq!(ClientMessage::parse(r#"{"type":"pong"}"#), Some(ClientMessage::Pong));
        assert_eq!(ClientMessage::parse(r#"{"type":"play"}"#), None);
    }
}
