//! Per-viewer snapshot of a session, as sent over HTTP and WebSocket.

use serde::{Deserialize, Serialize};

use super::card::{sort_for_display, Card, Suit};
use super::rules;
use super::session::{GameSession, Phase, Play};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub name: String,
    pub card_count: usize,
    pub is_host: bool,
    pub is_active: bool,
    pub is_winner: bool,
    pub is_kazhutha: bool,
    pub is_connected: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayView {
    pub player: String,
    pub card: Card,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StateView {
    pub game_id: String,
    pub players: Vec<PlayerView>,
    pub player_order: Vec<String>,
    pub active_players: Vec<String>,
    pub current_player: Option<String>,
    pub current_suit: Option<Suit>,
    pub current_pile: Vec<PlayView>,
    pub game_state: Phase,
    pub kazhutha: Option<String>,
    pub winners: Vec<String>,
    pub last_action: Option<String>,
    pub can_take_from_left: Option<String>,
    pub round_in_progress: bool,
    pub discarded_count: usize,
    pub resolved_pile: Vec<PlayView>,
    pub resolved_winner: Option<String>,
    pub suit_was_broken: bool,
    pub taken_hand_cards: Vec<Card>,
    pub taken_hand_from: Option<String>,
    pub taken_hand_by: Option<String>,
    pub waiting_for_player: Option<String>,
    /// Only present when the snapshot was built for a seated player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub your_hand: Option<Vec<Card>>,
}

impl GameSession {
    /// Build the snapshot `viewer` is allowed to see. Other players' hands
    /// only appear as counts.
    pub fn view_for(&self, viewer: Option<&str>) -> StateView {
        let name_of = |seat: usize| self.players()[seat].name.clone();
        let plays = |pile: &[Play]| -> Vec<PlayView> {
            pile.iter().map(|play| PlayView { player: name_of(play.seat), card: play.card }).collect()
        };
        let running = self.phase() != Phase::Lobby;

        let players = self.players().iter().map(|p| PlayerView {
            name: p.name.clone(),
            card_count: p.hand.len(),
            is_host: p.is_host,
            is_active: running && p.holds_cards() && !p.is_winner,
            is_winner: p.is_winner,
            is_kazhutha: p.is_kazhutha,
            is_connected: p.is_connected,
        }).collect::<Vec<_>>();
        let active_players = players.iter().filter(|p| p.is_active).map(|p| p.name.clone()).collect();

        let your_hand = viewer.and_then(|name| self.player(name)).map(|p| {
            let mut hand = p.hand.clone();
            sort_for_display(&mut hand);
            hand
        });
        let can_take_from_left = viewer
            .and_then(|name| rules::can_take_from_left(self, name))
            .map(name_of);
        let last_round = self.last_round();
        let taken = self.taken_hand();

        StateView {
            game_id: self.room_id().to_string(),
            player_order: self.players().iter().map(|p| p.name.clone()).collect(),
            players,
            active_players,
            current_player: self.current_seat().map(name_of),
            current_suit: self.current_suit(),
            current_pile: plays(self.pile()),
            game_state: self.phase(),
            kazhutha: self.kazhutha().map(|p| p.name.clone()),
            winners: self.winners().iter().map(|&seat| name_of(seat)).collect(),
            last_action: self.last_action().map(str::to_string),
            can_take_from_left,
            round_in_progress: self.round_in_progress(),
            discarded_count: self.discarded().len(),
            resolved_pile: last_round.map(|r| plays(&r.pile)).unwrap_or_default(),
            resolved_winner: last_round.map(|r| name_of(r.winner)),
            suit_was_broken: last_round.is_some_and(|r| r.suit_was_broken),
            taken_hand_cards: taken.map(|t| t.cards.clone()).unwrap_or_default(),
            taken_hand_from: taken.map(|t| name_of(t.from)),
            taken_hand_by: taken.map(|t| name_of(t.by)),
            waiting_for_player: self.waiting_for().map(|p| p.name.clone()),
            your_hand,
        }
    }
}
