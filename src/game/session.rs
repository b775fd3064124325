//! Per-room game state machine: lobby, dealing, rounds, take-hand, play-again.
//!
//! Every mutating method validates through [`rules`] first and only then
//! applies the effect, so a rejected action leaves the session untouched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::card::{Card, Deck, Suit, ACE_OF_SPADES};
use super::error::GameError;
use super::rules::{self, PlayEffect, Resolution, TakeEffect, WinOutcome};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;
pub const MAX_NAME_LEN: usize = 24;

/// Trim a submitted player name and check it is usable.
pub fn normalize_name(raw: &str) -> Result<String, GameError> {
    let name = raw.trim();
    if name.is_empty() { return Err(GameError::EmptyName); }
    if name.chars().count() > MAX_NAME_LEN { return Err(GameError::NameTooLong); }
    Ok(name.to_string())
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase { Lobby, Playing, Finished }

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub hand: Vec<Card>,
    pub is_host: bool,
    pub is_connected: bool,
    pub is_winner: bool,
    pub is_kazhutha: bool,
}

impl Player {
    fn new(name: String, is_host: bool) -> Self {
        Self { name, hand: Vec::new(), is_host, is_connected: false, is_winner: false, is_kazhutha: false }
    }

    pub fn holds_cards(&self) -> bool { !self.hand.is_empty() }

    pub fn holds(&self, card: Card) -> bool { self.hand.contains(&card) }

    pub fn has_suit(&self, suit: Suit) -> bool { self.hand.iter().any(|c| c.suit == suit) }

    fn reset(&mut self) {
        self.hand.clear();
        self.is_winner = false;
        self.is_kazhutha = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Play { pub seat: usize, pub card: Card }

/// The last finished round, kept for display until the next lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRound { pub pile: Vec<Play>, pub winner: usize, pub suit_was_broken: bool }

/// The last take-hand, kept for display until the next lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakenHand { pub cards: Vec<Card>, pub from: usize, pub by: usize }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind { Joined, Rejoined }

#[derive(Debug, Clone)]
pub struct GameSession {
    room_id: String,
    phase: Phase,
    // seat order; the creator always holds seat 0
    players: Vec<Player>,
    current: Option<usize>,
    current_suit: Option<Suit>,
    pile: Vec<Play>,
    // seats holding cards when the current round was led
    round_size: usize,
    opening_lead_played: bool,
    discarded: Vec<Card>,
    dealt: usize,
    winners: Vec<usize>,
    kazhutha: Option<usize>,
    last_round: Option<ResolvedRound>,
    taken_hand: Option<TakenHand>,
    last_action: Option<String>,
}

impl GameSession {
    pub fn new(room_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            phase: Phase::Lobby,
            players: vec![Player::new(host.into(), true)],
            current: None,
            current_suit: None,
            pile: Vec::new(),
            round_size: 0,
            opening_lead_played: false,
            discarded: Vec::new(),
            dealt: 0,
            winners: Vec::new(),
            kazhutha: None,
            last_round: None,
            taken_hand: None,
            last_action: None,
        }
    }

    pub fn room_id(&self) -> &str { &self.room_id }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn players(&self) -> &[Player] { &self.players }
    pub fn host(&self) -> &str { &self.players[0].name }
    pub fn current_seat(&self) -> Option<usize> { self.current }
    pub fn current_suit(&self) -> Option<Suit> { self.current_suit }
    pub fn pile(&self) -> &[Play] { &self.pile }
    pub fn round_size(&self) -> usize { self.round_size }
    pub fn opening_lead_played(&self) -> bool { self.opening_lead_played }
    pub fn discarded(&self) -> &[Card] { &self.discarded }
    pub fn winners(&self) -> &[usize] { &self.winners }
    pub fn last_round(&self) -> Option<&ResolvedRound> { self.last_round.as_ref() }
    pub fn taken_hand(&self) -> Option<&TakenHand> { self.taken_hand.as_ref() }
    pub fn last_action(&self) -> Option<&str> { self.last_action.as_deref() }

    pub fn seat_of(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn is_host(&self, name: &str) -> bool { self.host() == name }

    pub fn current_player(&self) -> Option<&Player> {
        self.current.map(|seat| &self.players[seat])
    }

    pub fn kazhutha(&self) -> Option<&Player> {
        self.kazhutha.map(|seat| &self.players[seat])
    }

    /// A round is open from its lead until it resolves.
    pub fn round_in_progress(&self) -> bool { !self.pile.is_empty() }

    /// The current player, while the game is running and they are offline.
    pub fn waiting_for(&self) -> Option<&Player> {
        if self.phase != Phase::Playing { return None; }
        self.current_player().filter(|p| !p.is_connected)
    }

    pub fn holders(&self) -> usize {
        self.players.iter().filter(|p| p.holds_cards()).count()
    }

    /// Seat a new player in the lobby, or recognise a returning one mid-game.
    /// `name` must already be normalized.
    pub fn join(&mut self, name: &str) -> Result<JoinKind, GameError> {
        match self.phase {
            Phase::Lobby => {
                if self.seat_of(name).is_some() { return Err(GameError::NameTaken); }
                if self.players.len() >= MAX_PLAYERS { return Err(GameError::RoomFull); }
                self.players.push(Player::new(name.to_string(), false));
                Ok(JoinKind::Joined)
            }
            Phase::Playing => match self.player(name) {
                Some(p) if p.is_connected => Err(GameError::AlreadyConnected),
                Some(_) => Ok(JoinKind::Rejoined),
                None => Err(GameError::AlreadyStarted),
            },
            Phase::Finished => Err(GameError::GameFinished),
        }
    }

    /// Give up a guest's seat while the table is still in the lobby. The host
    /// and anyone seated in a dealt game stay put.
    pub fn leave(&mut self, name: &str) -> bool {
        if self.phase != Phase::Lobby || self.is_host(name) { return false; }
        let Some(seat) = self.seat_of(name) else { return false };
        self.players.remove(seat);
        true
    }

    /// Returns false when `name` is not seated here.
    pub fn set_connected(&mut self, name: &str, connected: bool) -> bool {
        match self.players.iter_mut().find(|p| p.name == name) {
            Some(player) => { player.is_connected = connected; true }
            None => false,
        }
    }

    pub fn start(&mut self, by: &str) -> Result<(), GameError> {
        self.start_with_deck(by, Deck::shuffled())
    }

    /// Start with a given deck order. The deal is fully determined by it.
    pub fn start_with_deck(&mut self, by: &str, deck: Deck) -> Result<(), GameError> {
        if !self.is_host(by) { return Err(GameError::NotHost("start the game")); }
        if self.phase != Phase::Lobby { return Err(GameError::AlreadyStarted); }
        if self.players.len() < MIN_PLAYERS { return Err(GameError::NotEnoughPlayers); }

        self.dealt = deck.len();
        let hands = deck.deal(self.players.len());
        for (player, hand) in self.players.iter_mut().zip(hands) {
            player.hand = hand;
        }
        self.current = self.players.iter().position(|p| p.holds(ACE_OF_SPADES));
        self.phase = Phase::Playing;
        self.opening_lead_played = false;
        self.last_action = self.current_player()
            .map(|p| format!("{} leads with the {}", p.name, ACE_OF_SPADES));
        self.debug_check();
        Ok(())
    }

    pub fn play(&mut self, name: &str, card: Card) -> Result<Resolution, GameError> {
        let effect = rules::validate_play(self, name, card)?;
        self.apply_play(effect);
        Ok(effect.resolution)
    }

    pub fn take_hand(&mut self, name: &str) -> Result<TakenHand, GameError> {
        let effect = rules::validate_take_hand(self, name)?;
        Ok(self.apply_take_hand(effect))
    }

    /// Back to the lobby with the same roster, seating and host.
    pub fn play_again(&mut self, by: &str) -> Result<(), GameError> {
        if self.phase != Phase::Finished { return Err(GameError::NotFinished); }
        if !self.is_host(by) { return Err(GameError::NotHost("start a new game")); }
        for player in &mut self.players { player.reset(); }
        self.phase = Phase::Lobby;
        self.current = None;
        self.current_suit = None;
        self.pile.clear();
        self.round_size = 0;
        self.opening_lead_played = false;
        self.discarded.clear();
        self.dealt = 0;
        self.winners.clear();
        self.kazhutha = None;
        self.last_round = None;
        self.taken_hand = None;
        self.last_action = None;
        Ok(())
    }

    fn apply_play(&mut self, effect: PlayEffect) {
        let PlayEffect { seat, card, resolution } = effect;
        if self.pile.is_empty() {
            self.round_size = self.holders();
            self.current_suit = Some(card.suit);
            self.last_round = None;
            self.taken_hand = None;
        }
        self.opening_lead_played = true;

        let hand = &mut self.players[seat].hand;
        if let Some(pos) = hand.iter().position(|c| *c == card) {
            hand.swap_remove(pos);
        }
        self.pile.push(Play { seat, card });
        self.last_action = Some(format!("{} played {card}", self.players[seat].name));

        match resolution {
            Resolution::Continue { next } => self.current = Some(next),
            Resolution::Broken { picker } => {
                let pile = std::mem::take(&mut self.pile);
                self.players[picker].hand.extend(pile.iter().map(|play| play.card));
                self.last_action = Some(format!("{} picks up the pile!", self.players[picker].name));
                self.close_round(pile, picker, true);
            }
            Resolution::Discarded { winner } => {
                let pile = std::mem::take(&mut self.pile);
                self.discarded.extend(pile.iter().map(|play| play.card));
                self.last_action = Some(format!("Cards discarded - {} leads next!", self.players[winner].name));
                self.close_round(pile, winner, false);
            }
        }
        self.debug_check();
    }

    fn close_round(&mut self, pile: Vec<Play>, winner: usize, suit_was_broken: bool) {
        self.current_suit = None;
        self.round_size = 0;
        self.last_round = Some(ResolvedRound { pile, winner, suit_was_broken });
        self.settle(rules::check_win_condition(self));
        if self.phase == Phase::Playing {
            // a winner who just went out hands the lead clockwise
            self.current = if self.players[winner].holds_cards() {
                Some(winner)
            } else {
                rules::next_seat_with_cards(&self.players, winner)
            };
        }
    }

    fn apply_take_hand(&mut self, effect: TakeEffect) -> TakenHand {
        let TakeEffect { taker, target } = effect;
        let cards = std::mem::take(&mut self.players[target].hand);
        self.players[taker].hand.extend_from_slice(&cards);
        self.players[target].is_winner = true;
        self.winners.push(target);

        let taken = TakenHand { cards, from: target, by: taker };
        self.taken_hand = Some(taken.clone());
        self.last_round = None;
        self.last_action = Some(format!(
            "{} took {}'s hand!", self.players[taker].name, self.players[target].name
        ));
        self.settle(rules::check_win_condition(self));
        self.debug_check();
        taken
    }

    fn settle(&mut self, outcome: WinOutcome) {
        for seat in outcome.new_winners {
            self.players[seat].is_winner = true;
            self.winners.push(seat);
        }
        if !outcome.finished { return; }
        self.phase = Phase::Finished;
        self.current = None;
        match outcome.kazhutha {
            Some(seat) => {
                self.players[seat].is_kazhutha = true;
                self.kazhutha = Some(seat);
                self.last_action = Some(format!("{} is the Kazhutha!", self.players[seat].name));
            }
            None => self.last_action = Some("Everyone got rid of their cards!".to_string()),
        }
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) { self.assert_invariants(); }
    }

    /// Panics if a structural invariant is broken. Runs after every applied
    /// mutation in debug builds.
    pub fn assert_invariants(&self) {
        if self.phase == Phase::Lobby {
            assert!(self.players.iter().all(|p| p.hand.is_empty()), "cards held in the lobby");
            assert!(self.pile.is_empty() && self.discarded.is_empty(), "cards in play in the lobby");
            return;
        }

        let mut seen = HashSet::with_capacity(self.dealt);
        let in_play = self.players.iter().flat_map(|p| p.hand.iter())
            .chain(self.pile.iter().map(|play| &play.card))
            .chain(self.discarded.iter());
        for card in in_play {
            assert!(seen.insert(*card), "{card} is in play twice");
        }
        assert_eq!(seen.len(), self.dealt, "cards in play do not add up to the deal");
        assert_eq!(self.round_in_progress(), self.current_suit.is_some(), "led suit out of step with the pile");

        let marked = self.players.iter().filter(|p| p.is_kazhutha).count();
        match self.phase {
            Phase::Playing => {
                assert_eq!(marked, 0, "kazhutha marked before the game ended");
                let Some(current) = self.current_player() else { panic!("no current player while playing") };
                assert!(current.holds_cards(), "current player {} holds no cards", current.name);
            }
            Phase::Finished => {
                assert!(marked <= 1, "more than one kazhutha");
                assert!(self.current.is_none() && self.pile.is_empty(), "finished with a round open");
                for player in &self.players {
                    assert!(player.is_kazhutha || player.is_winner, "{} neither won nor lost", player.name);
                }
            }
            Phase::Lobby => unreachable!(),
        }
    }
}

#[cfg(test)]
impl GameSession {
    /// Mid-game session with explicit hands. Seat 0 hosts; empty hands are
    /// treated as players who already went out.
    pub(crate) fn in_play(hands: Vec<(&str, Vec<Card>)>, current: usize) -> Self {
        let mut session = Self::new("TEST01", hands[0].0);
        session.players = hands
            .into_iter()
            .enumerate()
            .map(|(seat, (name, hand))| Player {
                name: name.to_string(),
                is_winner: hand.is_empty(),
                hand,
                is_host: seat == 0,
                is_connected: true,
                is_kazhutha: false,
            })
            .collect();
        session.winners = (0..session.players.len()).filter(|&s| session.players[s].is_winner).collect();
        session.dealt = session.players.iter().map(|p| p.hand.len()).sum();
        session.phase = Phase::Playing;
        session.current = Some(current);
        session.opening_lead_played = true;
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::Rank;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn c(suit: Suit, rank: Rank) -> Card { Card::new(suit, rank) }

    fn lobby(names: &[&str]) -> GameSession {
        let mut session = GameSession::new("ROOM01", names[0]);
        for name in &names[1..] {
            session.join(name).unwrap();
        }
        session
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(normalize_name("  anu ").unwrap(), "anu");
        assert_eq!(normalize_name("   ").unwrap_err(), GameError::EmptyName);
        assert_eq!(normalize_name(&"x".repeat(MAX_NAME_LEN + 1)).unwrap_err(), GameError::NameTooLong);
    }

    #[test]
    fn lobby_rejects_duplicates_and_the_ninth_player() {
        let mut session = lobby(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        assert_eq!(session.join("b"), Err(GameError::NameTaken));
        assert_eq!(session.join("i"), Err(GameError::RoomFull));
        assert_eq!(session.players().len(), MAX_PLAYERS);

        // names are case-sensitive
        let mut fresh = lobby(&["a"]);
        assert_eq!(fresh.join("A"), Ok(JoinKind::Joined));
    }

    #[test]
    fn guests_leaving_the_lobby_free_their_seat() {
        let mut session = lobby(&["host", "b", "c"]);
        assert!(session.leave("b"));
        assert_eq!(session.players().iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["host", "c"]);
        assert_eq!(session.join("b"), Ok(JoinKind::Joined));
        assert!(!session.leave("host"));
        assert!(!session.leave("nobody"));

        session.start("host").unwrap();
        assert!(!session.leave("c"));
        assert_eq!(session.players().len(), 3);
    }

    #[test]
    fn only_the_host_starts_and_needs_company() {
        let mut solo = lobby(&["host"]);
        assert_eq!(solo.start("host"), Err(GameError::NotEnoughPlayers));

        let mut session = lobby(&["host", "guest"]);
        assert_eq!(session.start("guest"), Err(GameError::NotHost("start the game")));
        assert_eq!(session.phase(), Phase::Lobby);
        session.start("host").unwrap();
        assert_eq!(session.start("host"), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn ace_of_spades_holder_leads_and_must_lead_it() {
        for seed in 0..20 {
            let mut session = lobby(&["a", "b", "c"]);
            session.start_with_deck("a", Deck::shuffled_with(&mut StdRng::seed_from_u64(seed))).unwrap();
            let leader = session.current_player().unwrap().name.clone();
            assert!(session.player(&leader).unwrap().holds(ACE_OF_SPADES));

            let other = *session.player(&leader).unwrap().hand.iter().find(|&&card| card != ACE_OF_SPADES).unwrap();
            assert_eq!(session.play(&leader, other), Err(GameError::MustLeadAceOfSpades));
            session.play(&leader, ACE_OF_SPADES).unwrap();
            assert_eq!(session.current_suit(), Some(Suit::Spades));
        }
    }

    #[test]
    fn joining_mid_game_is_only_a_reconnect() {
        let mut session = lobby(&["a", "b"]);
        session.start("a").unwrap();
        assert_eq!(session.join("z"), Err(GameError::AlreadyStarted));
        assert_eq!(session.join("b"), Ok(JoinKind::Rejoined));
        session.set_connected("b", true);
        assert_eq!(session.join("b"), Err(GameError::AlreadyConnected));
    }

    #[test]
    fn rejected_play_changes_nothing() {
        let mut session = GameSession::in_play(vec![
            ("a", vec![c(Suit::Hearts, Rank::Two), c(Suit::Spades, Rank::Ten)]),
            ("b", vec![c(Suit::Hearts, Rank::Nine), c(Suit::Clubs, Rank::Four)]),
        ], 0);
        session.play("a", c(Suit::Hearts, Rank::Two)).unwrap();
        let before = format!("{session:?}");
        assert_eq!(session.play("b", c(Suit::Clubs, Rank::Four)), Err(GameError::MustFollowSuit(Suit::Hearts)));
        assert_eq!(session.play("a", c(Suit::Spades, Rank::Ten)), Err(GameError::NotYourTurn));
        assert_eq!(format!("{session:?}"), before);
    }

    #[test]
    fn broken_round_hands_the_pile_to_the_top_led_card() {
        let mut session = GameSession::in_play(vec![
            ("a", vec![c(Suit::Spades, Rank::Ten), c(Suit::Hearts, Rank::Two)]),
            ("b", vec![c(Suit::Spades, Rank::King), c(Suit::Clubs, Rank::Two)]),
            ("c", vec![c(Suit::Hearts, Rank::Five), c(Suit::Clubs, Rank::Three)]),
            ("d", vec![c(Suit::Spades, Rank::Two), c(Suit::Clubs, Rank::Four)]),
        ], 0);
        session.play("a", c(Suit::Spades, Rank::Ten)).unwrap();
        session.play("b", c(Suit::Spades, Rank::King)).unwrap();
        let resolution = session.play("c", c(Suit::Hearts, Rank::Five)).unwrap();
        assert_eq!(resolution, Resolution::Broken { picker: 1 });

        assert!(!session.round_in_progress());
        assert_eq!(session.current_suit(), None);
        assert_eq!(session.current_player().unwrap().name, "b");
        assert_eq!(session.players()[1].hand.len(), 4);
        let last = session.last_round().unwrap();
        assert!(last.suit_was_broken);
        assert_eq!(last.pile.len(), 3);
        // d never got to play
        assert_eq!(session.players()[3].hand.len(), 2);
    }

    #[test]
    fn discarded_round_removes_cards_and_winner_leads() {
        let mut session = GameSession::in_play(vec![
            ("a", vec![c(Suit::Clubs, Rank::Ten), c(Suit::Hearts, Rank::Two)]),
            ("b", vec![c(Suit::Clubs, Rank::Queen), c(Suit::Hearts, Rank::Three)]),
            ("c", vec![c(Suit::Clubs, Rank::Two), c(Suit::Hearts, Rank::Four)]),
        ], 0);
        session.play("a", c(Suit::Clubs, Rank::Ten)).unwrap();
        session.play("b", c(Suit::Clubs, Rank::Queen)).unwrap();
        let resolution = session.play("c", c(Suit::Clubs, Rank::Two)).unwrap();
        assert_eq!(resolution, Resolution::Discarded { winner: 1 });
        assert_eq!(session.discarded().len(), 3);
        assert!(session.players().iter().all(|p| p.hand.len() == 1));
        assert_eq!(session.current_player().unwrap().name, "b");
        assert!(!session.last_round().unwrap().suit_was_broken);
    }

    #[test]
    fn winner_who_went_out_passes_the_lead_clockwise() {
        let mut session = GameSession::in_play(vec![
            ("a", vec![c(Suit::Clubs, Rank::Ten), c(Suit::Hearts, Rank::Two)]),
            ("b", vec![c(Suit::Clubs, Rank::Ace)]),
            ("c", vec![c(Suit::Clubs, Rank::Two), c(Suit::Hearts, Rank::Four)]),
        ], 0);
        session.play("a", c(Suit::Clubs, Rank::Ten)).unwrap();
        session.play("b", c(Suit::Clubs, Rank::Ace)).unwrap();
        session.play("c", c(Suit::Clubs, Rank::Two)).unwrap();
        assert!(session.players()[1].is_winner);
        assert_eq!(session.winners(), &[1]);
        assert_eq!(session.current_player().unwrap().name, "c");
    }

    #[test]
    fn emptied_hand_mid_round_can_still_pick_up_the_pile() {
        let mut session = GameSession::in_play(vec![
            ("a", vec![c(Suit::Spades, Rank::Ace)]),
            ("b", vec![c(Suit::Spades, Rank::Two), c(Suit::Hearts, Rank::Two)]),
            ("c", vec![c(Suit::Hearts, Rank::Three), c(Suit::Hearts, Rank::Four)]),
        ], 0);
        session.play("a", c(Suit::Spades, Rank::Ace)).unwrap();
        assert!(!session.players()[0].is_winner);
        session.play("b", c(Suit::Spades, Rank::Two)).unwrap();
        session.play("c", c(Suit::Hearts, Rank::Three)).unwrap();
        assert_eq!(session.players()[0].hand.len(), 3);
        assert!(!session.players()[0].is_winner);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.current_player().unwrap().name, "a");
    }

    #[test]
    fn last_holder_is_the_kazhutha() {
        let mut session = GameSession::in_play(vec![
            ("a", vec![c(Suit::Diamonds, Rank::Nine)]),
            ("b", vec![c(Suit::Diamonds, Rank::Two), c(Suit::Clubs, Rank::Two)]),
        ], 0);
        session.play("a", c(Suit::Diamonds, Rank::Nine)).unwrap();
        session.play("b", c(Suit::Diamonds, Rank::Two)).unwrap();
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.kazhutha().unwrap().name, "b");
        assert!(session.players()[0].is_winner);
        assert_eq!(session.current_seat(), None);
        assert_eq!(session.play("b", c(Suit::Clubs, Rank::Two)), Err(GameError::GameFinished));
    }

    #[test]
    fn simultaneous_exit_finishes_without_a_kazhutha() {
        let mut session = GameSession::in_play(vec![
            ("a", vec![c(Suit::Diamonds, Rank::Nine)]),
            ("b", vec![c(Suit::Diamonds, Rank::Two)]),
        ], 0);
        session.play("a", c(Suit::Diamonds, Rank::Nine)).unwrap();
        session.play("b", c(Suit::Diamonds, Rank::Two)).unwrap();
        assert_eq!(session.phase(), Phase::Finished);
        assert!(session.kazhutha().is_none());
        assert!(session.players().iter().all(|p| p.is_winner));
    }

    #[test]
    fn take_hand_crowns_the_neighbour_and_keeps_the_turn() {
        let mut session = GameSession::in_play(vec![
            ("x", vec![c(Suit::Hearts, Rank::Two)]),
            ("y", vec![c(Suit::Clubs, Rank::Two), c(Suit::Clubs, Rank::Three)]),
            ("z", vec![c(Suit::Spades, Rank::Two)]),
        ], 0);
        let taken = session.take_hand("x").unwrap();
        assert_eq!((taken.by, taken.from, taken.cards.len()), (0, 1, 2));
        assert!(session.players()[1].is_winner);
        assert!(session.players()[1].hand.is_empty());
        assert_eq!(session.players()[0].hand.len(), 3);
        assert_eq!(session.current_seat(), Some(0));
        assert_eq!(session.phase(), Phase::Playing);

        // chained: the next holder to the left is now z, and taking it ends the game
        session.take_hand("x").unwrap();
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.kazhutha().unwrap().name, "x");
        assert_eq!(session.winners(), &[1, 2]);
    }

    #[test]
    fn play_again_keeps_roster_and_clears_the_table() {
        let mut session = GameSession::in_play(vec![
            ("host", vec![c(Suit::Diamonds, Rank::Nine)]),
            ("b", vec![c(Suit::Diamonds, Rank::Two), c(Suit::Clubs, Rank::Two)]),
        ], 0);
        assert_eq!(session.play_again("host"), Err(GameError::NotFinished));
        session.play("host", c(Suit::Diamonds, Rank::Nine)).unwrap();
        session.play("b", c(Suit::Diamonds, Rank::Two)).unwrap();
        assert_eq!(session.play_again("b"), Err(GameError::NotHost("start a new game")));

        session.play_again("host").unwrap();
        assert_eq!(session.phase(), Phase::Lobby);
        let names: Vec<&str> = session.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["host", "b"]);
        assert!(session.players().iter().all(|p| p.hand.is_empty() && !p.is_winner && !p.is_kazhutha));
        assert!(session.players()[0].is_host);
        assert!(session.kazhutha().is_none() && session.last_round().is_none());
        session.assert_invariants();
        session.start("host").unwrap();
    }

    #[test]
    fn waiting_for_reports_an_offline_current_player() {
        let mut session = lobby(&["a", "b"]);
        session.start("a").unwrap();
        let current = session.current_player().unwrap().name.clone();
        assert_eq!(session.waiting_for().map(|p| p.name.as_str()), Some(current.as_str()));
        session.set_connected(&current, true);
        assert!(session.waiting_for().is_none());
    }
}
