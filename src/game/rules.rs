//! Rule decisions. Nothing here mutates a session; [`GameSession`] applies
//! the effects these functions return.

use super::card::{Card, Suit, ACE_OF_SPADES};
use super::error::GameError;
use super::session::{GameSession, Phase, Play, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The round carries on with `next`.
    Continue { next: usize },
    /// Suit was broken. `picker` held the top led card, takes the pile and leads.
    Broken { picker: usize },
    /// Everyone followed. The pile leaves play and `winner` leads.
    Discarded { winner: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayEffect { pub seat: usize, pub card: Card, pub resolution: Resolution }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeEffect { pub taker: usize, pub target: usize }

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinOutcome {
    pub new_winners: Vec<usize>,
    pub kazhutha: Option<usize>,
    pub finished: bool,
}

fn ensure_playing(session: &GameSession) -> Result<(), GameError> {
    match session.phase() {
        Phase::Playing => Ok(()),
        Phase::Lobby => Err(GameError::NotInProgress),
        Phase::Finished => Err(GameError::GameFinished),
    }
}

fn seat_for(session: &GameSession, player: &str) -> Result<usize, GameError> {
    session.seat_of(player).ok_or_else(|| GameError::UnknownPlayer(player.to_string()))
}

pub fn validate_play(session: &GameSession, player: &str, card: Card) -> Result<PlayEffect, GameError> {
    ensure_playing(session)?;
    let seat = seat_for(session, player)?;
    if session.current_seat() != Some(seat) { return Err(GameError::NotYourTurn); }
    let hand = &session.players()[seat];
    if !hand.holds(card) { return Err(GameError::CardNotInHand); }
    if !session.opening_lead_played() && card != ACE_OF_SPADES {
        return Err(GameError::MustLeadAceOfSpades);
    }
    if let Some(led) = session.current_suit() {
        if card.suit != led && hand.has_suit(led) {
            return Err(GameError::MustFollowSuit(led));
        }
    }
    Ok(PlayEffect { seat, card, resolution: resolve(session, seat, card) })
}

fn resolve(session: &GameSession, seat: usize, card: Card) -> Resolution {
    let Some(led) = session.current_suit() else {
        return continue_after(session.players(), seat);
    };
    let top = top_play(session.pile(), led);
    if card.suit != led {
        return Resolution::Broken { picker: top.map_or(seat, |play| play.seat) };
    }
    if session.pile().len() + 1 >= session.round_size() {
        let winner = match top {
            Some(best) if best.card.rank > card.rank => best.seat,
            _ => seat,
        };
        return Resolution::Discarded { winner };
    }
    continue_after(session.players(), seat)
}

fn continue_after(players: &[Player], seat: usize) -> Resolution {
    // at least two seats hold cards while a game runs
    Resolution::Continue { next: next_seat_with_cards(players, seat).unwrap_or(seat) }
}

/// Highest card of `suit` on the pile.
pub fn top_play(pile: &[Play], suit: Suit) -> Option<&Play> {
    pile.iter().filter(|play| play.card.suit == suit).max_by_key(|play| play.card.rank)
}

/// First seat clockwise from `from` (exclusive) still holding cards.
pub fn next_seat_with_cards(players: &[Player], from: usize) -> Option<usize> {
    let n = players.len();
    (1..n)
        .map(|step| (from + step) % n)
        .find(|&seat| players[seat].holds_cards() && !players[seat].is_winner)
}

/// Cards `player` could legally play right now.
pub fn legal_plays(session: &GameSession, player: &str) -> Vec<Card> {
    let Some(seat) = session.seat_of(player) else { return Vec::new() };
    session.players()[seat]
        .hand
        .iter()
        .copied()
        .filter(|&card| validate_play(session, player, card).is_ok())
        .collect()
}

pub fn validate_take_hand(session: &GameSession, player: &str) -> Result<TakeEffect, GameError> {
    ensure_playing(session)?;
    let taker = seat_for(session, player)?;
    if session.round_in_progress() { return Err(GameError::RoundInProgress); }
    if !session.players()[taker].holds_cards() { return Err(GameError::NotActive); }
    if session.current_seat() != Some(taker) { return Err(GameError::NotYourTurn); }
    let target = next_seat_with_cards(session.players(), taker).ok_or(GameError::NoPlayerOnLeft)?;
    Ok(TakeEffect { taker, target })
}

/// The seat whose hand `player` may take right now, if any.
pub fn can_take_from_left(session: &GameSession, player: &str) -> Option<usize> {
    validate_take_hand(session, player).ok().map(|effect| effect.target)
}

/// Mark everyone who has run out, and end the game once at most one seat
/// still holds cards. Only meaningful between rounds.
pub fn check_win_condition(session: &GameSession) -> WinOutcome {
    let players = session.players();
    let new_winners = players
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.holds_cards() && !p.is_winner)
        .map(|(seat, _)| seat)
        .collect();
    let holders: Vec<usize> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.holds_cards())
        .map(|(seat, _)| seat)
        .collect();
    let (finished, kazhutha) = match holders.as_slice() {
        [] => (true, None),
        [last] => (true, Some(*last)),
        _ => (false, None),
    };
    WinOutcome { new_winners, kazhutha, finished }
}
