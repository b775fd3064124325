//! Kazhutha rules and per-room game state.

pub mod card;
pub mod error;
pub mod rules;
pub mod session;
pub mod view;

pub use card::{Card, Deck, Rank, Suit, ACE_OF_SPADES, DECK_SIZE};
pub use error::GameError;
pub use session::{
    normalize_name, GameSession, JoinKind, Phase, Play, Player, ResolvedRound, TakenHand, MAX_NAME_LEN,
    MAX_PLAYERS, MIN_PLAYERS,
};
pub use view::{PlayView, PlayerView, StateView};
