//! Validation failures. None of these leave a session partially mutated.

use super::card::Suit;
use super::session::{MAX_NAME_LEN, MIN_PLAYERS};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("player name required")]
    EmptyName,
    #[error("player name longer than {} characters", MAX_NAME_LEN)]
    NameTooLong,
    #[error("name already taken")]
    NameTaken,
    #[error("room is full")]
    RoomFull,
    #[error("{0} is not part of this game")]
    UnknownPlayer(String),
    #[error("player with this name is already connected")]
    AlreadyConnected,
    #[error("only the host can {0}")]
    NotHost(&'static str),
    #[error("need at least {} players", MIN_PLAYERS)]
    NotEnoughPlayers,
    #[error("game already started")]
    AlreadyStarted,
    #[error("game not in progress")]
    NotInProgress,
    #[error("game is finished")]
    GameFinished,
    #[error("game is not finished")]
    NotFinished,
    #[error("not your turn")]
    NotYourTurn,
    #[error("you are not an active player")]
    NotActive,
    #[error("card not in your hand")]
    CardNotInHand,
    #[error("first card must be the ace of spades")]
    MustLeadAceOfSpades,
    #[error("you must play a {0}")]
    MustFollowSuit(Suit),
    #[error("cannot take a hand during a round")]
    RoundInProgress,
    #[error("no player to take from")]
    NoPlayerOnLeft,
    #[error("deck must hold the 52 distinct cards")]
    InvalidDeck,
}
