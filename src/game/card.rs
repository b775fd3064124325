//! Cards, the 52-card deck, shuffling and dealing.

use std::collections::HashSet;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::GameError;

pub const DECK_SIZE: usize = 52;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suit { Spades, Hearts, Clubs, Diamonds }

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suit::Spades => "SPADES",
            Suit::Hearts => "HEARTS",
            Suit::Clubs => "CLUBS",
            Suit::Diamonds => "DIAMONDS",
        };
        f.write_str(name)
    }
}

/// Ranks in ascending order, so the derived `Ord` agrees with [`Rank::value`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    #[serde(rename = "2")] Two,
    #[serde(rename = "3")] Three,
    #[serde(rename = "4")] Four,
    #[serde(rename = "5")] Five,
    #[serde(rename = "6")] Six,
    #[serde(rename = "7")] Seven,
    #[serde(rename = "8")] Eight,
    #[serde(rename = "9")] Nine,
    #[serde(rename = "10")] Ten,
    #[serde(rename = "JACK")] Jack,
    #[serde(rename = "QUEEN")] Queen,
    #[serde(rename = "KING")] King,
    #[serde(rename = "ACE")] Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven, Rank::Eight,
        Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    /// Numeric strength, 2 through 14 (ace high).
    pub fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card { pub suit: Suit, pub rank: Rank }

impl Card {
    pub const fn new(suit: Suit, rank: Rank) -> Self { Self { suit, rank } }
}

pub const ACE_OF_SPADES: Card = Card::new(Suit::Spades, Rank::Ace);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// Display order for a hand: grouped by suit, highest rank first.
pub fn sort_for_display(cards: &mut [Card]) {
    cards.sort_by(|a, b| a.suit.cmp(&b.suit).then(b.rank.cmp(&a.rank)));
}

#[derive(Debug, Clone)]
pub struct Deck { cards: Vec<Card> }

impl Deck {
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL { for rank in Rank::ALL { cards.push(Card::new(suit, rank)); } }
        Self { cards }
    }

    pub fn shuffled() -> Self {
        Self::shuffled_with(&mut rand::thread_rng())
    }

    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    /// Accept a pre-arranged deck. It must be exactly the 52 distinct cards.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, GameError> {
        let distinct: HashSet<Card> = cards.iter().copied().collect();
        if cards.len() != DECK_SIZE || distinct.len() != DECK_SIZE {
            return Err(GameError::InvalidDeck);
        }
        Ok(Self { cards })
    }

    pub fn cards(&self) -> &[Card] { &self.cards }

    pub fn len(&self) -> usize { self.cards.len() }

    pub fn is_empty(&self) -> bool { self.cards.is_empty() }

    /// Deal round-robin in seat order until the deck runs out. Earlier seats
    /// receive the remainder, so sizes differ by at most one.
    pub fn deal(self, seats: usize) -> Vec<Vec<Card>> {
        if seats == 0 { return Vec::new(); }
        let mut hands: Vec<Vec<Card>> = (0..seats)
            .map(|_| Vec::with_capacity(DECK_SIZE / seats + 1))
            .collect();
        for (i, card) in self.cards.into_iter().enumerate() {
            hands[i % seats].push(card);
        }
        hands
    }
}
