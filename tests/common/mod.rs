#![allow(dead_code)]

use kazhutha::game::{Card, Deck, Rank, Suit};

/// `"AS"`, `"10H"`, `"QC"`, `"2D"`.
pub fn card(code: &str) -> Card {
    let (rank, suit) = code.split_at(code.len() - 1);
    let suit = match suit {
        "S" => Suit::Spades,
        "H" => Suit::Hearts,
        "C" => Suit::Clubs,
        "D" => Suit::Diamonds,
        other => panic!("bad suit {other}"),
    };
    let rank = match rank {
        "2" => Rank::Two,
        "3" => Rank::Three,
        "4" => Rank::Four,
        "5" => Rank::Five,
        "6" => Rank::Six,
        "7" => Rank::Seven,
        "8" => Rank::Eight,
        "9" => Rank::Nine,
        "10" => Rank::Ten,
        "J" => Rank::Jack,
        "Q" => Rank::Queen,
        "K" => Rank::King,
        "A" => Rank::Ace,
        other => panic!("bad rank {other}"),
    };
    Card::new(suit, rank)
}

pub fn cards(codes: &str) -> Vec<Card> {
    codes.split_whitespace().map(card).collect()
}

/// Interleave equal hands so a round-robin deal hands seat `i` exactly `hands[i]`.
pub fn deck_from_hands(hands: &[Vec<Card>]) -> Deck {
    let per_seat = hands[0].len();
    assert!(hands.iter().all(|h| h.len() == per_seat), "hands must be equal for an arranged deal");
    let mut order = Vec::with_capacity(52);
    for i in 0..per_seat {
        for hand in hands {
            order.push(hand[i]);
        }
    }
    Deck::from_cards(order).expect("arranged hands must cover the deck")
}

/// Four seats a, b, c, d. `a` holds the ace of spades; `c` has no other spade
/// and `d` no hearts.
pub fn four_seat_hands() -> Vec<Vec<Card>> {
    vec![
        cards("AS 10S 2S 2H 3H 4H 5H 6H 2C 3C 4C 5C 6C"),
        cards("KS 9S 3S 7H 8H 9H 10H 7C 8C 9C 10C 2D 3D"),
        cards("QS JH QH KH AH JC QC KC AC 4D 5D 6D 7D"),
        cards("JS 8S 7S 6S 5S 4S 8D 9D 10D JD QD KD AD"),
    ]
}
