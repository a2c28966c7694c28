use super::rank::Rank;
use super::suit::Suit;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn rank(&self) -> Rank {
        self.rank
    }
    pub fn suit(&self) -> Suit {
        self.suit
    }
}

impl From<(Rank, Suit)> for Card {
    fn from((rank, suit): (Rank, Suit)) -> Self {
        Self { rank, suit }
    }
}

/// u8 isomorphism
/// each card is mapped to its location in a sorted deck 0-51
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        u8::from(c.suit) + u8::from(c.rank) * 4
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self {
            rank: Rank::from(n / 4),
            suit: Suit::from(n % 4),
        }
    }
}

/// u64 isomorphism
/// each card is just one bit turned on
impl From<Card> for u64 {
    fn from(c: Card) -> u64 {
        1 << u8::from(c)
    }
}
impl From<u64> for Card {
    fn from(n: u64) -> Self {
        Self::from(n.trailing_zeros() as u8)
    }
}

/// str isomorphism, e.g. "Th" or "2s"
impl From<&str> for Card {
    fn from(s: &str) -> Self {
        Self {
            rank: Rank::from(&s[0..1]),
            suit: Suit::from(&s[1..2]),
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
