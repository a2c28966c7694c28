use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;

/// a set of Cards as a 52-bit bitset.
///
/// the bit at position (rank * 4 + suit) encodes membership,
/// so union, intersection, and removal are single instructions.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Hand(u64);

impl Hand {
    pub const fn empty() -> Self {
        Self(0)
    }
    pub const fn full() -> Self {
        Self((1 << 52) - 1)
    }
    pub fn size(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn contains(&self, card: Card) -> bool {
        self.0 & u64::from(card) != 0
    }
    pub fn add(self, card: Card) -> Self {
        Self(self.0 | u64::from(card))
    }
    pub fn remove(self, card: Card) -> Self {
        Self(self.0 & !u64::from(card))
    }
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
    /// the 13-bit rank profile of the cards in the given suit
    pub fn of(&self, suit: &Suit) -> u16 {
        let mut ranks = 0u16;
        let mut bits = self.0 >> u8::from(*suit);
        let mut rank = 0;
        while bits != 0 {
            if bits & 1 != 0 {
                ranks |= 1 << rank;
            }
            bits >>= 4;
            rank += 1;
        }
        ranks
    }
    /// the 13-bit union of rank profiles across all suits
    pub fn ranks(&self) -> u16 {
        Suit::all().iter().fold(0, |acc, s| acc | self.of(s))
    }
    /// how many cards of the given rank.
    /// named to stay clear of Iterator::count, which wins method
    /// resolution over an inherent &self method of the same name
    pub fn n_of(&self, rank: Rank) -> u8 {
        let nibble = (self.0 >> (u8::from(rank) * 4)) & 0xF;
        nibble.count_ones() as u8
    }
}

impl From<Hand> for u64 {
    fn from(hand: Hand) -> Self {
        hand.0
    }
}
impl From<u64> for Hand {
    fn from(bits: u64) -> Self {
        Self(bits & ((1 << 52) - 1))
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<T: IntoIterator<Item = Card>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), Self::add)
    }
}

impl From<&str> for Hand {
    fn from(s: &str) -> Self {
        s.split_whitespace().map(Card::from).collect()
    }
}

impl Iterator for Hand {
    type Item = Card;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let card = Card::from(self.0.trailing_zeros() as u8);
            self.0 &= self.0 - 1;
            Some(card)
        }
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in *self {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u64() {
        let hand = Hand::from("Jc Ts 2c Js");
        assert_eq!(hand, Hand::from(u64::from(hand)));
    }

    #[test]
    fn card_iteration() {
        let mut iter = Hand::from("Jc Ts 2c Js").into_iter();
        assert_eq!(iter.next(), Some(Card::from("2c")));
        assert_eq!(iter.next(), Some(Card::from("Ts")));
        assert_eq!(iter.next(), Some(Card::from("Jc")));
        assert_eq!(iter.next(), Some(Card::from("Js")));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn ranks_in_suit() {
        let hand = Hand::from("2c 3d 4h 5s 6c 7d 8h 9s");
        assert_eq!(hand.of(&Suit::Club), 0b_0000000010001); // 2c 6c
        assert_eq!(hand.of(&Suit::Diamond), 0b_0000000100010); // 3d 7d
        assert_eq!(hand.of(&Suit::Heart), 0b_0000001000100); // 4h 8h
        assert_eq!(hand.of(&Suit::Spade), 0b_0000010001000); // 5s 9s
    }

    #[test]
    fn rank_counts() {
        let hand = Hand::from("Jc Jd Jh 2s");
        assert_eq!(hand.n_of(Rank::Jack), 3);
        assert_eq!(hand.n_of(Rank::Two), 1);
        assert_eq!(hand.n_of(Rank::Ace), 0);
        // the bare method stays the iterator's
        assert_eq!(hand.count(), 4);
    }
}
