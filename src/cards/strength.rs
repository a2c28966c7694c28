use super::hand::Hand;
use super::rank::Rank;
use super::suit::Suit;

/// the showdown value of a 5-7 card Hand.
///
/// variants are declared weakest-first so the derived Ord ranks
/// categories before tiebreaks. kicker fields are 13-bit rank masks,
/// which compare correctly as integers since higher ranks occupy
/// higher bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    HighCard(u16),
    OnePair(Rank, u16),
    TwoPair(Rank, Rank, Rank),
    ThreeOAK(Rank, u16),
    Straight(Rank),
    Flush(u16),
    FullHouse(Rank, Rank),
    FourOAK(Rank, Rank),
    StraightFlush(Rank),
}

const WHEEL: u16 = 0b_1000000001111;

impl From<Hand> for Strength {
    fn from(hand: Hand) -> Self {
        None.or_else(|| Self::straight_flush(hand))
            .or_else(|| Self::four_oak(hand))
            .or_else(|| Self::full_house(hand))
            .or_else(|| Self::flush(hand))
            .or_else(|| Self::straight(hand))
            .or_else(|| Self::three_oak(hand))
            .or_else(|| Self::two_pair(hand))
            .or_else(|| Self::one_pair(hand))
            .unwrap_or_else(|| Self::HighCard(top(hand.ranks(), 5)))
    }
}

impl Strength {
    fn straight_flush(hand: Hand) -> Option<Self> {
        Suit::all()
            .iter()
            .map(|suit| hand.of(suit))
            .filter(|ranks| ranks.count_ones() >= 5)
            .find_map(straight)
            .map(Self::StraightFlush)
    }
    fn four_oak(hand: Hand) -> Option<Self> {
        let quad = strongest(hand, 4, None)?;
        let kick = Rank::from(hand.ranks() & !u16::from(quad));
        Some(Self::FourOAK(quad, kick))
    }
    fn full_house(hand: Hand) -> Option<Self> {
        let trip = strongest(hand, 3, None)?;
        let pair = strongest(hand, 2, Some(trip))?;
        Some(Self::FullHouse(trip, pair))
    }
    fn flush(hand: Hand) -> Option<Self> {
        Suit::all()
            .iter()
            .map(|suit| hand.of(suit))
            .find(|ranks| ranks.count_ones() >= 5)
            .map(|ranks| Self::Flush(top(ranks, 5)))
    }
    fn straight(hand: Hand) -> Option<Self> {
        straight(hand.ranks()).map(Self::Straight)
    }
    fn three_oak(hand: Hand) -> Option<Self> {
        let trip = strongest(hand, 3, None)?;
        let kick = top(hand.ranks() & !u16::from(trip), 2);
        Some(Self::ThreeOAK(trip, kick))
    }
    fn two_pair(hand: Hand) -> Option<Self> {
        let hi = strongest(hand, 2, None)?;
        let lo = strongest(hand, 2, Some(hi))?;
        let kick = Rank::from(hand.ranks() & !u16::from(hi) & !u16::from(lo));
        Some(Self::TwoPair(hi, lo, kick))
    }
    fn one_pair(hand: Hand) -> Option<Self> {
        let pair = strongest(hand, 2, None)?;
        let kick = top(hand.ranks() & !u16::from(pair), 3);
        Some(Self::OnePair(pair, kick))
    }
}

/// highest rank held at least n times, excluding an already-used rank
fn strongest(hand: Hand, n: u8, except: Option<Rank>) -> Option<Rank> {
    (0..13u8)
        .rev()
        .map(Rank::from)
        .filter(|rank| Some(*rank) != except)
        .find(|rank| hand.n_of(*rank) >= n)
}

/// highest rank completing five consecutive set bits, wheel included
fn straight(ranks: u16) -> Option<Rank> {
    let mut bits = ranks;
    bits &= bits << 1;
    bits &= bits << 1;
    bits &= bits << 1;
    bits &= bits << 1;
    if bits > 0 {
        Some(Rank::from(bits))
    } else if WHEEL == (WHEEL & ranks) {
        Some(Rank::Five)
    } else {
        None
    }
}

/// keep only the n highest set bits of a rank mask
fn top(mask: u16, n: usize) -> u16 {
    let mut mask = mask;
    while mask.count_ones() as usize > n {
        mask &= mask - 1;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strength(s: &str) -> Strength {
        Strength::from(Hand::from(s))
    }

    #[test]
    fn categories_ordered() {
        let high = strength("2c 4d 6h 8s Tc Qd Ah");
        let pair = strength("2c 2d 6h 8s Tc Qd Ah");
        let trips = strength("2c 2d 2h 8s Tc Qd Ah");
        let straight = strength("2c 3d 4h 5s 6c Qd Ah");
        let flush = strength("2c 4c 6c 8c Tc Qd Ah");
        let boat = strength("2c 2d 2h 8s 8c Qd Ah");
        let quads = strength("2c 2d 2h 2s Tc Qd Ah");
        assert!(high < pair);
        assert!(pair < trips);
        assert!(trips < straight);
        assert!(straight < flush);
        assert!(flush < boat);
        assert!(boat < quads);
    }

    #[test]
    fn wheel_straight() {
        assert_eq!(
            strength("Ac 2d 3h 4s 5c Td Jh"),
            Strength::Straight(Rank::Five)
        );
    }

    #[test]
    fn straight_flush_beats_quads() {
        let sf = strength("5h 6h 7h 8h 9h As Ad");
        let quads = strength("Ac Ad Ah As Kc Qd Jh");
        assert!(quads < sf);
    }

    #[test]
    fn kickers_break_pairs() {
        let strong = strength("Kc Kd Ah Qs Jc 2d 3h");
        let weaker = strength("Kh Ks Ac Qd Tc 2s 3d");
        assert!(weaker < strong);
    }

    #[test]
    fn two_pair_uses_top_two() {
        assert_eq!(
            strength("Ac Ad Kh Ks 2c 2d Qh"),
            Strength::TwoPair(Rank::Ace, Rank::King, Rank::Queen)
        );
    }

    #[test]
    fn seven_card_flush_takes_top_five() {
        let big = strength("2h 4h 6h 8h Th Qh Ah");
        let small = strength("2s 3s 4s 6s 8s Ts Qs");
        assert!(small < big);
    }
}
