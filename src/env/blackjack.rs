use super::Environment;
use super::Observation;
use super::View;
use crate::Utility;
use crate::cards::Card;
use crate::cards::Deck;
use crate::cards::Rank;
use rand::SeedableRng;
use rand::rngs::SmallRng;

pub const HIT: usize = 0;
pub const STAND: usize = 1;

/// each seat plays an independent hand against the house.
/// seats act in position order, then the dealer draws to 17.
#[derive(Clone)]
pub struct Blackjack {
    rng: SmallRng,
    seats: usize,
    deck: Deck,
    hands: Vec<Vec<Card>>,
    dealer: Vec<Card>,
    turn: usize,
    done: bool,
}

impl Blackjack {
    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (1..=7).contains(&seats),
            "blackjack seats 1..=7, got {}",
            seats
        );
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            seats,
            deck: Deck::default(),
            hands: vec![],
            dealer: vec![],
            turn: 0,
            done: false,
        };
        this.reset();
        Ok(this)
    }

    fn draw(&mut self) -> Card {
        if self.deck.size() == 0 {
            self.deck = Deck::default();
        }
        self.deck.draw(&mut self.rng)
    }

    /// best total counting one ace high when it fits. aces enter
    /// the hard sum at one, then a single promotion to eleven
    fn total(hand: &[Card]) -> (u8, bool) {
        let hard = hand
            .iter()
            .map(|c| match c.rank() {
                Rank::Ace => 1,
                rank => rank.pips().min(10),
            })
            .sum::<u8>();
        let aces = hand.iter().any(|c| c.rank() == Rank::Ace);
        if aces && hard + 10 <= 21 {
            (hard + 10, true)
        } else {
            (hard, false)
        }
    }

    fn house(&mut self) {
        while Self::total(&self.dealer).0 < 17 {
            let card = self.draw();
            self.dealer.push(card);
        }
        self.done = true;
    }

    fn advance(&mut self) {
        self.turn += 1;
        if self.turn == self.seats {
            self.house();
        }
    }
}

impl Environment for Blackjack {
    fn seats(&self) -> usize {
        self.seats
    }
    fn actions(&self) -> usize {
        2
    }
    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
    fn reset(&mut self) {
        self.deck = Deck::default();
        self.hands = (0..self.seats)
            .map(|_| vec![self.deck.draw(&mut self.rng), self.deck.draw(&mut self.rng)])
            .collect();
        self.dealer = vec![self.deck.draw(&mut self.rng), self.deck.draw(&mut self.rng)];
        self.turn = 0;
        self.done = false;
    }
    fn over(&self) -> bool {
        self.done
    }
    fn observe(&self) -> Observation {
        assert!(!self.done);
        let (total, soft) = Self::total(&self.hands[self.turn]);
        let upcard = self.dealer[0].rank().pips().min(11);
        Observation {
            seat: self.turn,
            key: format!("{}{}|{}", total, if soft { "s" } else { "h" }, upcard),
            legal: vec![HIT, STAND],
            view: View::Blackjack {
                total,
                soft,
                upcard,
            },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        match action {
            HIT => {
                let card = self.draw();
                self.hands[self.turn].push(card);
                if Self::total(&self.hands[self.turn]).0 > 21 {
                    self.advance();
                }
            }
            STAND => self.advance(),
            _ => panic!("illegal blackjack action: {}", action),
        }
    }
    fn payoffs(&self) -> Vec<Utility> {
        assert!(self.done);
        let house = Self::total(&self.dealer).0;
        self.hands
            .iter()
            .map(|hand| Self::total(hand).0)
            .map(|mine| {
                if mine > 21 {
                    -1.
                } else if house > 21 || mine > house {
                    1.
                } else if mine == house {
                    0.
                } else {
                    -1.
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stand_everywhere_settles() {
        let mut env = Blackjack::new(3, 0).unwrap();
        while !env.over() {
            env.apply(STAND);
        }
        let payoffs = env.payoffs();
        assert_eq!(payoffs.len(), 3);
        assert!(payoffs.iter().all(|p| [-1., 0., 1.].contains(p)));
    }

    #[test]
    fn hitting_forever_busts() {
        let mut env = Blackjack::new(1, 1).unwrap();
        while !env.over() {
            env.apply(HIT);
        }
        assert_eq!(env.payoffs(), vec![-1.]);
    }

    #[test]
    fn soft_totals_count_ace_high() {
        let (total, soft) = Blackjack::total(&[Card::from("Ah"), Card::from("6c")]);
        assert_eq!(total, 17);
        assert!(soft);
        let (total, soft) =
            Blackjack::total(&[Card::from("Ah"), Card::from("6c"), Card::from("9d")]);
        assert_eq!(total, 16);
        assert!(!soft);
    }

    #[test]
    fn only_one_ace_promotes() {
        let (total, soft) = Blackjack::total(&[Card::from("Ah"), Card::from("Ad")]);
        assert_eq!(total, 12);
        assert!(soft);
        let (total, soft) = Blackjack::total(&[
            Card::from("Ah"),
            Card::from("Ad"),
            Card::from("Td"),
            Card::from("9c"),
        ]);
        assert_eq!(total, 21);
        assert!(!soft);
    }
}
