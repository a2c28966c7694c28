use super::Environment;
use super::Observation;
use super::View;
use crate::Position;
use crate::Utility;
use crate::cards::Deck;
use crate::cards::Hand;
use crate::cards::Strength;
use rand::SeedableRng;
use rand::rngs::SmallRng;

pub const CALL: usize = 0;
pub const RAISE: usize = 1;
pub const FOLD: usize = 2;
pub const CHECK: usize = 3;

/// heads-up fixed-limit Texas hold'em. blinds 1/2, four streets,
/// bets of 2 on the small streets and 4 on the big ones, four
/// raises per street. small blind acts first preflop, big blind
/// after the flop.
#[derive(Clone)]
pub struct LimitHoldem {
    rng: SmallRng,
    deck: Deck,
    holes: [Hand; 2],
    board: Hand,
    street: u8,
    raises: u8,
    bets: [u32; 2],
    turn: Position,
    acted: u8,
    history: String,
    folded: Option<Position>,
    done: bool,
}

impl LimitHoldem {
    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(seats == 2, "limit-holdem is heads-up, got {} seats", seats);
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            deck: Deck::default(),
            holes: [Hand::empty(); 2],
            board: Hand::empty(),
            street: 0,
            raises: 0,
            bets: [1, 2],
            turn: 0,
            acted: 0,
            history: String::new(),
            folded: None,
            done: false,
        };
        this.reset();
        Ok(this)
    }

    fn other(&self) -> Position {
        1 - self.turn
    }
    fn diff(&self) -> u32 {
        self.bets[self.other()] - self.bets[self.turn]
    }
    fn size(&self) -> u32 {
        match self.street {
            0 | 1 => 2,
            _ => 4,
        }
    }

    fn next_street(&mut self) {
        self.street += 1;
        if self.street == 4 {
            self.done = true;
        } else {
            let n = if self.street == 1 { 3 } else { 1 };
            self.board = self.board.union(self.deck.deal(n, &mut self.rng));
            self.raises = 0;
            self.acted = 0;
            self.turn = 1;
            self.history.push('/');
        }
    }

    fn settle(&mut self) {
        if self.acted >= 2 && self.diff() == 0 {
            self.next_street();
        } else {
            self.turn = self.other();
        }
    }

    fn winner(&self) -> Option<Position> {
        if let Some(folded) = self.folded {
            return Some(1 - folded);
        }
        let a = Strength::from(self.holes[0].union(self.board));
        let b = Strength::from(self.holes[1].union(self.board));
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl Environment for LimitHoldem {
    fn seats(&self) -> usize {
        2
    }
    fn actions(&self) -> usize {
        4
    }
    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
    fn reset(&mut self) {
        self.deck = Deck::default();
        self.holes = [
            self.deck.deal(2, &mut self.rng),
            self.deck.deal(2, &mut self.rng),
        ];
        self.board = Hand::empty();
        self.street = 0;
        self.raises = 0;
        self.bets = [1, 2];
        self.turn = 0;
        self.acted = 0;
        self.history.clear();
        self.folded = None;
        self.done = false;
    }
    fn over(&self) -> bool {
        self.done
    }
    fn observe(&self) -> Observation {
        assert!(!self.done);
        let mut legal = vec![];
        if self.diff() > 0 {
            legal.push(CALL);
        }
        if self.raises < 4 {
            legal.push(RAISE);
        }
        if self.diff() > 0 {
            legal.push(FOLD);
        } else {
            legal.push(CHECK);
        }
        Observation {
            seat: self.turn,
            key: format!(
                "{}|{}|{}",
                self.holes[self.turn], self.board, self.history
            ),
            legal,
            view: View::Holdem {
                hole: self.holes[self.turn],
                board: self.board,
                to_call: self.diff(),
                pot: self.bets[0] + self.bets[1],
            },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        match action {
            CALL => {
                assert!(self.diff() > 0);
                self.bets[self.turn] = self.bets[self.other()];
                self.acted += 1;
                self.history.push('c');
                self.settle();
            }
            RAISE => {
                assert!(self.raises < 4);
                self.bets[self.turn] = self.bets[self.other()] + self.size();
                self.raises += 1;
                self.acted += 1;
                self.history.push('r');
                self.turn = self.other();
            }
            FOLD => {
                assert!(self.diff() > 0);
                self.history.push('f');
                self.folded = Some(self.turn);
                self.done = true;
            }
            CHECK => {
                assert!(self.diff() == 0);
                self.acted += 1;
                self.history.push('k');
                self.settle();
            }
            _ => panic!("illegal limit-holdem action: {}", action),
        }
    }
    fn payoffs(&self) -> Vec<Utility> {
        assert!(self.done);
        match self.winner() {
            None => vec![0., 0.],
            Some(w) => {
                let chips = self.bets[1 - w] as Utility / 2.;
                let mut payoffs = vec![-chips; 2];
                payoffs[w] = chips;
                payoffs
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_blind_keeps_option() {
        let mut env = LimitHoldem::new(2, 0).unwrap();
        env.apply(CALL); // small blind completes
        assert!(!env.over());
        let obs = env.observe();
        assert_eq!(obs.seat, 1);
        assert!(obs.legal.contains(&CHECK));
        assert!(obs.legal.contains(&RAISE));
    }

    #[test]
    fn four_streets_to_showdown() {
        let mut env = LimitHoldem::new(2, 1).unwrap();
        env.apply(CALL);
        env.apply(CHECK);
        for _ in 0..3 {
            env.apply(CHECK);
            env.apply(CHECK);
        }
        assert!(env.over());
        let payoffs = env.payoffs();
        assert_eq!(payoffs[0] + payoffs[1], 0.);
        assert!(payoffs[0].abs() <= 1.);
    }

    #[test]
    fn board_grows_by_street() {
        let mut env = LimitHoldem::new(2, 2).unwrap();
        env.apply(CALL);
        env.apply(CHECK);
        match env.observe().view {
            View::Holdem { board, .. } => assert_eq!(board.size(), 3),
            _ => unreachable!(),
        }
        env.apply(CHECK);
        env.apply(CHECK);
        match env.observe().view {
            View::Holdem { board, .. } => assert_eq!(board.size(), 4),
            _ => unreachable!(),
        }
    }

    #[test]
    fn raise_cap_enforced() {
        let mut env = LimitHoldem::new(2, 3).unwrap();
        for _ in 0..4 {
            env.apply(RAISE);
        }
        let obs = env.observe();
        assert_eq!(obs.legal, vec![CALL, FOLD]);
    }
}
