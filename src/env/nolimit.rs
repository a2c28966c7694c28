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

pub const FOLD: usize = 0;
pub const CHECK_CALL: usize = 1;
pub const RAISE_HALF: usize = 2;
pub const RAISE_POT: usize = 3;
pub const ALL_IN: usize = 4;

/// starting stack in chips (50 big blinds)
const STACK: u32 = 100;

/// heads-up no-limit Texas hold'em with a discretized action set:
/// fold, check/call, half-pot raise, pot raise, all-in. equal
/// starting stacks keep every call exactly matchable.
#[derive(Clone)]
pub struct NoLimitHoldem {
    rng: SmallRng,
    deck: Deck,
    holes: [Hand; 2],
    board: Hand,
    street: u8,
    bets: [u32; 2],
    turn: Position,
    acted: u8,
    history: String,
    folded: Option<Position>,
    done: bool,
}

impl NoLimitHoldem {
    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            seats == 2,
            "no-limit-holdem is heads-up, got {} seats",
            seats
        );
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            deck: Deck::default(),
            holes: [Hand::empty(); 2],
            board: Hand::empty(),
            street: 0,
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
    fn pot(&self) -> u32 {
        self.bets[0] + self.bets[1]
    }
    /// total commitment after calling and raising by the given
    /// fraction (in halves) of the called pot
    fn target(&self, halves: u32) -> u32 {
        self.bets[self.other()] + self.bets[self.other()] * halves
    }

    fn next_street(&mut self) {
        self.street += 1;
        if self.street == 4 {
            self.done = true;
        } else {
            let n = if self.street == 1 { 3 } else { 1 };
            self.board = self.board.union(self.deck.deal(n, &mut self.rng));
            self.acted = 0;
            self.turn = 1;
            self.history.push('/');
        }
    }

    fn settle(&mut self) {
        if self.acted >= 2 && self.diff() == 0 {
            if self.bets[0] == STACK && self.bets[1] == STACK {
                // both all-in, run out the remaining board
                while !self.done {
                    self.next_street();
                }
            } else {
                self.next_street();
            }
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

impl Environment for NoLimitHoldem {
    fn seats(&self) -> usize {
        2
    }
    fn actions(&self) -> usize {
        5
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
            legal.push(FOLD);
        }
        legal.push(CHECK_CALL);
        if self.bets[self.other()] < STACK {
            if self.target(1) < STACK {
                legal.push(RAISE_HALF);
            }
            if self.target(2) < STACK {
                legal.push(RAISE_POT);
            }
            legal.push(ALL_IN);
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
                pot: self.pot(),
            },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        match action {
            FOLD => {
                assert!(self.diff() > 0);
                self.history.push('f');
                self.folded = Some(self.turn);
                self.done = true;
            }
            CHECK_CALL => {
                self.bets[self.turn] = self.bets[self.other()];
                self.acted += 1;
                self.history.push('c');
                self.settle();
            }
            RAISE_HALF => {
                assert!(self.target(1) < STACK);
                self.bets[self.turn] = self.target(1);
                self.acted += 1;
                self.history.push('h');
                self.turn = self.other();
            }
            RAISE_POT => {
                assert!(self.target(2) < STACK);
                self.bets[self.turn] = self.target(2);
                self.acted += 1;
                self.history.push('p');
                self.turn = self.other();
            }
            ALL_IN => {
                assert!(self.bets[self.other()] < STACK);
                self.bets[self.turn] = STACK;
                self.acted += 1;
                self.history.push('a');
                self.turn = self.other();
            }
            _ => panic!("illegal no-limit action: {}", action),
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
    fn shove_call_runs_out_board() {
        let mut env = NoLimitHoldem::new(2, 0).unwrap();
        env.apply(ALL_IN);
        env.apply(CHECK_CALL);
        assert!(env.over());
        let payoffs = env.payoffs();
        assert_eq!(payoffs[0] + payoffs[1], 0.);
        assert!(payoffs[0].abs() == 50. || payoffs[0] == 0.);
    }

    #[test]
    fn fold_ends_hand_immediately() {
        let mut env = NoLimitHoldem::new(2, 1).unwrap();
        env.apply(FOLD);
        assert!(env.over());
        assert_eq!(env.payoffs(), vec![-0.5, 0.5]);
    }

    #[test]
    fn raises_grow_commitment() {
        let mut env = NoLimitHoldem::new(2, 2).unwrap();
        env.apply(RAISE_POT); // seat 0 to 6
        let obs = env.observe();
        assert_eq!(obs.seat, 1);
        match obs.view {
            View::Holdem { to_call, pot, .. } => {
                assert_eq!(to_call, 4);
                assert_eq!(pot, 8);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn no_raise_past_all_in_caller() {
        let mut env = NoLimitHoldem::new(2, 3).unwrap();
        env.apply(ALL_IN);
        let obs = env.observe();
        assert_eq!(obs.legal, vec![FOLD, CHECK_CALL]);
    }
}
