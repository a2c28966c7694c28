use super::Environment;
use super::Observation;
use super::View;
use crate::Position;
use crate::Utility;
use crate::cards::Rank;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

pub const CALL: usize = 0;
pub const RAISE: usize = 1;
pub const FOLD: usize = 2;
pub const CHECK: usize = 3;

/// heads-up Leduc hold'em. six-card deck (J Q K twice), one ante,
/// two betting rounds with a two-raise cap, one public board card.
/// a pair with the board beats rank-vs-rank at showdown.
#[derive(Clone)]
pub struct Leduc {
    rng: SmallRng,
    deck: Vec<Rank>,
    holes: [Rank; 2],
    board: Option<Rank>,
    round: u8,
    raises: u8,
    pot: [u32; 2],
    turn: Position,
    history: String,
    checked: bool,
    folded: Option<Position>,
    done: bool,
}

impl Leduc {
    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(seats == 2, "leduc-holdem is heads-up, got {} seats", seats);
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            deck: vec![],
            holes: [Rank::Jack; 2],
            board: None,
            round: 0,
            raises: 0,
            pot: [1, 1],
            turn: 0,
            history: String::new(),
            checked: false,
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
        self.pot[self.other()] - self.pot[self.turn]
    }
    fn size(&self) -> u32 {
        match self.round {
            0 => 2,
            _ => 4,
        }
    }

    fn next_round(&mut self) {
        match self.round {
            0 => {
                self.round = 1;
                self.raises = 0;
                self.checked = false;
                self.board = self.deck.pop();
                self.turn = 0;
                self.history.push('/');
            }
            _ => self.done = true,
        }
    }

    /// seat holding the stronger showdown hand, None on a chop
    fn winner(&self) -> Option<Position> {
        if let Some(folded) = self.folded {
            return Some(1 - folded);
        }
        let board = self.board.expect("board dealt before showdown");
        match (self.holes[0] == board, self.holes[1] == board) {
            (true, _) => Some(0),
            (_, true) => Some(1),
            _ => match self.holes[0].cmp(&self.holes[1]) {
                std::cmp::Ordering::Greater => Some(0),
                std::cmp::Ordering::Less => Some(1),
                std::cmp::Ordering::Equal => None,
            },
        }
    }
}

impl Environment for Leduc {
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
        use Rank::*;
        let mut deck = vec![Jack, Jack, Queen, Queen, King, King];
        deck.shuffle(&mut self.rng);
        self.holes = [deck.pop().expect("six cards"), deck.pop().expect("six cards")];
        self.deck = deck;
        self.board = None;
        self.round = 0;
        self.raises = 0;
        self.pot = [1, 1];
        self.turn = 0;
        self.history.clear();
        self.checked = false;
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
        if self.raises < 2 {
            legal.push(RAISE);
        }
        if self.diff() > 0 {
            legal.push(FOLD);
        } else {
            legal.push(CHECK);
        }
        let board = self.board.map(|b| b.to_string()).unwrap_or("?".into());
        Observation {
            seat: self.turn,
            key: format!("{}|{}|{}", self.holes[self.turn], board, self.history),
            legal,
            view: View::Leduc {
                hole: self.holes[self.turn],
                board: self.board,
                raises: self.raises,
            },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        match action {
            CALL => {
                assert!(self.diff() > 0);
                self.pot[self.turn] = self.pot[self.other()];
                self.history.push('c');
                self.next_round();
            }
            RAISE => {
                assert!(self.raises < 2);
                self.raises += 1;
                self.pot[self.turn] = self.pot[self.other()] + self.size();
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
                self.history.push('k');
                if self.checked {
                    self.next_round();
                } else {
                    self.checked = true;
                    self.turn = self.other();
                }
            }
            _ => panic!("illegal leduc action: {}", action),
        }
    }
    fn payoffs(&self) -> Vec<Utility> {
        assert!(self.done);
        match self.winner() {
            None => vec![0., 0.],
            Some(w) => {
                let chips = self.pot[1 - w] as Utility / 2.;
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
    fn check_check_advances_round() {
        let mut env = Leduc::new(2, 3).unwrap();
        env.apply(CHECK);
        env.apply(CHECK);
        assert!(!env.over());
        let obs = env.observe();
        assert!(obs.key.contains('/'));
        assert!(matches!(
            obs.view,
            View::Leduc { board: Some(_), .. }
        ));
    }

    #[test]
    fn fold_forfeits_pot() {
        let mut env = Leduc::new(2, 4).unwrap();
        env.apply(RAISE); // seat 0 to 3
        env.apply(FOLD); // seat 1 forfeits ante
        assert!(env.over());
        assert_eq!(env.payoffs(), vec![0.5, -0.5]);
    }

    #[test]
    fn raise_cap_enforced() {
        let mut env = Leduc::new(2, 5).unwrap();
        env.apply(RAISE);
        env.apply(RAISE);
        let obs = env.observe();
        assert!(!obs.legal.contains(&RAISE));
        assert_eq!(obs.legal, vec![CALL, FOLD]);
    }

    #[test]
    fn showdown_is_zero_sum() {
        let mut env = Leduc::new(2, 6).unwrap();
        for _ in 0..20 {
            env.reset();
            env.apply(RAISE);
            env.apply(CALL);
            env.apply(RAISE);
            env.apply(CALL);
            assert!(env.over());
            let payoffs = env.payoffs();
            assert_eq!(payoffs[0] + payoffs[1], 0.);
            assert_eq!(payoffs[0].abs(), if payoffs[0] == 0. { 0. } else { 3.5 });
        }
    }
}
