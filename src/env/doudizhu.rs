use super::Environment;
use super::Observation;
use super::View;
use crate::Position;
use crate::Utility;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

pub const PASS: usize = 15;

/// rank kinds 0..14: 3 4 5 6 7 8 9 T J Q K A 2, black joker, red joker
const KINDS: usize = 15;

/// three-player landlord shedding game, singles variant. seat 0 is
/// the landlord and receives the three widow cards. tricks are
/// won by the highest unbeaten single after two passes.
#[derive(Clone)]
pub struct Doudizhu {
    rng: SmallRng,
    counts: [[u8; KINDS]; 3],
    lead: Option<(Position, u8)>,
    passes: u8,
    turn: Position,
    winner: Option<Position>,
    done: bool,
}

impl Doudizhu {
    pub const LANDLORD: Position = 0;

    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(seats == 3, "doudizhu takes exactly 3 seats, got {}", seats);
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            counts: [[0; KINDS]; 3],
            lead: None,
            passes: 0,
            turn: Self::LANDLORD,
            winner: None,
            done: false,
        };
        this.reset();
        Ok(this)
    }

    fn held(&self, seat: Position) -> u8 {
        self.counts[seat].iter().sum()
    }
}

impl Environment for Doudizhu {
    fn seats(&self) -> usize {
        3
    }
    fn actions(&self) -> usize {
        16
    }
    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
    fn reset(&mut self) {
        // four of each rank, one of each joker
        let mut deck = (0..13)
            .flat_map(|kind| [kind; 4])
            .chain([13, 14])
            .collect::<Vec<u8>>();
        deck.shuffle(&mut self.rng);
        self.counts = [[0; KINDS]; 3];
        for (i, kind) in deck.into_iter().enumerate() {
            // 17 each, widow of 3 to the landlord
            let seat = if i < 51 { i % 3 } else { Self::LANDLORD };
            self.counts[seat][kind as usize] += 1;
        }
        self.lead = None;
        self.passes = 0;
        self.turn = Self::LANDLORD;
        self.winner = None;
        self.done = false;
    }
    fn over(&self) -> bool {
        self.done
    }
    fn observe(&self) -> Observation {
        assert!(!self.done);
        let floor = self.lead.map(|(_, kind)| kind);
        let mut legal = (0..KINDS)
            .filter(|kind| self.counts[self.turn][*kind] > 0)
            .filter(|kind| floor.map_or(true, |f| *kind as u8 > f))
            .collect::<Vec<_>>();
        if floor.is_some() {
            legal.push(PASS);
        }
        Observation {
            seat: self.turn,
            key: format!("{:?}|{:?}", self.counts[self.turn], floor),
            legal,
            view: View::Doudizhu {
                counts: self.counts[self.turn],
                lead: floor,
                landlord: Self::LANDLORD,
            },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        match action {
            PASS => {
                assert!(self.lead.is_some());
                self.passes += 1;
                if self.passes == 2 {
                    // trick over, winner leads fresh
                    let (owner, _) = self.lead.take().expect("lead exists");
                    self.passes = 0;
                    self.turn = owner;
                } else {
                    self.turn = (self.turn + 1) % 3;
                }
            }
            kind if kind < KINDS => {
                assert!(self.counts[self.turn][kind] > 0);
                assert!(
                    self.lead
                        .map_or(true, |(_, floor)| kind as u8 > floor)
                );
                self.counts[self.turn][kind] -= 1;
                self.lead = Some((self.turn, kind as u8));
                self.passes = 0;
                if self.held(self.turn) == 0 {
                    self.winner = Some(self.turn);
                    self.done = true;
                } else {
                    self.turn = (self.turn + 1) % 3;
                }
            }
            _ => panic!("illegal doudizhu action: {}", action),
        }
    }
    fn payoffs(&self) -> Vec<Utility> {
        assert!(self.done);
        match self.winner {
            Some(Self::LANDLORD) => vec![1., -0.5, -0.5],
            Some(_) => vec![-1., 0.5, 0.5],
            None => vec![0.; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landlord_gets_widow() {
        let env = Doudizhu::new(3, 0).unwrap();
        assert_eq!(env.held(0), 20);
        assert_eq!(env.held(1), 17);
        assert_eq!(env.held(2), 17);
    }

    #[test]
    fn leading_may_not_pass() {
        let env = Doudizhu::new(3, 1).unwrap();
        let obs = env.observe();
        assert_eq!(obs.seat, Doudizhu::LANDLORD);
        assert!(!obs.legal.contains(&PASS));
    }

    #[test]
    fn two_passes_return_the_lead() {
        let mut env = Doudizhu::new(3, 2).unwrap();
        let first = env.observe().legal[0];
        env.apply(first);
        env.apply(PASS);
        env.apply(PASS);
        let obs = env.observe();
        assert_eq!(obs.seat, Doudizhu::LANDLORD);
        assert!(!obs.legal.contains(&PASS));
    }

    #[test]
    fn peasants_split_the_result() {
        use rand::seq::IndexedRandom;
        let ref mut rng = SmallRng::seed_from_u64(3);
        let mut env = Doudizhu::new(3, 3).unwrap();
        while !env.over() {
            let obs = env.observe();
            env.apply(*obs.legal.choose(rng).expect("non-empty"));
        }
        let payoffs = env.payoffs();
        assert_eq!(payoffs[1], payoffs[2]);
        assert_eq!(payoffs[0] + payoffs[1] + payoffs[2], 0.);
    }
}
