use super::Environment;
use super::Observation;
use super::View;
use crate::Position;
use crate::Utility;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// tile kinds 0..34: three suits of nine plus seven honors
const KINDS: usize = 34;

/// four-player draw-and-discard mahjong. draws happen inside the
/// environment at the start of each turn; the only decision is which
/// kind to discard. a standard four-melds-plus-pair hand wins
/// immediately on the draw. an empty wall is a dead hand.
#[derive(Clone)]
pub struct Mahjong {
    rng: SmallRng,
    wall: Vec<u8>,
    counts: [[u8; KINDS]; 4],
    turn: Position,
    winner: Option<Position>,
    done: bool,
}

impl Mahjong {
    pub fn new(seats: usize, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(seats == 4, "mahjong takes exactly 4 seats, got {}", seats);
        let mut this = Self {
            rng: SmallRng::seed_from_u64(seed),
            wall: vec![],
            counts: [[0; KINDS]; 4],
            turn: 0,
            winner: None,
            done: false,
        };
        this.reset();
        Ok(this)
    }

    /// draw for the seat to act; ends the game on a win or dead wall
    fn advance(&mut self) {
        match self.wall.pop() {
            None => self.done = true,
            Some(tile) => {
                self.counts[self.turn][tile as usize] += 1;
                if winning(&self.counts[self.turn]) {
                    self.winner = Some(self.turn);
                    self.done = true;
                }
            }
        }
    }
}

/// can the 14-tile hand split into four melds and a pair.
/// melds are triplets of a kind or runs within one suit;
/// honors (kinds 27..) never form runs.
pub fn winning(counts: &[u8; KINDS]) -> bool {
    fn melds(counts: &mut [u8; KINDS], kind: usize) -> bool {
        let kind = match (kind..KINDS).find(|k| counts[*k] > 0) {
            None => return true,
            Some(k) => k,
        };
        if counts[kind] >= 3 {
            counts[kind] -= 3;
            let ok = melds(counts, kind);
            counts[kind] += 3;
            if ok {
                return true;
            }
        }
        let suited = kind < 27 && kind % 9 < 7;
        if suited && counts[kind + 1] > 0 && counts[kind + 2] > 0 {
            counts[kind] -= 1;
            counts[kind + 1] -= 1;
            counts[kind + 2] -= 1;
            let ok = melds(counts, kind);
            counts[kind] += 1;
            counts[kind + 1] += 1;
            counts[kind + 2] += 1;
            if ok {
                return true;
            }
        }
        false
    }
    if counts.iter().sum::<u8>() != 14 {
        return false;
    }
    let mut scratch = *counts;
    (0..KINDS).any(|pair| {
        if scratch[pair] >= 2 {
            scratch[pair] -= 2;
            let ok = melds(&mut scratch, 0);
            scratch[pair] += 2;
            ok
        } else {
            false
        }
    })
}

impl Environment for Mahjong {
    fn seats(&self) -> usize {
        4
    }
    fn actions(&self) -> usize {
        KINDS
    }
    fn seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
    fn reset(&mut self) {
        let mut wall = (0..KINDS as u8).flat_map(|kind| [kind; 4]).collect::<Vec<_>>();
        wall.shuffle(&mut self.rng);
        self.counts = [[0; KINDS]; 4];
        for seat in 0..4 {
            for _ in 0..13 {
                let tile = wall.pop().expect("full wall");
                self.counts[seat][tile as usize] += 1;
            }
        }
        self.wall = wall;
        self.turn = 0;
        self.winner = None;
        self.done = false;
        self.advance();
    }
    fn over(&self) -> bool {
        self.done
    }
    fn observe(&self) -> Observation {
        assert!(!self.done);
        let counts = self.counts[self.turn];
        Observation {
            seat: self.turn,
            key: format!("{:?}", counts),
            legal: (0..KINDS).filter(|k| counts[*k] > 0).collect(),
            view: View::Mahjong { counts },
        }
    }
    fn apply(&mut self, action: usize) {
        assert!(!self.done);
        assert!(action < KINDS && self.counts[self.turn][action] > 0);
        self.counts[self.turn][action] -= 1;
        self.turn = (self.turn + 1) % 4;
        self.advance();
    }
    fn payoffs(&self) -> Vec<Utility> {
        assert!(self.done);
        match self.winner {
            None => vec![0.; 4],
            Some(w) => {
                let mut payoffs = vec![-1.; 4];
                payoffs[w] = 1.;
                payoffs
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(tiles: &[usize]) -> [u8; KINDS] {
        let mut counts = [0; KINDS];
        for t in tiles {
            counts[*t] += 1;
        }
        counts
    }

    #[test]
    fn runs_triplet_and_pair_wins() {
        // 123 456 789 of one suit, an honor triplet, and a pair
        let win = hand(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 27, 27, 27, 33, 33]);
        assert!(winning(&win));
    }

    #[test]
    fn honors_never_run() {
        let lose = hand(&[27, 28, 29, 3, 4, 5, 6, 7, 8, 0, 0, 0, 33, 33]);
        assert!(!winning(&lose));
    }

    #[test]
    fn runs_stay_inside_suits() {
        // 8m 9m 1p is not a run
        let lose = hand(&[7, 8, 9, 3, 4, 5, 12, 13, 14, 0, 0, 0, 33, 33]);
        assert!(!winning(&lose));
    }

    #[test]
    fn thirteen_tiles_cannot_win() {
        let lose = hand(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 27, 27, 27, 33]);
        assert!(!winning(&lose));
    }

    #[test]
    fn wall_exhaustion_is_a_wash() {
        let mut env = Mahjong::new(4, 0).unwrap();
        while !env.over() {
            let obs = env.observe();
            env.apply(obs.legal[0]);
        }
        if env.winner.is_none() {
            assert_eq!(env.payoffs(), vec![0.; 4]);
        }
    }
}
