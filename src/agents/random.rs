use super::Agent;
use crate::env::Observation;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

/// uniform over legal actions. the canonical baseline opponent.
pub struct Random {
    actions: usize,
    rng: SmallRng,
}

impl Random {
    pub fn new(actions: usize, seed: u64) -> Self {
        Self {
            actions,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
    /// size of the action space this agent was sized against
    pub fn actions(&self) -> usize {
        self.actions
    }
}

impl Agent for Random {
    fn act(&mut self, obs: &Observation) -> usize {
        *obs.legal
            .choose(&mut self.rng)
            .expect("legal actions at non-terminal")
    }
}
