use crate::Position;
use crate::TOURNAMENT_LOG_INTERVAL;
use crate::Utility;
use crate::agents::Agent;
use crate::env::Environment;

/// one agent bound to one seat position
pub struct Seat {
    position: Position,
    agent: Box<dyn Agent>,
}

/// an environment with every seat filled. episodes run strictly
/// sequentially so agent sampling stays reproducible under a seed.
pub struct Table {
    env: Box<dyn Environment>,
    seats: Vec<Seat>,
}

impl Table {
    pub fn sit(env: Box<dyn Environment>, agents: Vec<Box<dyn Agent>>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            env.seats() == agents.len(),
            "environment seats {} agents {}",
            env.seats(),
            agents.len()
        );
        let seats = agents
            .into_iter()
            .enumerate()
            .map(|(position, agent)| Seat { position, agent })
            .collect();
        Ok(Self { env, seats })
    }

    /// play the given number of episodes and return per-seat mean
    /// rewards, in seat order
    pub fn tournament(&mut self, games: usize) -> Vec<Utility> {
        let mut totals = vec![0.; self.env.seats()];
        for game in 0..games {
            self.env.reset();
            while !self.env.over() {
                let obs = self.env.observe();
                let seat = &mut self.seats[obs.seat];
                assert!(seat.position == obs.seat);
                let action = seat.agent.act(&obs);
                self.env.apply(action);
            }
            for (total, payoff) in totals.iter_mut().zip(self.env.payoffs()) {
                *total += payoff;
            }
            if (game + 1) % TOURNAMENT_LOG_INTERVAL == 0 {
                log::info!("{:>8} of {:>8} games", game + 1, games);
            }
        }
        if games == 0 {
            totals
        } else {
            totals.into_iter().map(|t| t / games as Utility).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::random::Random;
    use crate::env::Game;

    #[test]
    fn seat_counts_must_match() {
        let env = Game::Doudizhu.make(0, 3).unwrap();
        let agents = (0..2)
            .map(|i| Box::new(Random::new(env.actions(), i)) as Box<dyn Agent>)
            .collect();
        assert!(Table::sit(env, agents).is_err());
    }

    #[test]
    fn mean_rewards_are_finite_and_seat_ordered() {
        let env = Game::LeducHoldem.make(9, 2).unwrap();
        let agents = (0..2)
            .map(|i| Box::new(Random::new(env.actions(), i)) as Box<dyn Agent>)
            .collect();
        let mut table = Table::sit(env, agents).unwrap();
        let rewards = table.tournament(100);
        assert_eq!(rewards.len(), 2);
        assert!(rewards.iter().all(|r| r.is_finite()));
        // heads-up leduc is zero sum, so the means must cancel
        assert!((rewards[0] + rewards[1]).abs() < 1e-4);
    }

    #[test]
    fn zero_games_scores_zero() {
        let env = Game::Uno.make(0, 2).unwrap();
        let agents = (0..2)
            .map(|i| Box::new(Random::new(env.actions(), i)) as Box<dyn Agent>)
            .collect();
        let mut table = Table::sit(env, agents).unwrap();
        assert_eq!(table.tournament(0), vec![0., 0.]);
    }
}
