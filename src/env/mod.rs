pub mod blackjack;
pub mod doudizhu;
pub mod gin;
pub mod leduc;
pub mod limit;
pub mod mahjong;
pub mod nolimit;
pub mod uno;

use crate::Position;
use crate::Utility;
use crate::cards::Card;
use crate::cards::Hand;
use crate::cards::Rank;

/// a stateful simulator for one game type.
///
/// one boxed agent is bound per seat; the seat count is implied
/// by the model list and validated at construction. environments
/// own a seeded rng so episodes are reproducible.
pub trait Environment {
    /// number of player slots
    fn seats(&self) -> usize;
    /// fixed size of the action id space
    fn actions(&self) -> usize;
    /// reinitialize the rng; takes effect from the next reset
    fn seed(&mut self, seed: u64);
    /// begin a fresh episode
    fn reset(&mut self);
    /// has the current episode reached a terminal state
    fn over(&self) -> bool;
    /// what the seat to act gets to see. panics on terminal states
    fn observe(&self) -> Observation;
    /// advance the state machine by one action. panics on illegal ids
    fn apply(&mut self, action: usize);
    /// per-seat returns of the finished episode. panics before terminal
    fn payoffs(&self) -> Vec<Utility>;
}

/// everything an agent is allowed to condition on at its turn
pub struct Observation {
    pub seat: Position,
    /// compact infoset key for tabular and checkpointed policies
    pub key: String,
    /// legal action ids, ascending
    pub legal: Vec<usize>,
    /// structured game state for rule-based policies
    pub view: View,
}

/// the game-specific slice of state visible to the acting seat
pub enum View {
    Blackjack {
        total: u8,
        soft: bool,
        upcard: u8,
    },
    Leduc {
        hole: Rank,
        board: Option<Rank>,
        raises: u8,
    },
    Holdem {
        hole: Hand,
        board: Hand,
        to_call: u32,
        pot: u32,
    },
    Uno {
        hand: Vec<uno::UnoCard>,
        top: uno::UnoCard,
        color: uno::Color,
    },
    Doudizhu {
        counts: [u8; 15],
        lead: Option<u8>,
        landlord: Position,
    },
    Gin {
        hand: Vec<Card>,
        upcard: Option<Card>,
        drawing: bool,
    },
    Mahjong {
        counts: [u8; 34],
    },
}

/// the environment registry, keyed by kebab-case game name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Game {
    Blackjack,
    LeducHoldem,
    LimitHoldem,
    Doudizhu,
    Mahjong,
    NoLimitHoldem,
    Uno,
    GinRummy,
}

impl Game {
    /// construct the simulation environment for the chosen game,
    /// seeded, with one seat per requested agent.
    pub fn make(&self, seed: u64, seats: usize) -> anyhow::Result<Box<dyn Environment>> {
        Ok(match self {
            Self::Blackjack => Box::new(blackjack::Blackjack::new(seats, seed)?),
            Self::LeducHoldem => Box::new(leduc::Leduc::new(seats, seed)?),
            Self::LimitHoldem => Box::new(limit::LimitHoldem::new(seats, seed)?),
            Self::Doudizhu => Box::new(doudizhu::Doudizhu::new(seats, seed)?),
            Self::Mahjong => Box::new(mahjong::Mahjong::new(seats, seed)?),
            Self::NoLimitHoldem => Box::new(nolimit::NoLimitHoldem::new(seats, seed)?),
            Self::Uno => Box::new(uno::Uno::new(seats, seed)?),
            Self::GinRummy => Box::new(gin::GinRummy::new(seats, seed)?),
        })
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Blackjack => "blackjack",
                Self::LeducHoldem => "leduc-holdem",
                Self::LimitHoldem => "limit-holdem",
                Self::Doudizhu => "doudizhu",
                Self::Mahjong => "mahjong",
                Self::NoLimitHoldem => "no-limit-holdem",
                Self::Uno => "uno",
                Self::GinRummy => "gin-rummy",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_constructs_all_games() {
        for (game, seats) in [
            (Game::Blackjack, 1),
            (Game::LeducHoldem, 2),
            (Game::LimitHoldem, 2),
            (Game::Doudizhu, 3),
            (Game::Mahjong, 4),
            (Game::NoLimitHoldem, 2),
            (Game::Uno, 2),
            (Game::GinRummy, 2),
        ] {
            let env = game.make(42, seats).expect("supported seat count");
            assert_eq!(env.seats(), seats);
        }
    }

    #[test]
    fn seat_counts_validated() {
        assert!(Game::Doudizhu.make(42, 2).is_err());
        assert!(Game::Mahjong.make(42, 3).is_err());
        assert!(Game::LeducHoldem.make(42, 3).is_err());
        assert!(Game::Blackjack.make(42, 8).is_err());
    }

    /// any supported environment must run a full episode loop:
    /// legal actions stay non-empty until terminal, payoffs are
    /// seat-count sized and finite.
    #[test]
    fn episodes_terminate() {
        use rand::SeedableRng;
        use rand::seq::IndexedRandom;
        for (game, seats) in [
            (Game::Blackjack, 3),
            (Game::LeducHoldem, 2),
            (Game::LimitHoldem, 2),
            (Game::Doudizhu, 3),
            (Game::Mahjong, 4),
            (Game::NoLimitHoldem, 2),
            (Game::Uno, 3),
            (Game::GinRummy, 2),
        ] {
            let ref mut rng = rand::rngs::SmallRng::seed_from_u64(7);
            let mut env = game.make(7, seats).expect("supported seat count");
            for _ in 0..10 {
                env.reset();
                while !env.over() {
                    let obs = env.observe();
                    assert!(!obs.legal.is_empty());
                    assert!(obs.seat < seats);
                    let action = *obs.legal.choose(rng).expect("non-empty");
                    env.apply(action);
                }
                let payoffs = env.payoffs();
                assert_eq!(payoffs.len(), seats);
                assert!(payoffs.iter().all(|p| p.is_finite()));
            }
        }
    }
}
