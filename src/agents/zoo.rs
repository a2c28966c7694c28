use super::Agent;
use crate::cards::Hand;
use crate::cards::Rank;
use crate::cards::Strength;
use crate::env::Observation;
use crate::env::View;
use crate::env::gin;
use crate::env::leduc;
use crate::env::nolimit;
use crate::env::uno;

/// a registry entry: a named bundle of pretrained or rule-based
/// agents, one per canonical seat. the evaluator takes the first.
pub struct Model {
    pub name: String,
    pub agents: Vec<Box<dyn Agent>>,
}

/// look a key up in the model registry. keys are the game name
/// plus a version suffix.
pub fn load(key: &str) -> anyhow::Result<Model> {
    let agents: Vec<Box<dyn Agent>> = match key {
        "blackjack-rule-v1" => vec![boxed(BlackjackRule)],
        "leduc-holdem-rule-v1" => (0..2).map(|_| boxed(LeducRule)).collect(),
        "limit-holdem-rule-v1" => (0..2).map(|_| boxed(LimitRule)).collect(),
        "no-limit-holdem-rule-v1" => (0..2).map(|_| boxed(NoLimitRule)).collect(),
        "doudizhu-rule-v1" => (0..3).map(|_| boxed(DoudizhuRule)).collect(),
        "mahjong-rule-v1" => (0..4).map(|_| boxed(MahjongRule)).collect(),
        "uno-rule-v1" => (0..2).map(|_| boxed(UnoRule)).collect(),
        "gin-rummy-novice-v1" => (0..2).map(|_| boxed(GinRule)).collect(),
        _ => anyhow::bail!("unknown model registry key: {}", key),
    };
    Ok(Model {
        name: key.to_string(),
        agents,
    })
}

fn boxed<A: Agent + 'static>(agent: A) -> Box<dyn Agent> {
    Box::new(agent)
}

/// first legal action from a preference order, falling back to the
/// head of the legal set
fn prefer(legal: &[usize], order: &[usize]) -> usize {
    order
        .iter()
        .copied()
        .find(|action| legal.contains(action))
        .or_else(|| legal.first().copied())
        .expect("legal actions at non-terminal")
}

/// dealer-mimic: draw to seventeen
struct BlackjackRule;
impl Agent for BlackjackRule {
    fn act(&mut self, obs: &Observation) -> usize {
        use crate::env::blackjack::HIT;
        use crate::env::blackjack::STAND;
        match obs.view {
            View::Blackjack { total, .. } if total < 17 => HIT,
            View::Blackjack { .. } => STAND,
            _ => unreachable!("blackjack rule seated at a different game"),
        }
    }
}

/// raise kings and board pairs, call queens, check or fold jacks
struct LeducRule;
impl Agent for LeducRule {
    fn act(&mut self, obs: &Observation) -> usize {
        use leduc::CALL;
        use leduc::CHECK;
        use leduc::FOLD;
        use leduc::RAISE;
        let View::Leduc { hole, board, .. } = obs.view else {
            unreachable!("leduc rule seated at a different game");
        };
        let paired = board == Some(hole);
        let order: &[usize] = if paired || hole == Rank::King {
            &[RAISE, CALL, CHECK]
        } else if hole == Rank::Queen {
            &[CALL, CHECK, FOLD]
        } else {
            &[CHECK, FOLD, CALL]
        };
        prefer(&obs.legal, order)
    }
}

/// raise made pairs and premium holes, otherwise call down
struct LimitRule;
impl Agent for LimitRule {
    fn act(&mut self, obs: &Observation) -> usize {
        use crate::env::limit::CALL;
        use crate::env::limit::CHECK;
        use crate::env::limit::RAISE;
        let View::Holdem { hole, board, .. } = obs.view else {
            unreachable!("limit rule seated at a different game");
        };
        let order: &[usize] = if strong(hole, board) {
            &[RAISE, CALL, CHECK]
        } else {
            &[CHECK, CALL]
        };
        prefer(&obs.legal, order)
    }
}

/// pot-commit made hands, fold weak holes facing a bet
struct NoLimitRule;
impl Agent for NoLimitRule {
    fn act(&mut self, obs: &Observation) -> usize {
        use nolimit::CHECK_CALL;
        use nolimit::FOLD;
        use nolimit::RAISE_HALF;
        use nolimit::RAISE_POT;
        let View::Holdem {
            hole,
            board,
            to_call,
            ..
        } = obs.view
        else {
            unreachable!("no-limit rule seated at a different game");
        };
        let order: &[usize] = if strong(hole, board) {
            &[RAISE_POT, RAISE_HALF, CHECK_CALL]
        } else if to_call == 0 {
            &[CHECK_CALL]
        } else {
            &[FOLD, CHECK_CALL]
        };
        prefer(&obs.legal, order)
    }
}

/// shared hold'em hand heuristic: premium preflop holes, or a made
/// pair once a board is out
fn strong(hole: Hand, board: Hand) -> bool {
    if board == Hand::empty() {
        let mut ranks = hole.into_iter().map(|c| c.rank());
        let (a, b) = (ranks.next(), ranks.next());
        a == b || a >= Some(Rank::Ten) && b >= Some(Rank::Ten)
    } else {
        Strength::from(hole.union(board)) >= Strength::OnePair(Rank::Two, 0)
    }
}

/// shed toward the color we hold most of, draw only when forced
struct UnoRule;
impl Agent for UnoRule {
    fn act(&mut self, obs: &Observation) -> usize {
        use uno::DRAW;
        let View::Uno { ref hand, .. } = obs.view else {
            unreachable!("uno rule seated at a different game");
        };
        let mut held = [0usize; 4];
        for card in hand {
            if let Some(color) = card.color {
                held[usize::from(color)] += 1;
            }
        }
        obs.legal
            .iter()
            .filter(|&&a| a != DRAW)
            .max_by_key(|&&a| match a {
                a if a < 52 => (1, held[a / 13]),
                // wilds are kept for when nothing else matches
                a => (0, held[(a - 52) % 4]),
            })
            .copied()
            .unwrap_or(DRAW)
    }
}

/// lead or follow with the lowest kind in hand, never pass early
struct DoudizhuRule;
impl Agent for DoudizhuRule {
    fn act(&mut self, obs: &Observation) -> usize {
        use crate::env::doudizhu::PASS;
        let View::Doudizhu { .. } = obs.view else {
            unreachable!("doudizhu rule seated at a different game");
        };
        obs.legal
            .iter()
            .filter(|&&a| a != PASS)
            .min()
            .copied()
            .unwrap_or(PASS)
    }
}

/// discard the tile with the fewest neighbors in hand
struct MahjongRule;
impl Agent for MahjongRule {
    fn act(&mut self, obs: &Observation) -> usize {
        let View::Mahjong { counts } = obs.view else {
            unreachable!("mahjong rule seated at a different game");
        };
        let attachment = |kind: usize| {
            let mut score = 2 * counts[kind] as usize;
            if kind < 27 {
                let suit = kind / 9;
                for near in kind.saturating_sub(2)..=(kind + 2).min(26) {
                    if near != kind && near / 9 == suit {
                        score += counts[near] as usize;
                    }
                }
            }
            score
        };
        obs.legal
            .iter()
            .min_by_key(|&&kind| attachment(kind))
            .copied()
            .expect("legal actions at non-terminal")
    }
}

/// pick up melding upcards, knock at the first opportunity, and
/// shed whatever leaves the least deadwood behind
struct GinRule;
impl Agent for GinRule {
    fn act(&mut self, obs: &Observation) -> usize {
        use gin::DRAW_STOCK;
        use gin::DRAW_UPCARD;
        use gin::KNOCK;
        let View::Gin {
            ref hand,
            upcard,
            drawing,
        } = obs.view
        else {
            unreachable!("gin rule seated at a different game");
        };
        let held = hand.iter().copied().collect::<Hand>();
        if drawing {
            match upcard {
                Some(up) if gin::deadwood(held.add(up)) <= gin::deadwood(held) => DRAW_UPCARD,
                _ => DRAW_STOCK,
            }
        } else if obs.legal.contains(&KNOCK) {
            KNOCK
        } else {
            hand.iter()
                .min_by_key(|&&card| gin::deadwood(held.remove(card)))
                .map(|&card| 2 + u8::from(card) as usize)
                .expect("non-empty hand")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Game;

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(load("uno-rule-v2").is_err());
        assert!(load("").is_err());
    }

    #[test]
    fn registry_covers_every_game() {
        for key in [
            "blackjack-rule-v1",
            "leduc-holdem-rule-v1",
            "limit-holdem-rule-v1",
            "no-limit-holdem-rule-v1",
            "doudizhu-rule-v1",
            "mahjong-rule-v1",
            "uno-rule-v1",
            "gin-rummy-novice-v1",
        ] {
            let model = load(key).unwrap();
            assert_eq!(model.name, key);
            assert!(!model.agents.is_empty());
        }
    }

    /// every rule agent must finish episodes of its own game with
    /// only legal actions
    #[test]
    fn rule_agents_play_legal_full_episodes() {
        for (game, key, seats) in [
            (Game::Blackjack, "blackjack-rule-v1", 1),
            (Game::LeducHoldem, "leduc-holdem-rule-v1", 2),
            (Game::LimitHoldem, "limit-holdem-rule-v1", 2),
            (Game::NoLimitHoldem, "no-limit-holdem-rule-v1", 2),
            (Game::Doudizhu, "doudizhu-rule-v1", 3),
            (Game::Mahjong, "mahjong-rule-v1", 4),
            (Game::Uno, "uno-rule-v1", 2),
            (Game::GinRummy, "gin-rummy-novice-v1", 2),
        ] {
            let mut env = game.make(3, seats).unwrap();
            let mut agents = (0..seats)
                .map(|_| load(key).unwrap().agents.remove(0))
                .collect::<Vec<_>>();
            for _ in 0..5 {
                env.reset();
                while !env.over() {
                    let obs = env.observe();
                    let action = agents[obs.seat].act(&obs);
                    assert!(obs.legal.contains(&action), "{} played {}", key, action);
                    env.apply(action);
                }
            }
        }
    }
}
