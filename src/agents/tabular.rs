use super::Agent;
use crate::CFR_BATCH_SIZE;
use crate::POLICY_MIN;
use crate::Probability;
use crate::REGRET_MIN;
use crate::TRAINING_LOG_INTERVAL;
use crate::Utility;
use crate::env::Environment;
use crate::env::Observation;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;
use std::collections::BTreeMap;
use std::path::Path;

/// per-infoset accumulators, keyed by action id
type Strategy = BTreeMap<usize, f32>;
type Table = BTreeMap<String, Strategy>;

/// cumulative regret and average-strategy tables built by
/// external-sampling MCCFR. acting samples the average strategy,
/// which is the part that converges toward equilibrium.
pub struct Tabular {
    epochs: usize,
    regrets: Table,
    average: Table,
    rng: SmallRng,
}

/// one trajectory's worth of table updates. batches of these are
/// built in parallel and folded into the tables serially, so the
/// tables themselves never need locks.
#[derive(Default)]
struct Delta {
    regrets: Table,
    average: Table,
}

impl Tabular {
    pub fn new(seed: u64) -> Self {
        Self {
            epochs: 0,
            regrets: Table::new(),
            average: Table::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// run external-sampling MCCFR against self-play for the given
    /// number of epochs. the walker seat alternates per epoch; each
    /// epoch plays a batch of independent trajectories in parallel
    /// and absorbs their updates in order.
    pub fn train<E>(env: &E, epochs: usize, seed: u64) -> Self
    where
        E: Environment + Clone + Sync,
    {
        let mut this = Self::new(seed);
        log::info!("training tabular policy for {} epochs", epochs);
        for epoch in 0..epochs {
            let walker = epoch % env.seats();
            let deltas = (0..CFR_BATCH_SIZE)
                .into_par_iter()
                .map(|i| {
                    let trajectory = (epoch * CFR_BATCH_SIZE + i) as u64;
                    let ref mut rng = SmallRng::seed_from_u64(seed ^ trajectory);
                    let mut env = env.clone();
                    env.seed(seed.wrapping_add(trajectory));
                    env.reset();
                    let mut delta = Delta::default();
                    this.walk(&mut env, walker, rng, &mut delta);
                    delta
                })
                .collect::<Vec<_>>();
            for delta in deltas {
                this.absorb(delta);
            }
            this.epochs += 1;
            if this.epochs % TRAINING_LOG_INTERVAL == 0 {
                log::info!(
                    "epoch {:>8} of {:>8} ({} infosets)",
                    this.epochs,
                    epochs,
                    this.regrets.len()
                );
            }
        }
        this
    }

    /// one recursive trajectory. at walker nodes every action is
    /// explored and counterfactual regrets accumulate; at opponent
    /// nodes one action is sampled from the current strategy and
    /// the average strategy accumulates.
    fn walk<E>(
        &self,
        env: &mut E,
        walker: usize,
        rng: &mut SmallRng,
        delta: &mut Delta,
    ) -> Utility
    where
        E: Environment + Clone,
    {
        if env.over() {
            return env.payoffs()[walker];
        }
        let obs = env.observe();
        let policy = self.strategy(&obs.key, &obs.legal);
        if obs.seat == walker {
            let utilities = obs
                .legal
                .iter()
                .map(|&action| {
                    let mut branch = env.clone();
                    branch.apply(action);
                    (action, self.walk(&mut branch, walker, rng, delta))
                })
                .collect::<BTreeMap<usize, Utility>>();
            let expected = obs
                .legal
                .iter()
                .map(|a| policy[a] * utilities[a])
                .sum::<Utility>();
            let regrets = delta.regrets.entry(obs.key).or_default();
            for action in obs.legal {
                *regrets.entry(action).or_default() += utilities[&action] - expected;
            }
            expected
        } else {
            let average = delta.average.entry(obs.key).or_default();
            for &action in &obs.legal {
                *average.entry(action).or_default() += policy[&action];
            }
            env.apply(sample(&policy, rng));
            self.walk(env, walker, rng, delta)
        }
    }

    /// fold one trajectory's updates into the tables, flooring
    /// cumulative regret so it can recover from long losing streaks
    fn absorb(&mut self, delta: Delta) {
        for (key, strategy) in delta.regrets {
            let regrets = self.regrets.entry(key).or_default();
            for (action, regret) in strategy {
                let slot = regrets.entry(action).or_default();
                *slot = (*slot + regret).max(REGRET_MIN);
            }
        }
        for (key, strategy) in delta.average {
            let average = self.average.entry(key).or_default();
            for (action, weight) in strategy {
                *average.entry(action).or_default() += weight;
            }
        }
    }

    /// current strategy by regret matching: positive regrets
    /// normalized, uniform when nothing is positive or the infoset
    /// is unseen
    fn strategy(&self, key: &str, legal: &[usize]) -> BTreeMap<usize, Probability> {
        let positives = legal
            .iter()
            .map(|&a| {
                let regret = self
                    .regrets
                    .get(key)
                    .and_then(|s| s.get(&a))
                    .copied()
                    .unwrap_or_default();
                (a, regret.max(0.))
            })
            .collect::<BTreeMap<usize, f32>>();
        let sum = positives.values().sum::<f32>();
        if sum > 0. {
            positives.into_iter().map(|(a, r)| (a, r / sum)).collect()
        } else {
            let uniform = 1. / legal.len() as Probability;
            legal.iter().map(|&a| (a, uniform)).collect()
        }
    }

    /// average strategy restricted to the legal set, renormalized.
    /// this is what evaluation and checkpoint export consume.
    pub fn advice(&self, key: &str, legal: &[usize]) -> BTreeMap<usize, Probability> {
        let weights = legal
            .iter()
            .map(|&a| {
                let weight = self
                    .average
                    .get(key)
                    .and_then(|s| s.get(&a))
                    .copied()
                    .unwrap_or_default();
                (a, weight.max(POLICY_MIN))
            })
            .collect::<BTreeMap<usize, f32>>();
        let sum = weights.values().sum::<f32>();
        weights.into_iter().map(|(a, w)| (a, w / sum)).collect()
    }

    /// full average table, for checkpoint export
    pub fn average(&self) -> &BTreeMap<String, Strategy> {
        &self.average
    }
}

/// weighted draw from a strategy distribution
fn sample(policy: &BTreeMap<usize, Probability>, rng: &mut SmallRng) -> usize {
    let mut roll = rng.random::<f32>();
    for (&action, &mass) in policy {
        roll -= mass;
        if roll <= 0. {
            return action;
        }
    }
    *policy.keys().next_back().expect("non-empty policy")
}

impl Agent for Tabular {
    fn act(&mut self, obs: &Observation) -> usize {
        let policy = self.advice(&obs.key, &obs.legal);
        sample(&policy, &mut self.rng)
    }
}

/// disk layout: two PGCOPY-framed files in the policy directory,
/// one for each table. records are (key, action, value) triples
/// with a 2-byte field count and 4-byte per-field lengths, closed
/// by the 0xFFFF trailer.
impl Tabular {
    const REGRETS: &'static str = "regrets.pgcopy";
    const AVERAGE: &'static str = "average.pgcopy";

    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        log::info!("saving tabular policy to {}", dir.display());
        std::fs::create_dir_all(dir)?;
        write(&dir.join(Self::REGRETS), &self.regrets)?;
        write(&dir.join(Self::AVERAGE), &self.average)?;
        Ok(())
    }

    pub fn load(dir: &Path, seed: u64) -> anyhow::Result<Self> {
        log::info!("loading tabular policy from {}", dir.display());
        Ok(Self {
            epochs: 0,
            regrets: read(&dir.join(Self::REGRETS))?,
            average: read(&dir.join(Self::AVERAGE))?,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

fn write(path: &Path, table: &Table) -> anyhow::Result<()> {
    use byteorder::BE;
    use byteorder::WriteBytesExt;
    use std::io::Write;
    let ref mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    file.write_all(b"PGCOPY\n\xFF\r\n\0")?;
    file.write_u32::<BE>(0)?;
    file.write_u32::<BE>(0)?;
    for (key, strategy) in table {
        for (action, value) in strategy {
            const N_FIELDS: u16 = 3;
            file.write_u16::<BE>(N_FIELDS)?;
            file.write_u32::<BE>(key.len() as u32)?;
            file.write_all(key.as_bytes())?;
            file.write_u32::<BE>(size_of::<u32>() as u32)?;
            file.write_u32::<BE>(*action as u32)?;
            file.write_u32::<BE>(size_of::<f32>() as u32)?;
            file.write_f32::<BE>(*value)?;
        }
    }
    file.write_u16::<BE>(0xFFFF)?;
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<Table> {
    use byteorder::BE;
    use byteorder::ReadBytesExt;
    use std::io::Read;
    use std::io::Seek;
    use std::io::SeekFrom;
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mut table = Table::new();
    let mut buffer = [0u8; 2];
    reader.seek(SeekFrom::Start(19))?;
    while reader.read_exact(&mut buffer).is_ok() {
        if u16::from_be_bytes(buffer) == 3 {
            let length = reader.read_u32::<BE>()? as usize;
            let mut key = vec![0u8; length];
            reader.read_exact(&mut key)?;
            let key = String::from_utf8(key)?;
            reader.read_u32::<BE>()?;
            let action = reader.read_u32::<BE>()? as usize;
            reader.read_u32::<BE>()?;
            let value = reader.read_f32::<BE>()?;
            table.entry(key).or_default().insert(action, value);
            continue;
        } else {
            break;
        }
    }
    Ok(table)
}
