use super::Agent;
use super::tabular::Tabular;
use crate::device::Device;
use crate::env::Observation;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// a frozen policy snapshot serialized as JSON. values are per-key
/// action weights exported from a trained policy; acting is greedy,
/// so a checkpoint plays deterministically.
#[derive(Serialize, Deserialize)]
pub struct Checkpoint {
    game: String,
    values: BTreeMap<String, Vec<(usize, f32)>>,
    #[serde(skip)]
    device: Device,
}

impl Checkpoint {
    pub fn blank(game: &str) -> Self {
        Self {
            game: game.to_string(),
            values: BTreeMap::new(),
            device: Device::default(),
        }
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        log::info!("loading checkpoint from {}", path.display());
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        log::info!("saving checkpoint to {}", path.display());
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    /// place the checkpoint's parameters on the chosen device
    pub fn bind(&mut self, device: Device) {
        log::debug!("binding checkpoint to {}", device);
        self.device = device;
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

/// export the average strategy of a trained tabular policy
impl From<(&Tabular, &str)> for Checkpoint {
    fn from((policy, game): (&Tabular, &str)) -> Self {
        Self {
            game: game.to_string(),
            values: policy
                .average()
                .iter()
                .map(|(key, strategy)| {
                    let legal = strategy.keys().copied().collect::<Vec<_>>();
                    let advice = policy.advice(key, &legal);
                    (key.clone(), advice.into_iter().collect())
                })
                .collect(),
            device: Device::default(),
        }
    }
}

impl Agent for Checkpoint {
    fn act(&mut self, obs: &Observation) -> usize {
        self.values
            .get(&obs.key)
            .into_iter()
            .flatten()
            .filter(|(action, _)| obs.legal.contains(action))
            // ties go to the first listed action, so only a strictly
            // greater value displaces the incumbent
            .fold(None::<(usize, f32)>, |best, &(action, value)| match best {
                Some((_, incumbent)) if !value.total_cmp(&incumbent).is_gt() => best,
                _ => Some((action, value)),
            })
            .map(|(action, _)| action)
            .unwrap_or_else(|| *obs.legal.first().expect("legal actions at non-terminal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::View;

    fn observation(key: &str, legal: Vec<usize>) -> Observation {
        Observation {
            seat: 0,
            key: key.to_string(),
            legal,
            view: View::Mahjong { counts: [0; 34] },
        }
    }

    #[test]
    fn greedy_over_legal_only() {
        let mut checkpoint = Checkpoint::blank("test");
        checkpoint
            .values
            .insert("k".into(), vec![(0, 0.9), (1, 0.05), (2, 0.05)]);
        // the best action is illegal here, so the runner-up wins
        assert_eq!(checkpoint.act(&observation("k", vec![1, 2])), 1);
        assert_eq!(checkpoint.act(&observation("k", vec![0, 1, 2])), 0);
    }

    #[test]
    fn ties_prefer_the_first_listed() {
        let mut checkpoint = Checkpoint::blank("test");
        checkpoint.values.insert("k".into(), vec![(1, 0.5), (2, 0.5)]);
        assert_eq!(checkpoint.act(&observation("k", vec![1, 2])), 1);
        assert_eq!(checkpoint.act(&observation("k", vec![2])), 2);
    }

    #[test]
    fn unseen_keys_fall_back_to_first_legal() {
        let mut checkpoint = Checkpoint::blank("test");
        assert_eq!(checkpoint.act(&observation("unseen", vec![4, 5])), 4);
    }

    #[test]
    fn json_round_trip() {
        let path = std::env::temp_dir().join("deckbench-checkpoint-test.json");
        let mut checkpoint = Checkpoint::blank("leduc-holdem");
        checkpoint.values.insert("k".into(), vec![(1, 0.5)]);
        checkpoint.save(&path).unwrap();
        let loaded = Checkpoint::load(&path).unwrap();
        assert_eq!(loaded.game(), "leduc-holdem");
        assert_eq!(loaded.values, checkpoint.values);
        assert_eq!(loaded.device(), Device::Cpu);
        std::fs::remove_file(path).unwrap();
    }
}
