pub mod checkpoint;
pub mod random;
pub mod tabular;
pub mod zoo;

use crate::device::Device;
use crate::env::Environment;
use crate::env::Observation;
use std::path::Path;

/// a policy bound to one seat. agents are mutable because some of
/// them sample, and sampling advances their rng.
pub trait Agent {
    fn act(&mut self, obs: &Observation) -> usize;
}

/// resolve a model specifier into a seated agent.
///
/// dispatch is positional and filesystem-first: an existing file is a
/// serialized checkpoint, an existing directory is a tabular policy,
/// the literal "random" is a uniform agent, and anything else is
/// looked up in the model registry. a file in the working directory
/// named "random" therefore shadows the literal.
pub fn resolve(
    spec: &str,
    env: &dyn Environment,
    device: Device,
    seed: u64,
) -> anyhow::Result<Box<dyn Agent>> {
    let path = Path::new(spec);
    if path.is_file() {
        let mut agent = checkpoint::Checkpoint::load(path)?;
        agent.bind(device);
        Ok(Box::new(agent))
    } else if path.is_dir() {
        Ok(Box::new(tabular::Tabular::load(path, seed)?))
    } else if spec == "random" {
        Ok(Box::new(random::Random::new(env.actions(), seed)))
    } else {
        let mut model = zoo::load(spec)?;
        anyhow::ensure!(
            !model.agents.is_empty(),
            "registry model {} ships no agents",
            spec
        );
        Ok(model.agents.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Game;

    #[test]
    fn literal_random_resolves() {
        let env = Game::Uno.make(42, 2).unwrap();
        assert!(resolve("random", env.as_ref(), Device::Cpu, 42).is_ok());
    }

    #[test]
    fn registry_keys_resolve() {
        let env = Game::LeducHoldem.make(42, 2).unwrap();
        assert!(resolve("leduc-holdem-rule-v1", env.as_ref(), Device::Cpu, 42).is_ok());
    }

    #[test]
    fn unknown_specifiers_are_errors() {
        let env = Game::Uno.make(42, 2).unwrap();
        assert!(resolve("no-such-model", env.as_ref(), Device::Cpu, 42).is_err());
        assert!(resolve("uno-rule-v9", env.as_ref(), Device::Cpu, 42).is_err());
    }

    #[test]
    fn files_resolve_as_checkpoints() {
        let dir = std::env::temp_dir().join("deckbench-resolve-test");
        std::fs::create_dir_all(&dir).unwrap();
        // the stem is irrelevant, even a name that collides with the
        // "random" literal dispatches as a file when it exists
        let file = dir.join("random");
        let checkpoint = checkpoint::Checkpoint::blank("uno");
        checkpoint.save(&file).unwrap();
        let env = Game::Uno.make(42, 2).unwrap();
        assert!(resolve(file.to_str().unwrap(), env.as_ref(), Device::Cpu, 42).is_ok());
        std::fs::remove_file(file).unwrap();
    }

    #[test]
    fn directories_resolve_as_tabular() {
        use crate::env::leduc::Leduc;
        let dir = std::env::temp_dir().join("deckbench-tabular-test");
        std::fs::create_dir_all(&dir).unwrap();
        let env = Leduc::new(2, 42).unwrap();
        let policy = tabular::Tabular::train(&env, 8, 42);
        policy.save(&dir).unwrap();
        let env = Game::LeducHoldem.make(42, 2).unwrap();
        assert!(resolve(dir.to_str().unwrap(), env.as_ref(), Device::Cpu, 42).is_ok());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
