pub mod scenario;

use anyhow::{Context, Result};
use geocoin_game::{GameConfig, MemoryStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

use crate::store::{FileStore, TesterStore};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse world seeds given as decimal or `0x` hex.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    tokens
        .iter()
        .map(|token| {
            let parsed = token.strip_prefix("0x").map_or_else(
                || token.parse::<u64>(),
                |hex| u64::from_str_radix(hex, 16),
            );
            parsed.with_context(|| format!("invalid seed `{token}`"))
        })
        .collect()
}

/// Everything one scenario iteration needs.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub seed: u64,
    pub config: GameConfig,
    pub steps: usize,
    pub state_dir: Option<PathBuf>,
    pub verbose: bool,
}

impl ScenarioCtx {
    /// The configured world, reseeded for this iteration.
    #[must_use]
    pub fn config(&self) -> GameConfig {
        self.config.clone().with_world_seed(self.seed)
    }

    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    /// An empty store private to `label` and this seed.
    pub fn fresh_store(&self, label: &str) -> Result<TesterStore> {
        let Some(root) = &self.state_dir else {
            return Ok(TesterStore::Memory(MemoryStore::default()));
        };
        let dir = root.join(format!("{label}-{}", self.seed));
        let store = FileStore::new(&dir)?;
        let stale = store.path_for(&self.config.storage_key);
        if stale.exists() {
            std::fs::remove_file(&stale)
                .with_context(|| format!("clearing {}", stale.display()))?;
        }
        Ok(TesterStore::File(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_tokens_are_trimmed() {
        assert_eq!(split_csv(" smoke, ,reload "), vec!["smoke", "reload"]);
    }

    #[test]
    fn seeds_accept_hex_and_reject_junk() {
        let seeds = parse_seeds(&split_csv("7,0xff")).unwrap();
        assert_eq!(seeds, vec![7, 255]);
        assert!(parse_seeds(&["seven".to_string()]).is_err());
    }

    #[test]
    fn iteration_config_carries_the_seed() {
        let ctx = ScenarioCtx {
            seed: 99,
            config: GameConfig::default(),
            steps: 3,
            state_dir: None,
            verbose: false,
        };
        assert_eq!(ctx.config().world_seed, 99);
        assert!(matches!(ctx.fresh_store("smoke").unwrap(), TesterStore::Memory(_)));
    }
}
