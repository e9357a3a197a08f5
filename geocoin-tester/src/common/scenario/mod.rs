use anyhow::Result;

use crate::common::ScenarioCtx;
use crate::logic::WalkStats;

pub mod conservation;
pub mod reload;
pub mod reset;
pub mod revisit;
pub mod smoke;

pub type ScenarioFn = fn(&ScenarioCtx) -> Result<WalkStats>;

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

const CATALOG: [TestScenario; 5] = [
    TestScenario {
        key: "smoke",
        name: "Smoke Test",
        description: "Start a session and take a short audited walk",
        run: smoke::run,
    },
    TestScenario {
        key: "revisit",
        name: "Cache Revisit",
        description: "Collect, leave the neighborhood, return, deposit",
        run: revisit::run,
    },
    TestScenario {
        key: "conservation-walk",
        name: "Conservation Walk",
        description: "Long random walk with collects and deposits, audited every step",
        run: conservation::run,
    },
    TestScenario {
        key: "reload",
        name: "Session Reload",
        description: "Walk, reopen from the store, and compare state",
        run: reload::run,
    },
    TestScenario {
        key: "reset",
        name: "Full Reset",
        description: "Cancelled and confirmed resets against a fresh baseline",
        run: reset::run,
    },
];

#[must_use]
pub fn catalog() -> &'static [TestScenario] {
    &CATALOG
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let wanted = name.trim().to_lowercase();
    match wanted.as_str() {
        "conservation" | "walk" => get_scenario("conservation-walk"),
        _ => CATALOG.iter().find(|scenario| scenario.key == wanted).copied(),
    }
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocoin_game::GameConfig;

    fn ctx(seed: u64) -> ScenarioCtx {
        ScenarioCtx {
            seed,
            config: GameConfig::default(),
            steps: 30,
            state_dir: None,
            verbose: false,
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(get_scenario("walk").map(|s| s.key), Some("conservation-walk"));
        assert_eq!(get_scenario(" Smoke ").map(|s| s.key), Some("smoke"));
        assert!(get_scenario("boss-fight").is_none());
        assert_eq!(list_scenarios().len(), catalog().len());
    }

    #[test]
    fn every_scenario_passes_on_default_world() {
        for scenario in catalog() {
            for seed in [1, 1337] {
                let outcome = (scenario.run)(&ctx(seed));
                assert!(outcome.is_ok(), "{} seed {seed}: {outcome:?}", scenario.key);
            }
        }
    }
}
