use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::ScenarioCtx;
use crate::common::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub steps_walked: usize,
    pub coins_collected: usize,
    pub coins_deposited: usize,
    pub peak_live_caches: usize,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    base: ScenarioCtx,
}

impl LogicTester {
    pub const fn new(base: ScenarioCtx) -> Self {
        Self { base }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.base.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed {seed})",
                        scenario.name.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut result = ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: false,
            iterations_run: iterations,
            successful_iterations: 0,
            failures: Vec::new(),
            steps_walked: 0,
            coins_collected: 0,
            coins_deposited: 0,
            peak_live_caches: 0,
            average_duration: Duration::ZERO,
            performance_data: Vec::new(),
        };

        for i in 0..iterations {
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let ctx = ScenarioCtx {
                seed: iteration_seed,
                ..self.base.clone()
            };
            let start_time = Instant::now();
            match (scenario.run)(&ctx) {
                Ok(stats) => {
                    let duration = start_time.elapsed();
                    result.successful_iterations += 1;
                    result.steps_walked += stats.steps;
                    result.coins_collected += stats.collected;
                    result.coins_deposited += stats.deposited;
                    result.peak_live_caches = result.peak_live_caches.max(stats.max_live);
                    result.performance_data.push(duration);
                    if self.base.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) steps:{} coins:{}",
                            i + 1,
                            iterations,
                            stats.steps,
                            stats.coins_accounted
                        );
                    }
                }
                Err(err) => {
                    let message = format!("Iteration {} (seed {iteration_seed}): {err:#}", i + 1);
                    if self.base.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    result.failures.push(message);
                }
            }
        }

        result.passed = result.failures.is_empty();
        if !result.performance_data.is_empty() {
            result.average_duration = result.performance_data.iter().sum::<Duration>()
                / u32::try_from(result.performance_data.len()).unwrap_or(1);
        }
        result
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
