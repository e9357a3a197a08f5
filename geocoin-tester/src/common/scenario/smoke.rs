use anyhow::{Result, ensure};

use crate::common::ScenarioCtx;
use crate::logic::{WalkStats, check_view, open_session, random_walk};

pub fn run(ctx: &ScenarioCtx) -> Result<WalkStats> {
    let mut session = open_session(ctx.config(), ctx.fresh_store("smoke")?)?;
    check_view(&session)?;
    ensure!(session.ledger().is_empty(), "new session starts with coins");
    ensure!(session.trail().len() == 1, "new trail should hold the start");

    let mut rng = ctx.rng();
    let stats = random_walk(&mut session, &mut rng, ctx.steps.min(20))?;
    ensure!(
        session.known_cells() >= session.materialized().len(),
        "fewer interned cells than live caches"
    );
    Ok(stats)
}
