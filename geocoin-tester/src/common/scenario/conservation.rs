use anyhow::{Result, ensure};

use crate::common::ScenarioCtx;
use crate::logic::{WalkStats, open_session, random_walk};

pub fn run(ctx: &ScenarioCtx) -> Result<WalkStats> {
    let mut session = open_session(ctx.config(), ctx.fresh_store("conservation")?)?;
    let mut rng = ctx.rng();
    let stats = random_walk(&mut session, &mut rng, ctx.steps)?;
    let held = session.ledger().len();
    ensure!(
        stats.collected >= stats.deposited,
        "deposited more coins than were collected"
    );
    ensure!(
        held == stats.collected - stats.deposited,
        "ledger holds {held}, expected {}",
        stats.collected - stats.deposited
    );
    Ok(stats)
}
