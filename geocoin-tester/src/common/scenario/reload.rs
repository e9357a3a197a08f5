use anyhow::{Result, ensure};

use crate::common::ScenarioCtx;
use crate::logic::{WalkStats, check_view, open_session, random_walk};

pub fn run(ctx: &ScenarioCtx) -> Result<WalkStats> {
    let store = ctx.fresh_store("reload")?;
    let mut rng = ctx.rng();
    let half = ctx.steps.div_ceil(2);

    let mut session = open_session(ctx.config(), store.clone())?;
    let mut stats = random_walk(&mut session, &mut rng, half)?;
    let saved = session.snapshot();
    drop(session);

    let mut resumed = open_session(ctx.config(), store)?;
    ensure!(
        resumed.position() == saved.player_position,
        "position not restored"
    );
    ensure!(
        resumed.trail() == saved.movement_history.as_slice(),
        "trail not restored"
    );
    ensure!(
        resumed.ledger().entries() == saved.inventory.as_slice(),
        "inventory not restored"
    );
    ensure!(resumed.snapshot() == saved, "reloaded session differs from the saved one");
    resumed.audit()?;
    check_view(&resumed)?;

    stats.absorb(random_walk(&mut resumed, &mut rng, ctx.steps - half)?);
    Ok(stats)
}
