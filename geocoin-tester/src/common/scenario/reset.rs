use anyhow::{Result, anyhow, ensure};
use geocoin_game::KeyValueStore;

use crate::common::ScenarioCtx;
use crate::logic::{WalkStats, check_view, open_session, random_walk};

pub fn run(ctx: &ScenarioCtx) -> Result<WalkStats> {
    let config = ctx.config().with_spawn_probability(1.0);
    let key = config.storage_key.clone();
    let pristine = open_session(config.clone(), ctx.fresh_store("reset-baseline")?)?.snapshot();

    let store = ctx.fresh_store("reset")?;
    let mut session = open_session(config, store.clone())?;
    let mut rng = ctx.rng();
    let stats = random_walk(&mut session, &mut rng, ctx.steps.min(15))?;
    let home = session.current_cell();
    if let Some(coin) = session.cache(home).and_then(|cache| cache.coins().first().copied()) {
        session.collect(home, &coin.id)?;
    }
    let before = session.snapshot();

    ensure!(!session.request_reset(|| false), "cancelled reset reported success");
    ensure!(session.snapshot() == before, "cancelled reset changed state");

    ensure!(session.request_reset(|| true), "confirmed reset did not run");
    ensure!(
        store.get(&key).map_err(|err| anyhow!(err))?.is_none(),
        "stored session survived reset"
    );
    ensure!(!session.tracking(), "tracking survived reset");
    ensure!(
        session.snapshot() == pristine,
        "reset world differs from a fresh session"
    );
    check_view(&session)?;
    let coins_accounted = session.audit()?;
    Ok(WalkStats {
        coins_accounted,
        ..stats
    })
}
