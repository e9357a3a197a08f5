//! Coins taken from a cache stay taken after the cache leaves and re-enters
//! the neighborhood, and come back once deposited.
use anyhow::{Context, Result, anyhow, ensure};
use geocoin_game::{Direction, TokenId};
use std::collections::BTreeSet;

use crate::common::ScenarioCtx;
use crate::logic::{Session, WalkStats, check_view, open_session, stride};

fn ids_at(session: &Session, cell: geocoin_game::GridCell) -> Result<BTreeSet<TokenId>> {
    let cache = session
        .cache(cell)
        .ok_or_else(|| anyhow!("cache {cell} should be materialized"))?;
    Ok(cache.coins().iter().map(|coin| coin.id).collect())
}

pub fn run(ctx: &ScenarioCtx) -> Result<WalkStats> {
    let config = ctx.config().with_spawn_probability(1.0);
    let away = config.neighborhood_radius + 1;
    let mut session = open_session(config, ctx.fresh_store("revisit")?)?;
    let home = session.current_cell();
    let baseline = ids_at(&session, home)?;
    let taken = *baseline
        .iter()
        .next_back()
        .ok_or_else(|| anyhow!("cache {home} generated no coins"))?;

    session.collect(home, &taken).context("collecting from home")?;
    let after_collect = ids_at(&session, home)?;

    stride(&mut session, Direction::East, away);
    ensure!(session.cache(home).is_none(), "home should retire after leaving");
    stride(&mut session, Direction::West, away);
    let restored = ids_at(&session, home)?;
    ensure!(
        restored == after_collect,
        "home regenerated: expected {after_collect:?}, found {restored:?}"
    );
    ensure!(!restored.contains(&taken), "collected coin reappeared");

    session.deposit(home, &taken).context("depositing at home")?;
    ensure!(ids_at(&session, home)? == baseline, "deposit did not restore home");
    ensure!(session.ledger().is_empty(), "ledger should be empty");
    let coins_accounted = session.audit()?;
    check_view(&session)?;
    ensure!(session.view().refreshes() == 2, "each coin action should refresh the cache");
    let focus = session.view().pans().len();
    ensure!(session.focus_home(&taken).is_some(), "home cache should be focusable");
    ensure!(session.view().pans().len() == focus + 1, "focusing should pan the map");

    Ok(WalkStats {
        steps: session.trail().len() - 1,
        collected: 1,
        deposited: 1,
        max_live: session.materialized().len(),
        coins_accounted,
    })
}
