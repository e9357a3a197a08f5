//! Seeded random walks through a live session.
use anyhow::{Context, Result, anyhow, ensure};
use geocoin_game::{Direction, GameConfig, GeocoinGame, GridCell, TokenId};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::map::RecordingMap;
use crate::store::TesterStore;

pub type Session = GeocoinGame<TesterStore, RecordingMap>;

const COLLECT_CHANCE: f64 = 0.35;
const DEPOSIT_CHANCE: f64 = 0.2;

/// Start or resume a session over `store`.
pub fn open_session(config: GameConfig, store: TesterStore) -> Result<Session> {
    GeocoinGame::new(config, store, RecordingMap::default()).context("session rejected config")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    pub steps: usize,
    pub collected: usize,
    pub deposited: usize,
    pub max_live: usize,
    pub coins_accounted: usize,
}

impl WalkStats {
    pub fn absorb(&mut self, other: Self) {
        self.steps += other.steps;
        self.collected += other.collected;
        self.deposited += other.deposited;
        self.max_live = self.max_live.max(other.max_live);
        self.coins_accounted = other.coins_accounted;
    }
}

/// The renderer must show exactly the materialized caches.
pub fn check_view(session: &Session) -> Result<()> {
    let view = session.view();
    if let Some(anomaly) = view.anomalies().first() {
        return Err(anyhow!("map anomaly: {anomaly}"));
    }
    ensure!(
        view.visible() == session.materialized(),
        "map shows {} caches but {} are materialized",
        view.visible().len(),
        session.materialized().len()
    );
    ensure!(
        view.player() == Some(session.position()),
        "map player marker is out of date"
    );
    ensure!(
        view.trail_len() == session.trail().len(),
        "map trail has {} points, session has {}",
        view.trail_len(),
        session.trail().len()
    );
    Ok(())
}

fn try_collect(session: &mut Session, rng: &mut ChaCha8Rng) -> Result<bool> {
    let candidates: Vec<(GridCell, TokenId)> = session
        .materialized()
        .into_iter()
        .filter_map(|cell| {
            let cache = session.cache(cell)?;
            cache.coins().choose(rng).map(|coin| (cell, coin.id))
        })
        .collect();
    let Some(&(cell, id)) = candidates.choose(rng) else {
        return Ok(false);
    };
    session
        .collect(cell, &id)
        .with_context(|| format!("collecting {id} from {cell}"))?;
    Ok(true)
}

fn try_deposit(session: &mut Session, rng: &mut ChaCha8Rng) -> Result<bool> {
    let held: Vec<TokenId> = session
        .ledger()
        .entries()
        .iter()
        .map(|entry| entry.coin.id)
        .collect();
    let live = session.materialized();
    let (Some(&id), Some(&cell)) = (held.choose(rng), live.choose(rng)) else {
        return Ok(false);
    };
    session
        .deposit(cell, &id)
        .with_context(|| format!("depositing {id} into {cell}"))?;
    Ok(true)
}

/// Wander for `steps` moves, collecting and depositing at random, and audit
/// token conservation after every step.
pub fn random_walk(session: &mut Session, rng: &mut ChaCha8Rng, steps: usize) -> Result<WalkStats> {
    let mut stats = WalkStats::default();
    for step in 0..steps {
        let direction = *Direction::ALL
            .choose(rng)
            .ok_or_else(|| anyhow!("no directions"))?;
        session.move_by(direction);
        if rng.gen_bool(COLLECT_CHANCE) && try_collect(session, rng)? {
            stats.collected += 1;
        }
        if rng.gen_bool(DEPOSIT_CHANCE) && try_deposit(session, rng)? {
            stats.deposited += 1;
        }
        stats.steps += 1;
        stats.max_live = stats.max_live.max(session.materialized().len());
        stats.coins_accounted = session
            .audit()
            .with_context(|| format!("audit after step {} ({direction})", step + 1))?;
        check_view(session).with_context(|| format!("view after step {}", step + 1))?;
        log::trace!("step {} {direction} -> {}", step + 1, session.current_cell());
    }
    Ok(stats)
}

/// Walk `steps` tiles in one direction.
pub fn stride(session: &mut Session, direction: Direction, steps: u32) {
    for _ in 0..steps {
        session.move_by(direction);
    }
}
