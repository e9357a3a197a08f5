pub mod reports;
pub mod tester;
pub mod walker;

pub use tester::{LogicTester, ScenarioResult};
pub use walker::{Session, WalkStats, check_view, open_session, random_walk, stride};
