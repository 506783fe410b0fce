pub mod game_tester;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use game_tester::GameTester;
pub use policy::GameplayStrategy;
pub use seeds::resolve_seed_inputs;
pub use tester::{LogicTester, ScenarioResult};
