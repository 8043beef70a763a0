// Run state: persisted column layouts

pub mod manager;
pub mod run_state;

pub use manager::StateManager;
pub use run_state::RunState;
