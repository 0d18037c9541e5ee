//! Migration logic
//!
//! - [`permission`] maps source permission tokens to target access levels
//! - [`gateway`] gives target operations create-or-reuse semantics
//! - [`orchestrator`] sequences a run with per-unit fault isolation
//! - [`report`] records what happened to every unit

pub mod defaults;
pub mod gateway;
pub mod orchestrator;
pub mod permission;
pub mod report;

pub use defaults::MigrationDefaults;
pub use gateway::TargetGateway;
pub use orchestrator::{MigrationPlan, Migrator};
