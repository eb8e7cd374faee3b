// Case Lifecycle Module
//
// Stage rules live in a pure transition table; the engine runs them against
// a document store, stamping timestamps and log entries as it goes.

pub mod dashboard;
pub mod engine;
pub mod errors;
pub mod state_machine;
pub mod types;

#[cfg(test)]
mod tests;

pub use dashboard::{StageCounts, StageFilter};
pub use engine::{Clock, LifecycleEngine};
pub use errors::CaseError;
pub use state_machine::{available_events, next_stage, plan_transition};
pub use types::{CaseEvent, FollowUpStage, OmbudsmanUpdate, TransitionOutcome};
