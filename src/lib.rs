// Casedesk Library - Insurance Complaint Case Management
// This exposes the lifecycle engine and its collaborators for the CLI and tests

pub mod case_lifecycle;
pub mod config;
pub mod dispatch;
pub mod model;
pub mod observability;
pub mod partners;
pub mod session;
pub mod signature;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use case_lifecycle::{
    CaseError, CaseEvent, FollowUpStage, LifecycleEngine, OmbudsmanUpdate, StageCounts, StageFilter,
    TransitionOutcome,
};
pub use config::CaseDeskConfig;
pub use dispatch::{DispatchError, DocumentDispatcher, DocumentFields, HttpDispatcher};
pub use model::{Case, DocumentKind, LogChannel, LogEntry, NewCase, Stage};
pub use observability::{LifecycleMetrics, OperationTimer};
pub use partners::PartnerRegistry;
pub use session::{Role, Session};
pub use signature::SignatureCollector;
pub use store::{Collection, DocumentStore, FileStore, MemoryStore, Patch, StoreError};
pub use telemetry::{create_case_span, generate_correlation_id, init_telemetry};
