// Domain records stored in the document store

pub mod amount;
pub mod case;
pub mod document;
pub mod enquiry;
pub mod logs;
pub mod partner;
pub mod stage;

pub use amount::{Amount, AmountParseError};
pub use case::{Case, CaseFacts, CaseFactsPatch, NewCase};
pub use document::{DocumentKind, FileRecord, Signature};
pub use enquiry::{Enquiry, NewEnquiry};
pub use logs::{LogChannel, LogEntry};
pub use partner::{partner_ref, NewPartner, Partner};
pub use stage::{Escalation, Stage, StageFlags};
