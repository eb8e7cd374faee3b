//! Pure transition table for the case lifecycle.
//!
//! ```text
//! Created -> UnderReview -> InIgms -> InOmbudsman -> Resolved
//!                 |           |  \          |
//!                 v           v   Resolved  v
//!          Rejected(Review) Rejected(IGMS) Rejected(Ombudsman)
//! ```
//!
//! Nothing here touches the store: [`plan_transition`] turns the current
//! stage and a requested [`CaseEvent`] into the next stage and the field
//! patch that records it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::errors::CaseError;
use super::types::CaseEvent;
use crate::model::{Escalation, LogChannel, LogEntry, Stage};
use crate::store::Patch;

/// Stage reached by applying `event` to `current`, or `None` when the
/// transition is not allowed
pub fn next_stage(current: Stage, event: &CaseEvent) -> Option<Stage> {
    use CaseEvent::*;

    match (current, event) {
        (Stage::Created, SendToReview) => Some(Stage::UnderReview),
        (Stage::UnderReview, SendToIgms { .. }) => Some(Stage::InIgms),
        (Stage::UnderReview, RejectInReview { .. }) => Some(Stage::Rejected {
            during: Escalation::Review,
        }),
        (Stage::InIgms, SendToOmbudsman { .. }) => Some(Stage::InOmbudsman),
        (Stage::InIgms, RejectInIgms { .. }) => Some(Stage::Rejected {
            during: Escalation::Igms,
        }),
        (Stage::InIgms, MarkResolved) => Some(Stage::Resolved {
            from: Escalation::Igms,
        }),
        (Stage::InOmbudsman, RejectInOmbudsman { .. }) => Some(Stage::Rejected {
            during: Escalation::Ombudsman,
        }),
        (Stage::InOmbudsman, MarkResolved) => Some(Stage::Resolved {
            from: Escalation::Ombudsman,
        }),
        _ => None,
    }
}

/// Events the engine would accept for a case at `stage`
pub fn available_events(stage: Stage) -> Vec<&'static str> {
    let candidates = [
        CaseEvent::SendToReview,
        CaseEvent::SendToIgms {
            rejection_reason: None,
            document_short: None,
        },
        CaseEvent::RejectInReview { reason: None },
        CaseEvent::SendToOmbudsman {
            case_rejection_reason: None,
            igms_rejection_reason: None,
        },
        CaseEvent::RejectInIgms { reason: None },
        CaseEvent::RejectInOmbudsman { reason: None },
        CaseEvent::MarkResolved,
    ];
    candidates
        .iter()
        .filter(|event| next_stage(stage, event).is_some())
        .map(CaseEvent::operation)
        .collect()
}

pub(crate) fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn text(value: &Option<String>) -> Option<Value> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| Value::String(v.to_string()))
}

/// Validate `event` against `current` and build the patch that applies it.
///
/// The patch moves `stage`, refreshes the denormalised `status` label,
/// stamps the stage timestamps and `lastUpdated`, carries caller-supplied
/// reasons, and appends an automatic entry to the main log channel.
pub fn plan_transition(
    current: Stage,
    event: &CaseEvent,
    now: DateTime<Utc>,
) -> Result<(Stage, Patch), CaseError> {
    let next = next_stage(current, event)
        .ok_or_else(|| CaseError::precondition(event.operation(), current))?;

    let at = timestamp(now);
    let mut patch = Patch::new();
    patch
        .set("stage", serde_json::to_value(next)?)
        .set("status", Value::String(next.status_label().to_string()))
        .set("lastUpdated", at.clone());

    match event {
        CaseEvent::SendToReview => {
            patch.set("reviewDate", at.clone());
        }
        CaseEvent::SendToIgms {
            rejection_reason,
            document_short,
        } => {
            patch
                .set("igmsDate", at.clone())
                .set("caseAcceptanceDate", at.clone())
                .set_some("caseRejectionReason", text(rejection_reason))
                .set_some("documentShort", document_short.map(Value::Bool));
        }
        CaseEvent::SendToOmbudsman {
            case_rejection_reason,
            igms_rejection_reason,
        } => {
            patch
                .set("ombudsmanDate", at.clone())
                .set_some("caseRejectionReason", text(case_rejection_reason))
                .set_some("igmsRejectionReason", text(igms_rejection_reason));
        }
        CaseEvent::RejectInReview { reason } => {
            patch
                .set("caseRejectionDate", at.clone())
                .set_some("caseRejectionReason", text(reason));
        }
        CaseEvent::RejectInIgms { reason } => {
            patch
                .set("caseRejectionDate", at.clone())
                .set_some("igmsRejectionReason", text(reason));
        }
        CaseEvent::RejectInOmbudsman { reason } => {
            patch
                .set("caseRejectionDate", at.clone())
                .set_some("ombudsmanRejectionReason", text(reason));
        }
        CaseEvent::MarkResolved => {
            patch.set("solvedDate", at.clone());
        }
    }

    let remark = match event.rejection_reason().map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("Moved to {}: {}", next.status_label(), reason),
        None => format!("Moved to {}", next.status_label()),
    };
    patch.append(
        LogChannel::Main.field(),
        serde_json::to_value(LogEntry::new(now, remark))?,
    );

    Ok((next, patch))
}
