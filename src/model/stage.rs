// Lifecycle stage of a case - the single source of truth for flags and status

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a case has been escalated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escalation {
    /// Internal review by staff
    Review,
    /// Filed with the Integrated Grievance Management System
    Igms,
    /// Escalated to the insurance ombudsman
    Ombudsman,
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escalation::Review => write!(f, "Review"),
            Escalation::Igms => write!(f, "IGMS"),
            Escalation::Ombudsman => write!(f, "Ombudsman"),
        }
    }
}

/// Lifecycle stage of a case.
///
/// Stored under the `stage` key of a case document as an internally tagged
/// object, e.g. `{"kind": "resolved", "from": "ombudsman"}`. Terminal stages
/// remember the furthest escalation reached so the legacy boolean flags can
/// be derived without storing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Created,
    UnderReview,
    InIgms,
    InOmbudsman,
    Resolved { from: Escalation },
    Rejected { during: Escalation },
}

/// Boolean view of a stage, matching the flags the dashboard screens read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageFlags {
    pub taken_for_review: bool,
    pub igms: bool,
    pub ombudsman: bool,
    pub solved: bool,
    pub rejected: bool,
}

impl Stage {
    /// The `kind` tag as stored, used by stage queries
    pub fn kind(&self) -> &'static str {
        match self {
            Stage::Created => "created",
            Stage::UnderReview => "under_review",
            Stage::InIgms => "in_igms",
            Stage::InOmbudsman => "in_ombudsman",
            Stage::Resolved { .. } => "resolved",
            Stage::Rejected { .. } => "rejected",
        }
    }

    /// Furthest escalation level this stage has passed through
    pub fn escalation(&self) -> Option<Escalation> {
        match self {
            Stage::Created => None,
            Stage::UnderReview => Some(Escalation::Review),
            Stage::InIgms => Some(Escalation::Igms),
            Stage::InOmbudsman => Some(Escalation::Ombudsman),
            Stage::Resolved { from } => Some(*from),
            Stage::Rejected { during } => Some(*during),
        }
    }

    pub fn flags(&self) -> StageFlags {
        let reached = |level: Escalation| self.escalation().is_some_and(|e| e >= level);
        StageFlags {
            taken_for_review: reached(Escalation::Review),
            igms: reached(Escalation::Igms),
            ombudsman: reached(Escalation::Ombudsman),
            solved: matches!(self, Stage::Resolved { .. }),
            rejected: matches!(self, Stage::Rejected { .. }),
        }
    }

    /// Human-readable status label shown on the dashboard
    pub fn status_label(&self) -> &'static str {
        match self {
            Stage::Created => "New Case",
            Stage::UnderReview => "Under Review",
            Stage::InIgms => "Case Accepted",
            Stage::InOmbudsman => "Sent in Ombudsman",
            Stage::Resolved { .. } => "Resolved",
            Stage::Rejected { during: Escalation::Review } => "Rejected in Review",
            Stage::Rejected { during: Escalation::Igms } => "Rejected in IGMS",
            Stage::Rejected { during: Escalation::Ombudsman } => "Rejected in Ombudsman",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Resolved { .. } | Stage::Rejected { .. })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_has_no_flags() {
        assert_eq!(Stage::Created.flags(), StageFlags::default());
    }

    #[test]
    fn flags_follow_escalation() {
        let flags = Stage::InIgms.flags();
        assert!(flags.taken_for_review);
        assert!(flags.igms);
        assert!(!flags.ombudsman);
        assert!(!flags.solved);

        let flags = Stage::Resolved { from: Escalation::Ombudsman }.flags();
        assert!(flags.taken_for_review && flags.igms && flags.ombudsman && flags.solved);
        assert!(!flags.rejected);

        let flags = Stage::Rejected { during: Escalation::Review }.flags();
        assert!(flags.taken_for_review);
        assert!(!flags.igms);
        assert!(flags.rejected);
    }

    #[test]
    fn stage_serializes_with_kind_tag() {
        let json = serde_json::to_value(Stage::Resolved { from: Escalation::Igms }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "resolved", "from": "igms"}));

        let parsed: Stage = serde_json::from_value(serde_json::json!({"kind": "under_review"})).unwrap();
        assert_eq!(parsed, Stage::UnderReview);
    }

    #[test]
    fn kind_matches_serialized_tag() {
        let stages = [
            Stage::Created,
            Stage::UnderReview,
            Stage::InIgms,
            Stage::InOmbudsman,
            Stage::Resolved { from: Escalation::Igms },
            Stage::Rejected { during: Escalation::Ombudsman },
        ];
        for stage in stages {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json["kind"], stage.kind());
        }
    }

    #[test]
    fn rejection_labels_name_the_stage() {
        assert_eq!(
            Stage::Rejected { during: Escalation::Igms }.status_label(),
            "Rejected in IGMS"
        );
        assert_eq!(Stage::InOmbudsman.to_string(), "Sent in Ombudsman");
    }
}
