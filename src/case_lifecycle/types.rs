// Core types for the case lifecycle state machine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::Stage;
use crate::store::Patch;

/// Stage transitions a caller can request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseEvent {
    SendToReview,
    SendToIgms {
        rejection_reason: Option<String>,
        document_short: Option<bool>,
    },
    RejectInReview {
        reason: Option<String>,
    },
    RejectInIgms {
        reason: Option<String>,
    },
    SendToOmbudsman {
        case_rejection_reason: Option<String>,
        igms_rejection_reason: Option<String>,
    },
    RejectInOmbudsman {
        reason: Option<String>,
    },
    MarkResolved,
}

impl CaseEvent {
    /// Operation name used in errors and log spans
    pub fn operation(&self) -> &'static str {
        match self {
            CaseEvent::SendToReview => "send_to_review",
            CaseEvent::SendToIgms { .. } => "send_to_igms",
            CaseEvent::RejectInReview { .. } => "reject_in_review",
            CaseEvent::RejectInIgms { .. } => "reject_in_igms",
            CaseEvent::SendToOmbudsman { .. } => "send_to_ombudsman",
            CaseEvent::RejectInOmbudsman { .. } => "reject_in_ombudsman",
            CaseEvent::MarkResolved => "mark_resolved",
        }
    }

    /// Rejection reason that belongs in the automatic log entry
    pub(crate) fn rejection_reason(&self) -> Option<&str> {
        match self {
            CaseEvent::RejectInReview { reason }
            | CaseEvent::RejectInIgms { reason }
            | CaseEvent::RejectInOmbudsman { reason } => reason.as_deref(),
            _ => None,
        }
    }
}

/// Lenient merge of ombudsman filing details; never moves the stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmbudsmanUpdate {
    pub courier_date: Option<NaiveDate>,
    pub complaint_no: Option<String>,
    pub six_a_form_submitted: Option<bool>,
    pub mode: Option<String>,
    pub rejection_reason: Option<String>,
}

impl OmbudsmanUpdate {
    pub fn is_empty(&self) -> bool {
        *self == OmbudsmanUpdate::default()
    }
}

/// Regulatory stage a follow-up date belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStage {
    Igms,
    Ombudsman,
}

impl FollowUpStage {
    pub fn field(&self) -> &'static str {
        match self {
            FollowUpStage::Igms => "igmsFollowUpDate",
            FollowUpStage::Ombudsman => "ombudsmanFollowUpDate",
        }
    }

    /// Stage the case must be in for the follow-up to make sense
    pub fn required_stage(&self) -> Stage {
        match self {
            FollowUpStage::Igms => Stage::InIgms,
            FollowUpStage::Ombudsman => Stage::InOmbudsman,
        }
    }
}

impl fmt::Display for FollowUpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowUpStage::Igms => write!(f, "IGMS"),
            FollowUpStage::Ombudsman => write!(f, "Ombudsman"),
        }
    }
}

impl FromStr for FollowUpStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "igms" => Ok(FollowUpStage::Igms),
            "ombudsman" => Ok(FollowUpStage::Ombudsman),
            other => Err(format!("unknown follow-up stage '{other}' (expected igms or ombudsman)")),
        }
    }
}

/// What a successful transition did
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub case_id: String,
    pub from: Stage,
    pub to: Stage,
    /// The exact patch written to the store
    pub patch: Patch,
}
