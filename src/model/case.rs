// The case record: one insurance-claim complaint tracked through the lifecycle

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::amount::Amount;
use super::document::{DocumentKind, FileRecord, Signature};
use super::logs::{LogChannel, LogEntry};
use super::stage::{Stage, StageFlags};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));

/// Document key of the ombudsman complaint number
pub const COMPLAINT_NO_FIELD: &str = "ombudsmanComplaintNo";
/// Older records spell the complaint number key this way
pub const LEGACY_COMPLAINT_NO_FIELD: &str = "ombudsmanComplaintNumber";

/// Contact and claim facts captured on the case form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseFacts {
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub policy_holder: Option<String>,
    pub company_name: Option<String>,
    pub policy_no: Option<String>,
    pub claim_no: Option<String>,
    pub partner_ref: Option<String>,
    pub estimated_claim_amount: Option<Amount>,
    pub claim: Option<String>,
    pub commission_received: Option<Amount>,
    pub partner_commission: Option<Amount>,
}

impl CaseFacts {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Check the fields the create-case form requires
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(mobile) = &self.mobile {
            validate_mobile(mobile)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), String> {
    if EMAIL_PATTERN.is_match(email.trim()) {
        Ok(())
    } else {
        Err(format!("'{email}' is not a valid email address"))
    }
}

pub(crate) fn validate_mobile(mobile: &str) -> Result<(), String> {
    let digits = mobile.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = mobile
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'));
    if allowed && (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(format!("'{mobile}' is not a valid mobile number"))
    }
}

/// Input for creating a case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    #[serde(flatten)]
    pub facts: CaseFacts,
    pub complaint_date: Option<NaiveDate>,
}

/// A case as stored in the `cases` collection.
///
/// The legacy `status` text and the lifecycle booleans are not fields here;
/// both are derived from [`Stage`] by [`Case::status`] and [`Case::flags`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Case {
    pub id: String,
    #[serde(flatten)]
    pub facts: CaseFacts,
    pub stage: Stage,
    pub document_short: bool,
    pub six_a_form_submitted: bool,

    // Stage timestamps
    pub complaint_date: Option<NaiveDate>,
    pub review_date: Option<DateTime<Utc>>,
    pub case_acceptance_date: Option<DateTime<Utc>>,
    pub case_rejection_date: Option<DateTime<Utc>>,
    pub igms_date: Option<DateTime<Utc>>,
    pub igms_follow_up_date: Option<NaiveDate>,
    pub ombudsman_date: Option<DateTime<Utc>>,
    pub ombudsman_courier_date: Option<NaiveDate>,
    pub ombudsman_follow_up_date: Option<NaiveDate>,
    pub solved_date: Option<DateTime<Utc>>,

    pub case_rejection_reason: Option<String>,
    pub igms_rejection_reason: Option<String>,
    pub ombudsman_rejection_reason: Option<String>,

    #[serde(alias = "ombudsmanComplaintNumber")]
    pub ombudsman_complaint_no: Option<String>,
    pub ombudsman_mode: Option<String>,

    // Artifacts
    pub file_bucket: Vec<FileRecord>,
    pub consent_form: Option<String>,
    pub contract: Option<String>,
    pub signature: Option<Signature>,
    pub contract_signature: Option<Signature>,
    pub consent_signed: bool,
    pub contract_signed: bool,
    pub consent_signature_date: Option<DateTime<Utc>>,
    pub contract_signature_date: Option<DateTime<Utc>>,

    // Log channels
    pub main_logs: Vec<LogEntry>,
    pub internal_logs: Vec<LogEntry>,
    pub igms_logs: Vec<LogEntry>,
    pub ombudsman_logs: Vec<LogEntry>,

    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Case {
    /// Build a fresh case at [`Stage::Created`] with empty log channels.
    /// The id is assigned by the store on create.
    pub fn new(input: NewCase, now: DateTime<Utc>) -> Self {
        Self {
            facts: input.facts,
            complaint_date: Some(input.complaint_date.unwrap_or_else(|| now.date_naive())),
            created_at: Some(now),
            last_updated: Some(now),
            ..Default::default()
        }
    }

    pub fn flags(&self) -> StageFlags {
        self.stage.flags()
    }

    pub fn status(&self) -> &'static str {
        self.stage.status_label()
    }

    pub fn logs(&self, channel: LogChannel) -> &[LogEntry] {
        match channel {
            LogChannel::Main => &self.main_logs,
            LogChannel::Internal => &self.internal_logs,
            LogChannel::Igms => &self.igms_logs,
            LogChannel::Ombudsman => &self.ombudsman_logs,
        }
    }

    pub fn document(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::Consent => self.consent_form.as_deref(),
            DocumentKind::Contract => self.contract.as_deref(),
        }
    }

    pub fn is_signed(&self, kind: DocumentKind) -> bool {
        match kind {
            DocumentKind::Consent => self.consent_signed,
            DocumentKind::Contract => self.contract_signed,
        }
    }

    /// Serialize to the stored document form, including the derived `status`
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut document = serde_json::to_value(self)?;
        if let Some(object) = document.as_object_mut() {
            object.insert("status".to_string(), self.status().into());
        }
        Ok(document)
    }

    pub fn from_document(mut document: serde_json::Value) -> Result<Self, serde_json::Error> {
        // The canonical key wins when a record carries both spellings
        if let Some(object) = document.as_object_mut() {
            if object.contains_key(COMPLAINT_NO_FIELD) {
                object.remove(LEGACY_COMPLAINT_NO_FIELD);
            }
        }
        serde_json::from_value(document)
    }
}

/// Form-driven edit of contact/claim facts; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFactsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_claim_amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_received: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_commission: Option<Amount>,
}

impl CaseFactsPatch {
    pub fn is_empty(&self) -> bool {
        *self == CaseFactsPatch::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name cannot be blank".to_string());
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(mobile) = &self.mobile {
            validate_mobile(mobile)?;
        }
        Ok(())
    }
}
