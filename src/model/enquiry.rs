// Customer enquiries submitted through the public form, later promoted to cases

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::case::{CaseFacts, NewCase};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnquiry {
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub policy_no: Option<String>,
    pub message: Option<String>,
    pub partner_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub details: NewEnquiry,
    pub created_at: DateTime<Utc>,
}

impl Enquiry {
    pub fn new(details: NewEnquiry, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            details,
            created_at: now,
        }
    }

    /// Carry the enquiry's facts into a new case. The enquiry message
    /// becomes the claim description; the complaint date is the day the
    /// enquiry arrived.
    pub fn to_new_case(&self) -> NewCase {
        let d = &self.details;
        NewCase {
            facts: CaseFacts {
                name: d.name.clone(),
                mobile: d.mobile.clone(),
                email: d.email.clone(),
                company_name: d.company_name.clone(),
                policy_no: d.policy_no.clone(),
                partner_ref: d.partner_ref.clone(),
                claim: d.message.clone(),
                ..Default::default()
            },
            complaint_date: Some(self.created_at.date_naive()),
        }
    }
}
