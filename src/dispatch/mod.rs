//! Document & notification dispatcher.
//!
//! Generates consent/contract documents for a case, emails them to the
//! claimant with a signing link, and fronts the other HTTP endpoints of the
//! hosting service (case lookup by email, staff sign-in).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::model::{Case, DocumentKind};

pub mod client;

pub use client::HttpDispatcher;

/// Errors from the document & notification service
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Missing required document fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Case fields merged into a document template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFields {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
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
    pub estimated_claim_amount: Option<String>,
}

impl DocumentFields {
    pub fn from_case(case: &Case) -> Self {
        let facts = &case.facts;
        Self {
            name: facts.name.clone(),
            email: facts.email.clone().unwrap_or_default(),
            mobile: facts.mobile.clone(),
            address: facts.address.clone(),
            policy_holder: facts.policy_holder.clone(),
            company_name: facts.company_name.clone(),
            policy_no: facts.policy_no.clone(),
            claim_no: facts.claim_no.clone(),
            estimated_claim_amount: facts.estimated_claim_amount.map(|a| a.to_string()),
        }
    }

    /// Check the fields each template needs before calling the service
    pub fn validate(&self, kind: DocumentKind) -> Result<(), DispatchError> {
        let blank = |value: Option<&str>| value.map_or(true, |v| v.trim().is_empty());

        let mut missing = Vec::new();
        if blank(Some(&self.name)) {
            missing.push("name");
        }
        if blank(Some(&self.email)) {
            missing.push("email");
        }
        if blank(self.policy_no.as_deref()) {
            missing.push("policyNo");
        }
        if kind == DocumentKind::Contract {
            if blank(self.claim_no.as_deref()) {
                missing.push("claimNo");
            }
            if blank(self.estimated_claim_amount.as_deref()) {
                missing.push("estimatedClaimAmount");
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::MissingFields(missing))
        }
    }
}

/// Result of a successful sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub user_id: String,
    pub token: String,
    /// `staff` or `partner`
    pub role: String,
    /// Set for partner accounts
    pub partner_ref: Option<String>,
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait DocumentDispatcher: Send + Sync {
    /// Render the document, store it, email it with a signing link and
    /// return the stored document URL
    async fn generate_and_send(
        &self,
        kind: DocumentKind,
        case_id: &str,
        email: &str,
        fields: &DocumentFields,
    ) -> Result<String, DispatchError>;

    /// Email an already generated document
    async fn send_document(&self, url: &str, email: &str) -> Result<(), DispatchError>;

    /// Find the case id registered for a claimant email
    async fn lookup_case_id(&self, email: &str) -> Result<Option<String>, DispatchError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionGrant, DispatchError>;
}
