// Caller identity passed explicitly to every engine operation

use serde::{Deserialize, Serialize};

use crate::case_lifecycle::CaseError;
use crate::dispatch::SessionGrant;
use crate::model::Case;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    /// Back-office staff; may run every operation
    Staff,
    /// Referring partner; limited to cases carrying their reference
    Partner { partner_ref: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub token: Option<String>,
}

impl Session {
    pub fn staff(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role: Role::Staff,
            token: None,
        }
    }

    pub fn partner(
        user_id: impl Into<String>,
        email: impl Into<String>,
        partner_ref: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role: Role::Partner {
                partner_ref: partner_ref.into(),
            },
            token: None,
        }
    }

    /// Build a session from a sign-in answer. Unknown roles and partner
    /// grants without a reference are refused.
    pub fn from_grant(email: &str, grant: SessionGrant) -> Result<Self, CaseError> {
        let role = match (grant.role.as_str(), grant.partner_ref) {
            ("staff", _) => Role::Staff,
            ("partner", Some(partner_ref)) => Role::Partner { partner_ref },
            (other, _) => {
                return Err(CaseError::validation(format!(
                    "sign-in returned unusable role '{other}'"
                )))
            }
        };
        Ok(Self {
            user_id: grant.user_id,
            email: email.to_string(),
            role,
            token: Some(grant.token),
        })
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Staff)
    }

    pub fn partner_ref(&self) -> Option<&str> {
        match &self.role {
            Role::Staff => None,
            Role::Partner { partner_ref } => Some(partner_ref),
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self.role {
            Role::Staff => "staff",
            Role::Partner { .. } => "partner",
        }
    }

    pub fn require_staff(&self, operation: &str) -> Result<(), CaseError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(CaseError::permission_denied(operation))
        }
    }

    /// Staff see every case; partners only those referencing them
    pub fn can_access(&self, case: &Case) -> bool {
        match &self.role {
            Role::Staff => true,
            Role::Partner { partner_ref } => case.facts.partner_ref.as_deref() == Some(partner_ref),
        }
    }
}
