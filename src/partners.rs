// Partner registry: referring agents and the cases carrying their reference

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::case_lifecycle::CaseError;
use crate::model::case::{validate_email, validate_mobile};
use crate::model::{Case, NewPartner, Partner};
use crate::session::Session;
use crate::store::{Collection, DocumentStore, Predicate};

pub struct PartnerRegistry {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl PartnerRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Register a partner. The reference is derived from name and phone and
    /// must not collide with an existing partner.
    pub async fn create_partner(&self, session: &Session, input: NewPartner) -> Result<Partner, CaseError> {
        session.require_staff("create_partner")?;
        if input.name.trim().is_empty() {
            return Err(CaseError::validation("partner name is required"));
        }
        validate_email(&input.email).map_err(CaseError::validation)?;
        validate_mobile(&input.phone_number).map_err(CaseError::validation)?;

        let mut partner = Partner::new(input, (self.clock)());
        if self.find_by_ref(&partner.partner_ref).await?.is_some() {
            return Err(CaseError::validation(format!(
                "partner reference {} is already registered",
                partner.partner_ref
            )));
        }

        partner.id = self
            .store
            .create(Collection::Partners, serde_json::to_value(&partner)?)
            .await?;
        info!(partner.id = %partner.id, partner_ref = %partner.partner_ref, "Partner registered");
        Ok(partner)
    }

    /// Staff may read any partner; a partner only their own record
    pub async fn get_partner(&self, session: &Session, id: &str) -> Result<Partner, CaseError> {
        let document = self
            .store
            .get(Collection::Partners, id)
            .await?
            .ok_or_else(|| CaseError::not_found(Collection::Partners, id))?;
        let partner: Partner = serde_json::from_value(document)?;

        match session.partner_ref() {
            Some(own) if own != partner.partner_ref => Err(CaseError::permission_denied("get_partner")),
            _ => Ok(partner),
        }
    }

    /// All partners, oldest first
    pub async fn list_partners(&self, session: &Session) -> Result<Vec<Partner>, CaseError> {
        session.require_staff("list_partners")?;
        let mut partners = self
            .store
            .query(Collection::Partners, &[])
            .await?
            .into_iter()
            .map(serde_json::from_value::<Partner>)
            .collect::<Result<Vec<_>, _>>()?;
        partners.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(partners)
    }

    async fn find_by_ref(&self, partner_ref: &str) -> Result<Option<Partner>, CaseError> {
        let found = self
            .store
            .query(Collection::Partners, &[Predicate::equals("partnerRef", partner_ref)])
            .await?
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?;
        Ok(found)
    }

    /// Cases referencing a partner, newest first. Partners may only ask
    /// about themselves.
    pub async fn cases_for_partner(&self, session: &Session, partner_ref: &str) -> Result<Vec<Case>, CaseError> {
        if let Some(own) = session.partner_ref() {
            if own != partner_ref {
                return Err(CaseError::permission_denied("cases_for_partner"));
            }
        }

        let mut cases = self
            .store
            .query(Collection::Cases, &[Predicate::equals("partnerRef", partner_ref)])
            .await?
            .into_iter()
            .map(Case::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }
}
