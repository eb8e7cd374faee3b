// Public signature capture: writes straight onto the case, outside the stage rules

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::case_lifecycle::state_machine::timestamp;
use crate::case_lifecycle::CaseError;
use crate::model::{Case, DocumentKind, Signature};
use crate::store::{Collection, DocumentStore, Patch};

pub struct SignatureCollector {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl SignatureCollector {
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

    /// Store a claimant's signature for a consent form or contract.
    ///
    /// Each document kind can be signed once; the signing page is public so
    /// no session is involved.
    pub async fn record_signature(
        &self,
        case_id: &str,
        kind: DocumentKind,
        signature: Signature,
    ) -> Result<Patch, CaseError> {
        if signature.is_blank() {
            return Err(CaseError::validation("signature is empty"));
        }

        let document = self
            .store
            .get(Collection::Cases, case_id)
            .await?
            .ok_or_else(|| CaseError::not_found(Collection::Cases, case_id))?;
        let case = Case::from_document(document)?;
        if case.is_signed(kind) {
            return Err(CaseError::PreconditionFailed {
                operation: format!("sign {}", kind.as_str()),
                stage: "already signed".to_string(),
            });
        }

        let now = (self.clock)();
        let mut patch = Patch::new();
        patch
            .set(kind.signature_field(), serde_json::to_value(&signature)?)
            .set(kind.signature_date_field(), timestamp(now))
            .set(kind.signed_flag_field(), Value::Bool(true))
            .set("lastUpdated", timestamp(now));

        self.store.patch(Collection::Cases, case_id, &patch).await?;
        info!(case.id = %case_id, kind = kind.as_str(), "Signature recorded");
        Ok(patch)
    }
}
