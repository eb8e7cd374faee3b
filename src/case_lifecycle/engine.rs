use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

use super::dashboard::{StageCounts, StageFilter};
use super::errors::CaseError;
use super::state_machine::{plan_transition, timestamp};
use super::types::{CaseEvent, FollowUpStage, OmbudsmanUpdate, TransitionOutcome};
use crate::dispatch::{DocumentDispatcher, DocumentFields};
use crate::model::case::{
    validate_email, validate_mobile, COMPLAINT_NO_FIELD, LEGACY_COMPLAINT_NO_FIELD,
};
use crate::model::{
    Case, CaseFactsPatch, DocumentKind, Enquiry, FileRecord, LogChannel, LogEntry, NewCase,
    NewEnquiry,
};
use crate::observability::{LifecycleMetrics, OperationTimer};
use crate::session::Session;
use crate::store::{Collection, DocumentStore, Patch, Predicate, StoreError};
use crate::telemetry::{create_case_span, generate_correlation_id};

/// Source of "now" for timestamps
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The case lifecycle engine.
///
/// Every mutation of a case goes through here, so stage rules, timestamps
/// and log entries are enforced in one place. Each operation performs at
/// most one read and one patch against the store; there is no retry and no
/// conflict detection between concurrent writers (last write wins).
#[derive(Clone)]
pub struct LifecycleEngine {
    store: Arc<dyn DocumentStore>,
    clock: Clock,
    metrics: Arc<LifecycleMetrics>,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            clock: Arc::new(Utc::now),
            metrics: Arc::new(LifecycleMetrics::new()),
        }
    }

    /// Count into a metrics set shared with other components
    pub fn with_metrics(mut self, metrics: Arc<LifecycleMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the wall clock, mainly for tests
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn metrics(&self) -> &LifecycleMetrics {
        &self.metrics
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn span(&self, operation: &str, case_id: Option<&str>, session: &Session) -> tracing::Span {
        create_case_span(operation, case_id, session.role_name(), &generate_correlation_id())
    }

    /// Convert a store result, counting every failure except a missing document
    fn tracked<T>(&self, result: Result<T, StoreError>) -> Result<T, CaseError> {
        result.map_err(|e| {
            if !matches!(e, StoreError::NotFound { .. }) {
                self.metrics.record_store_error();
                warn!(error = %e, "Case store operation failed");
            }
            CaseError::from(e)
        })
    }

    async fn load(&self, id: &str) -> Result<Case, CaseError> {
        let document = self
            .tracked(self.store.get(Collection::Cases, id).await)?
            .ok_or_else(|| CaseError::not_found(Collection::Cases, id))?;
        Ok(Case::from_document(document)?)
    }

    async fn load_visible(&self, session: &Session, id: &str, operation: &str) -> Result<Case, CaseError> {
        let case = self.load(id).await?;
        if !session.can_access(&case) {
            return Err(CaseError::permission_denied(operation));
        }
        Ok(case)
    }

    async fn write(&self, id: &str, patch: &Patch) -> Result<(), CaseError> {
        self.tracked(self.store.patch(Collection::Cases, id, patch).await)
    }

    /// Create a case at the `Created` stage and return its id
    pub async fn create_case(&self, session: &Session, mut input: NewCase) -> Result<String, CaseError> {
        let span = self.span("create_case", None, session);
        async {
            if let Some(own) = session.partner_ref() {
                match input.facts.partner_ref.as_deref() {
                    None => input.facts.partner_ref = Some(own.to_string()),
                    Some(given) if given == own => {}
                    Some(_) => return Err(CaseError::permission_denied("create_case")),
                }
            }
            input.facts.validate().map_err(CaseError::validation)?;

            let case = Case::new(input, self.now());
            let id = self.tracked(self.store.create(Collection::Cases, case.to_document()?).await)?;
            info!(case.id = %id, "Case created");
            Ok(id)
        }
        .instrument(span)
        .await
    }

    pub async fn get_case(&self, session: &Session, id: &str) -> Result<Case, CaseError> {
        self.load_visible(session, id, "get_case")
            .instrument(self.span("get_case", Some(id), session))
            .await
    }

    /// Cases on one dashboard tab, newest first. Partners only see their own.
    pub async fn list_cases(&self, session: &Session, filter: StageFilter) -> Result<Vec<Case>, CaseError> {
        let span = self.span("list_cases", None, session);
        async {
            let mut predicates = filter.predicates();
            if let Some(own) = session.partner_ref() {
                predicates.push(Predicate::equals("partnerRef", own));
            }

            let mut cases = self
                .tracked(self.store.query(Collection::Cases, &predicates).await)?
                .into_iter()
                .map(Case::from_document)
                .collect::<Result<Vec<_>, _>>()?;
            cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            debug!(filter = %filter, count = cases.len(), "Listed cases");
            Ok::<_, CaseError>(cases)
        }
        .instrument(span)
        .await
    }

    pub async fn stage_counts(&self, session: &Session) -> Result<StageCounts, CaseError> {
        session.require_staff("stage_counts")?;
        let cases = self.list_cases(session, StageFilter::All).await?;
        Ok(StageCounts::tally(&cases))
    }

    /// Validate and apply a stage transition
    pub async fn transition(
        &self,
        session: &Session,
        id: &str,
        event: CaseEvent,
    ) -> Result<TransitionOutcome, CaseError> {
        let operation = event.operation();
        let span = self.span(operation, Some(id), session);
        async {
            session.require_staff(operation)?;
            let timer = OperationTimer::new(operation);

            let case = self.load(id).await?;
            let (to, patch) = match plan_transition(case.stage, &event, self.now()) {
                Ok(planned) => planned,
                Err(e) => {
                    self.metrics.record_refusal();
                    warn!(stage = %case.stage, "Transition refused");
                    return Err(e);
                }
            };

            self.write(id, &patch).await?;
            self.metrics.record_transition();
            info!(from = %case.stage, to = %to, "Case moved");
            timer.finish();

            Ok(TransitionOutcome {
                case_id: id.to_string(),
                from: case.stage,
                to,
                patch,
            })
        }
        .instrument(span)
        .await
    }

    pub async fn send_to_review(&self, session: &Session, id: &str) -> Result<TransitionOutcome, CaseError> {
        self.transition(session, id, CaseEvent::SendToReview).await
    }

    pub async fn send_to_igms(
        &self,
        session: &Session,
        id: &str,
        rejection_reason: Option<String>,
        document_short: Option<bool>,
    ) -> Result<TransitionOutcome, CaseError> {
        let event = CaseEvent::SendToIgms {
            rejection_reason,
            document_short,
        };
        self.transition(session, id, event).await
    }

    pub async fn reject_in_review(
        &self,
        session: &Session,
        id: &str,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, CaseError> {
        self.transition(session, id, CaseEvent::RejectInReview { reason }).await
    }

    pub async fn reject_in_igms(
        &self,
        session: &Session,
        id: &str,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, CaseError> {
        self.transition(session, id, CaseEvent::RejectInIgms { reason }).await
    }

    pub async fn send_to_ombudsman(
        &self,
        session: &Session,
        id: &str,
        case_rejection_reason: Option<String>,
        igms_rejection_reason: Option<String>,
    ) -> Result<TransitionOutcome, CaseError> {
        let event = CaseEvent::SendToOmbudsman {
            case_rejection_reason,
            igms_rejection_reason,
        };
        self.transition(session, id, event).await
    }

    pub async fn reject_in_ombudsman(
        &self,
        session: &Session,
        id: &str,
        reason: Option<String>,
    ) -> Result<TransitionOutcome, CaseError> {
        self.transition(session, id, CaseEvent::RejectInOmbudsman { reason }).await
    }

    pub async fn mark_resolved(&self, session: &Session, id: &str) -> Result<TransitionOutcome, CaseError> {
        self.transition(session, id, CaseEvent::MarkResolved).await
    }

    /// Merge ombudsman filing details. Works in any stage and leaves the
    /// stage alone.
    pub async fn update_ombudsman_status(
        &self,
        session: &Session,
        id: &str,
        update: OmbudsmanUpdate,
    ) -> Result<Patch, CaseError> {
        let span = self.span("update_ombudsman_status", Some(id), session);
        async {
            session.require_staff("update_ombudsman_status")?;
            if update.is_empty() {
                return Err(CaseError::validation("no ombudsman fields to update"));
            }

            let mut patch = Patch::new();
            if update.complaint_no.is_some() {
                patch.unset(LEGACY_COMPLAINT_NO_FIELD);
            }
            patch
                .set_some(
                    "ombudsmanCourierDate",
                    update.courier_date.map(|d| Value::String(d.to_string())),
                )
                .set_some(COMPLAINT_NO_FIELD, update.complaint_no.map(Value::String))
                .set_some("sixAFormSubmitted", update.six_a_form_submitted.map(Value::Bool))
                .set_some("ombudsmanMode", update.mode.map(Value::String))
                .set_some("ombudsmanRejectionReason", update.rejection_reason.map(Value::String))
                .set("lastUpdated", timestamp(self.now()));

            self.write(id, &patch).await?;
            info!("Ombudsman details updated");
            Ok(patch)
        }
        .instrument(span)
        .await
    }

    /// Record when the IGMS or ombudsman complaint should be chased next
    pub async fn schedule_follow_up(
        &self,
        session: &Session,
        id: &str,
        stage: FollowUpStage,
        date: NaiveDate,
    ) -> Result<Patch, CaseError> {
        let span = self.span("schedule_follow_up", Some(id), session);
        async {
            session.require_staff("schedule_follow_up")?;
            let case = self.load(id).await?;
            if case.stage != stage.required_stage() {
                return Err(CaseError::precondition("schedule_follow_up", case.stage));
            }

            let now = self.now();
            let mut patch = Patch::new();
            patch
                .set(stage.field(), Value::String(date.to_string()))
                .set("lastUpdated", timestamp(now))
                .append(
                    LogChannel::Internal.field(),
                    serde_json::to_value(LogEntry::new(
                        now,
                        format!("{stage} follow-up scheduled for {date}"),
                    ))?,
                );

            self.write(id, &patch).await?;
            self.metrics.record_log_entry();
            Ok(patch)
        }
        .instrument(span)
        .await
    }

    /// Remove the case permanently
    pub async fn delete_case(&self, session: &Session, id: &str) -> Result<(), CaseError> {
        let span = self.span("delete_case", Some(id), session);
        async {
            session.require_staff("delete_case")?;
            self.tracked(self.store.delete(Collection::Cases, id).await)?;
            warn!("Case deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Append a remark to one log channel. Existing entries are never touched.
    pub async fn append_log(
        &self,
        session: &Session,
        id: &str,
        channel: LogChannel,
        remark: &str,
    ) -> Result<LogEntry, CaseError> {
        let span = self.span("append_log", Some(id), session);
        async {
            let remark = remark.trim();
            if remark.is_empty() {
                return Err(CaseError::validation("remark cannot be empty"));
            }
            if !session.is_staff() {
                if channel != LogChannel::Main {
                    return Err(CaseError::permission_denied("append_log"));
                }
                self.load_visible(session, id, "append_log").await?;
            }

            let now = self.now();
            let entry = LogEntry::new(now, remark);
            let mut patch = Patch::new();
            patch
                .append(channel.field(), serde_json::to_value(&entry)?)
                .set("lastUpdated", timestamp(now));

            self.write(id, &patch).await?;
            self.metrics.record_log_entry();
            debug!(%channel, "Log entry appended");
            Ok(entry)
        }
        .instrument(span)
        .await
    }

    pub async fn logs(&self, session: &Session, id: &str, channel: LogChannel) -> Result<Vec<LogEntry>, CaseError> {
        if !session.is_staff() && channel != LogChannel::Main {
            return Err(CaseError::permission_denied("logs"));
        }
        let case = self.get_case(session, id).await?;
        Ok(case.logs(channel).to_vec())
    }

    /// Form edit of contact and claim facts
    pub async fn update_facts(
        &self,
        session: &Session,
        id: &str,
        facts: CaseFactsPatch,
    ) -> Result<Patch, CaseError> {
        let span = self.span("update_facts", Some(id), session);
        async {
            session.require_staff("update_facts")?;
            if facts.is_empty() {
                return Err(CaseError::validation("no fields to update"));
            }
            facts.validate().map_err(CaseError::validation)?;

            let mut patch = Patch::new();
            patch
                .merge_object(serde_json::to_value(&facts)?)
                .set("lastUpdated", timestamp(self.now()));

            self.write(id, &patch).await?;
            info!(fields = patch.fields().count(), "Case facts updated");
            Ok(patch)
        }
        .instrument(span)
        .await
    }

    /// Add an uploaded file to the case's file bucket
    pub async fn attach_file(
        &self,
        session: &Session,
        id: &str,
        name: &str,
        url: &str,
    ) -> Result<FileRecord, CaseError> {
        let span = self.span("attach_file", Some(id), session);
        async {
            session.require_staff("attach_file")?;
            if name.trim().is_empty() || url.trim().is_empty() {
                return Err(CaseError::validation("file name and url are required"));
            }

            let now = self.now();
            let record = FileRecord {
                name: name.trim().to_string(),
                url: url.trim().to_string(),
                uploaded_at: now,
            };
            let mut patch = Patch::new();
            patch
                .append("fileBucket", serde_json::to_value(&record)?)
                .set("lastUpdated", timestamp(now));

            self.write(id, &patch).await?;
            Ok(record)
        }
        .instrument(span)
        .await
    }

    /// Store the location of a generated consent form or contract
    pub async fn record_document(
        &self,
        session: &Session,
        id: &str,
        kind: DocumentKind,
        storage_url: &str,
    ) -> Result<Patch, CaseError> {
        session.require_staff("record_document")?;
        if storage_url.trim().is_empty() {
            return Err(CaseError::validation("document url is required"));
        }

        let mut patch = Patch::new();
        patch
            .set(kind.document_field(), Value::String(storage_url.trim().to_string()))
            .set("lastUpdated", timestamp(self.now()));
        self.write(id, &patch).await?;
        Ok(patch)
    }

    /// Have the dispatcher generate and email a document, then record where
    /// it was stored
    pub async fn generate_document(
        &self,
        session: &Session,
        id: &str,
        kind: DocumentKind,
        dispatcher: &dyn DocumentDispatcher,
    ) -> Result<String, CaseError> {
        let span = self.span("generate_document", Some(id), session);
        async {
            session.require_staff("generate_document")?;
            let case = self.load(id).await?;
            let fields = DocumentFields::from_case(&case);
            fields.validate(kind)?;

            let url = dispatcher
                .generate_and_send(kind, id, &fields.email, &fields)
                .await?;
            self.record_document(session, id, kind, &url).await?;
            info!(kind = kind.as_str(), "Document generated and recorded");
            Ok::<_, CaseError>(url)
        }
        .instrument(span)
        .await
    }

    /// Email a previously generated document again
    pub async fn resend_document(
        &self,
        session: &Session,
        id: &str,
        kind: DocumentKind,
        email: Option<&str>,
        dispatcher: &dyn DocumentDispatcher,
    ) -> Result<(), CaseError> {
        session.require_staff("resend_document")?;
        let case = self.load(id).await?;
        let url = case
            .document(kind)
            .ok_or_else(|| CaseError::validation(format!("no {} has been generated yet", kind.as_str())))?;
        let email = email
            .map(str::to_string)
            .or_else(|| case.facts.email.clone())
            .ok_or_else(|| CaseError::validation("no email address to send to"))?;

        dispatcher.send_document(url, &email).await?;
        Ok(())
    }

    /// Public intake form; no session involved
    pub async fn create_enquiry(&self, details: NewEnquiry) -> Result<String, CaseError> {
        if details.name.trim().is_empty() {
            return Err(CaseError::validation("name is required"));
        }
        if let Some(email) = &details.email {
            validate_email(email).map_err(CaseError::validation)?;
        }
        if let Some(mobile) = &details.mobile {
            validate_mobile(mobile).map_err(CaseError::validation)?;
        }

        let enquiry = Enquiry::new(details, self.now());
        let id = self.tracked(
            self.store
                .create(Collection::Enquiries, serde_json::to_value(&enquiry)?)
                .await,
        )?;
        info!(enquiry.id = %id, "Enquiry received");
        Ok(id)
    }

    pub async fn list_enquiries(&self, session: &Session) -> Result<Vec<Enquiry>, CaseError> {
        session.require_staff("list_enquiries")?;
        let mut enquiries = self
            .tracked(self.store.query(Collection::Enquiries, &[]).await)?
            .into_iter()
            .map(serde_json::from_value::<Enquiry>)
            .collect::<Result<Vec<_>, _>>()?;
        enquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(enquiries)
    }

    /// Turn an enquiry into a case and drop the enquiry. The two writes are
    /// separate; a failed delete leaves both records in place.
    pub async fn migrate_enquiry(&self, session: &Session, enquiry_id: &str) -> Result<String, CaseError> {
        let span = self.span("migrate_enquiry", None, session);
        async {
            session.require_staff("migrate_enquiry")?;
            let document = self
                .tracked(self.store.get(Collection::Enquiries, enquiry_id).await)?
                .ok_or_else(|| CaseError::not_found(Collection::Enquiries, enquiry_id))?;
            let enquiry: Enquiry = serde_json::from_value(document)?;

            let case_id = self.create_case(session, enquiry.to_new_case()).await?;
            self.tracked(self.store.delete(Collection::Enquiries, enquiry_id).await)?;
            info!(%enquiry_id, case.id = %case_id, "Enquiry migrated to case");
            Ok::<_, CaseError>(case_id)
        }
        .instrument(span)
        .await
    }
}
