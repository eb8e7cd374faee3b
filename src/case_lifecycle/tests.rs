// Engine behaviour against an in-memory store and mocked collaborators

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::*;
use crate::dispatch::{DispatchError, MockDocumentDispatcher};
use crate::model::{
    Case, CaseFacts, CaseFactsPatch, DocumentKind, Escalation, LogChannel, NewCase, NewEnquiry,
    Stage, StageFlags,
};
use crate::session::Session;
use crate::store::{Collection, DocumentStore, MemoryStore, MockDocumentStore, StoreError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap()
}

/// Clock that advances one second per reading
fn ticking_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
    let ticks = Arc::new(AtomicI64::new(0));
    move || t0() + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst))
}

fn staff() -> Session {
    Session::staff("u-staff", "ops@example.com")
}

fn engine() -> (LifecycleEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = LifecycleEngine::new(store.clone()).with_clock(ticking_clock());
    (engine, store)
}

fn new_case(name: &str) -> NewCase {
    NewCase {
        facts: CaseFacts {
            email: Some("asha@example.com".into()),
            policy_no: Some("POL-1".into()),
            ..CaseFacts::named(name)
        },
        complaint_date: NaiveDate::from_ymd_opt(2024, 1, 10),
    }
}

async fn raw(store: &MemoryStore, id: &str) -> serde_json::Value {
    store.get(Collection::Cases, id).await.unwrap().unwrap()
}

#[tokio::test]
async fn full_escalation_ends_resolved_with_every_flag() {
    let (engine, store) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    engine.send_to_review(&s, &id).await.unwrap();
    engine.send_to_igms(&s, &id, None, None).await.unwrap();
    engine.send_to_ombudsman(&s, &id, None, None).await.unwrap();
    let outcome = engine.mark_resolved(&s, &id).await.unwrap();
    assert_eq!(outcome.from, Stage::InOmbudsman);

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.stage, Stage::Resolved { from: Escalation::Ombudsman });
    assert_eq!(
        case.flags(),
        StageFlags {
            taken_for_review: true,
            igms: true,
            ombudsman: true,
            solved: true,
            rejected: false,
        }
    );
    assert_eq!(case.status(), "Resolved");
    assert_eq!(raw(&store, &id).await["status"], "Resolved");
    assert!(case.solved_date.is_some());

    // one automatic main-log entry per transition
    let remarks: Vec<_> = case.main_logs.iter().map(|e| e.remark.as_str()).collect();
    assert_eq!(
        remarks,
        vec![
            "Moved to Under Review",
            "Moved to Case Accepted",
            "Moved to Sent in Ombudsman",
            "Moved to Resolved"
        ]
    );
}

#[tokio::test]
async fn ombudsman_rejection_records_reason_date_and_flags() {
    let (engine, store) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    engine.send_to_review(&s, &id).await.unwrap();
    engine.send_to_igms(&s, &id, None, None).await.unwrap();
    engine.send_to_ombudsman(&s, &id, None, None).await.unwrap();
    let outcome = engine
        .reject_in_ombudsman(&s, &id, Some("award declined".into()))
        .await
        .unwrap();
    assert_eq!(outcome.from, Stage::InOmbudsman);
    assert_eq!(outcome.to, Stage::Rejected { during: Escalation::Ombudsman });

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.status(), "Rejected in Ombudsman");
    assert_eq!(raw(&store, &id).await["status"], "Rejected in Ombudsman");
    assert_eq!(case.ombudsman_rejection_reason.as_deref(), Some("award declined"));
    assert!(case.case_rejection_date.is_some());
    assert!(case.solved_date.is_none());
    assert_eq!(
        case.flags(),
        StageFlags {
            taken_for_review: true,
            igms: true,
            ombudsman: true,
            solved: false,
            rejected: true,
        }
    );
    assert_eq!(
        case.main_logs.last().map(|e| e.remark.as_str()),
        Some("Moved to Rejected in Ombudsman: award declined")
    );

    // terminal: nothing else applies
    assert!(matches!(
        engine.mark_resolved(&s, &id).await,
        Err(CaseError::PreconditionFailed { .. })
    ));
}

#[tokio::test]
async fn igms_rejection_through_the_engine() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    // only valid while the case sits with IGMS
    engine.send_to_review(&s, &id).await.unwrap();
    assert!(matches!(
        engine.reject_in_igms(&s, &id, None).await,
        Err(CaseError::PreconditionFailed { .. })
    ));

    engine.send_to_igms(&s, &id, None, None).await.unwrap();
    engine
        .reject_in_igms(&s, &id, Some("no grievance found".into()))
        .await
        .unwrap();

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.stage, Stage::Rejected { during: Escalation::Igms });
    assert_eq!(case.status(), "Rejected in IGMS");
    assert_eq!(case.igms_rejection_reason.as_deref(), Some("no grievance found"));
    assert!(case.ombudsman_rejection_reason.is_none());
    assert!(case.case_rejection_date.is_some());

    let flags = case.flags();
    assert!(flags.taken_for_review && flags.igms && flags.rejected);
    assert!(!flags.ombudsman && !flags.solved);
}

#[tokio::test]
async fn review_stamps_call_time_and_leaves_other_flags_false() {
    let store = Arc::new(MemoryStore::new());
    let review_time = Utc.with_ymd_and_hms(2024, 1, 11, 8, 0, 0).unwrap();
    let s = staff();

    let id = LifecycleEngine::new(store.clone())
        .with_clock(t0)
        .create_case(&s, new_case("Asha"))
        .await
        .unwrap();
    let engine = LifecycleEngine::new(store.clone()).with_clock(move || review_time);
    engine.send_to_review(&s, &id).await.unwrap();

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.status(), "Under Review");
    assert_eq!(case.review_date, Some(review_time));
    assert_eq!(case.last_updated, Some(review_time));
    assert_eq!(case.complaint_date, NaiveDate::from_ymd_opt(2024, 1, 10));

    let flags = case.flags();
    assert!(flags.taken_for_review);
    assert!(!flags.igms && !flags.ombudsman && !flags.solved && !flags.rejected);
}

#[tokio::test]
async fn igms_before_review_fails_and_writes_nothing() {
    let (engine, store) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();
    let before = raw(&store, &id).await;

    let result = engine.send_to_igms(&s, &id, Some("x".into()), Some(true)).await;
    assert!(matches!(result, Err(CaseError::PreconditionFailed { .. })));
    assert_eq!(raw(&store, &id).await, before);
    assert_eq!(engine.metrics().get_stats().transitions_refused, 1);
}

#[tokio::test]
async fn resolving_a_solved_case_is_refused_without_change() {
    let (engine, store) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();
    engine.send_to_review(&s, &id).await.unwrap();
    engine.send_to_igms(&s, &id, None, None).await.unwrap();
    engine.mark_resolved(&s, &id).await.unwrap();
    let before = raw(&store, &id).await;

    match engine.mark_resolved(&s, &id).await {
        Err(CaseError::PreconditionFailed { operation, stage }) => {
            assert_eq!(operation, "mark_resolved");
            assert_eq!(stage, "Resolved");
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }
    assert_eq!(raw(&store, &id).await, before);
}

#[tokio::test]
async fn rejected_cases_are_terminal() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();
    engine.send_to_review(&s, &id).await.unwrap();
    engine
        .reject_in_review(&s, &id, Some("policy lapsed".into()))
        .await
        .unwrap();

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.status(), "Rejected in Review");
    assert_eq!(case.case_rejection_reason.as_deref(), Some("policy lapsed"));
    assert!(case.case_rejection_date.is_some());

    for result in [
        engine.send_to_igms(&s, &id, None, None).await,
        engine.mark_resolved(&s, &id).await,
        engine.send_to_review(&s, &id).await,
    ] {
        assert!(matches!(result, Err(CaseError::PreconditionFailed { .. })));
    }
}

#[tokio::test]
async fn deleted_case_is_not_found() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    engine.delete_case(&s, &id).await.unwrap();
    assert!(matches!(
        engine.get_case(&s, &id).await,
        Err(CaseError::NotFound { collection: Collection::Cases, .. })
    ));
    assert!(matches!(
        engine.delete_case(&s, &id).await,
        Err(CaseError::NotFound { .. })
    ));
}

#[tokio::test]
async fn create_case_validates_input() {
    let (engine, _) = engine();
    let s = staff();

    assert!(matches!(
        engine.create_case(&s, new_case("   ")).await,
        Err(CaseError::ValidationFailed { .. })
    ));

    let mut input = new_case("Asha");
    input.facts.email = Some("asha-at-example".into());
    assert!(matches!(
        engine.create_case(&s, input).await,
        Err(CaseError::ValidationFailed { .. })
    ));
}

#[tokio::test]
async fn blank_remarks_are_rejected() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();
    assert!(matches!(
        engine.append_log(&s, &id, LogChannel::Internal, "  \n").await,
        Err(CaseError::ValidationFailed { .. })
    ));
    assert!(matches!(
        engine.append_log(&s, "missing", LogChannel::Internal, "note").await,
        Err(CaseError::NotFound { .. })
    ));
}

#[tokio::test]
async fn log_channels_are_independent() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    engine.append_log(&s, &id, LogChannel::Igms, "filed on portal").await.unwrap();
    engine.append_log(&s, &id, LogChannel::Internal, "called insurer").await.unwrap();

    assert_eq!(engine.logs(&s, &id, LogChannel::Igms).await.unwrap().len(), 1);
    assert_eq!(engine.logs(&s, &id, LogChannel::Internal).await.unwrap().len(), 1);
    assert!(engine.logs(&s, &id, LogChannel::Ombudsman).await.unwrap().is_empty());
    assert!(engine.logs(&s, &id, LogChannel::Main).await.unwrap().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn append_log_only_ever_appends(remarks in prop::collection::vec("[a-z][a-z ]{0,20}", 1..12)) {
        tokio_test::block_on(async {
            let (engine, _) = engine();
            let s = staff();
            let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

            let mut seen = Vec::new();
            for remark in &remarks {
                engine.append_log(&s, &id, LogChannel::Ombudsman, remark).await.unwrap();
                let entries = engine.logs(&s, &id, LogChannel::Ombudsman).await.unwrap();

                assert_eq!(entries.len(), seen.len() + 1);
                assert_eq!(&entries[..seen.len()], &seen[..]);
                seen = entries;
            }

            let stored: Vec<_> = seen.iter().map(|e| e.remark.clone()).collect();
            let expected: Vec<_> = remarks.iter().map(|r| r.trim().to_string()).collect();
            assert_eq!(stored, expected);
        });
    }
}

#[tokio::test]
async fn ombudsman_update_is_lenient_and_keeps_stage() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    let update = OmbudsmanUpdate {
        courier_date: NaiveDate::from_ymd_opt(2024, 2, 1),
        complaint_no: Some("OMB/2024/77".into()),
        six_a_form_submitted: Some(true),
        mode: Some("online".into()),
        rejection_reason: None,
    };
    let patch = engine.update_ombudsman_status(&s, &id, update).await.unwrap();
    assert!(patch.get("stage").is_none());
    assert!(patch.get("lastUpdated").is_some());

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.stage, Stage::Created);
    assert_eq!(case.ombudsman_complaint_no.as_deref(), Some("OMB/2024/77"));
    assert_eq!(case.ombudsman_courier_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    assert!(case.six_a_form_submitted);

    assert!(matches!(
        engine.update_ombudsman_status(&s, &id, OmbudsmanUpdate::default()).await,
        Err(CaseError::ValidationFailed { .. })
    ));
}

#[tokio::test]
async fn complaint_number_update_replaces_legacy_key() {
    let (engine, store) = engine();
    let s = staff();
    let id = store
        .create(
            Collection::Cases,
            serde_json::json!({"name": "Legacy", "ombudsmanComplaintNumber": "OMB-1"}),
        )
        .await
        .unwrap();
    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.ombudsman_complaint_no.as_deref(), Some("OMB-1"));

    let update = OmbudsmanUpdate {
        complaint_no: Some("OMB-2".into()),
        ..Default::default()
    };
    engine.update_ombudsman_status(&s, &id, update).await.unwrap();

    let stored = raw(&store, &id).await;
    assert!(stored.get("ombudsmanComplaintNumber").is_none());
    assert_eq!(stored["ombudsmanComplaintNo"], "OMB-2");

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.ombudsman_complaint_no.as_deref(), Some("OMB-2"));
    engine.send_to_review(&s, &id).await.unwrap();
}

#[tokio::test]
async fn other_ombudsman_fields_leave_legacy_number_alone() {
    let (engine, store) = engine();
    let s = staff();
    let id = store
        .create(
            Collection::Cases,
            serde_json::json!({"name": "Legacy", "ombudsmanComplaintNumber": "OMB-1"}),
        )
        .await
        .unwrap();

    let update = OmbudsmanUpdate {
        mode: Some("courier".into()),
        ..Default::default()
    };
    engine.update_ombudsman_status(&s, &id, update).await.unwrap();

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.ombudsman_complaint_no.as_deref(), Some("OMB-1"));
    assert_eq!(case.ombudsman_mode.as_deref(), Some("courier"));
}

#[tokio::test]
async fn follow_up_dates_require_matching_stage() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    assert!(matches!(
        engine.schedule_follow_up(&s, &id, FollowUpStage::Igms, date).await,
        Err(CaseError::PreconditionFailed { .. })
    ));

    engine.send_to_review(&s, &id).await.unwrap();
    engine.send_to_igms(&s, &id, None, None).await.unwrap();
    engine
        .schedule_follow_up(&s, &id, FollowUpStage::Igms, date)
        .await
        .unwrap();

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.igms_follow_up_date, Some(date));
    assert_eq!(case.internal_logs.len(), 1);
    assert!(case.internal_logs[0].remark.contains("2024-03-15"));
}

#[tokio::test]
async fn facts_and_files_are_updated_in_place() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    let edit = CaseFactsPatch {
        claim_no: Some("CLM-42".into()),
        estimated_claim_amount: Some("1,25,000.50".parse().unwrap()),
        ..Default::default()
    };
    engine.update_facts(&s, &id, edit).await.unwrap();
    engine
        .attach_file(&s, &id, "discharge-summary.pdf", "https://files.example.com/ds.pdf")
        .await
        .unwrap();

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.facts.claim_no.as_deref(), Some("CLM-42"));
    assert_eq!(case.facts.estimated_claim_amount.map(|a| a.minor()), Some(12_500_050));
    assert_eq!(case.facts.name, "Asha");
    assert_eq!(case.file_bucket.len(), 1);
    assert_eq!(case.stage, Stage::Created);

    assert!(matches!(
        engine.update_facts(&s, &id, CaseFactsPatch::default()).await,
        Err(CaseError::ValidationFailed { .. })
    ));
    assert!(matches!(
        engine.attach_file(&s, &id, "", "https://x").await,
        Err(CaseError::ValidationFailed { .. })
    ));
}

#[tokio::test]
async fn listing_filters_by_tab_newest_first() {
    let (engine, _) = engine();
    let s = staff();
    let first = engine.create_case(&s, new_case("First")).await.unwrap();
    let second = engine.create_case(&s, new_case("Second")).await.unwrap();
    let third = engine.create_case(&s, new_case("Third")).await.unwrap();
    engine.send_to_review(&s, &second).await.unwrap();

    let all: Vec<_> = engine
        .list_cases(&s, StageFilter::All)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(all, vec![third.clone(), second.clone(), first.clone()]);

    let new: Vec<_> = engine
        .list_cases(&s, StageFilter::New)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(new, vec![third, first]);

    let counts = engine.stage_counts(&s).await.unwrap();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.review, 1);
}

#[tokio::test]
async fn partners_are_confined_to_their_cases() {
    let (engine, _) = engine();
    let s = staff();
    let partner = Session::partner("p1", "john@example.com", "JOHN7766");

    let own = engine.create_case(&partner, new_case("Referred")).await.unwrap();
    let other = engine.create_case(&s, new_case("Walk-in")).await.unwrap();

    let case = engine.get_case(&partner, &own).await.unwrap();
    assert_eq!(case.facts.partner_ref.as_deref(), Some("JOHN7766"));
    assert!(matches!(
        engine.get_case(&partner, &other).await,
        Err(CaseError::PermissionDenied { .. })
    ));

    let visible = engine.list_cases(&partner, StageFilter::All).await.unwrap();
    assert_eq!(visible.len(), 1);

    engine
        .append_log(&partner, &own, LogChannel::Main, "documents couriered")
        .await
        .unwrap();
    for result in [
        engine.append_log(&partner, &own, LogChannel::Internal, "x").await.map(|_| ()),
        engine.append_log(&partner, &other, LogChannel::Main, "x").await.map(|_| ()),
        engine.send_to_review(&partner, &own).await.map(|_| ()),
        engine.delete_case(&partner, &own).await,
        engine.stage_counts(&partner).await.map(|_| ()),
    ] {
        assert!(matches!(result, Err(CaseError::PermissionDenied { .. })));
    }

    let mut foreign = new_case("Mislabelled");
    foreign.facts.partner_ref = Some("MARY1234".into());
    assert!(matches!(
        engine.create_case(&partner, foreign).await,
        Err(CaseError::PermissionDenied { .. })
    ));
}

#[tokio::test]
async fn enquiry_migrates_into_new_case() {
    let (engine, store) = engine();
    let s = staff();
    let enquiry_id = engine
        .create_enquiry(NewEnquiry {
            name: "Ravi".into(),
            mobile: Some("9876543210".into()),
            message: Some("Claim rejected for pre-existing condition".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(engine.list_enquiries(&s).await.unwrap().len(), 1);

    let case_id = engine.migrate_enquiry(&s, &enquiry_id).await.unwrap();
    let case = engine.get_case(&s, &case_id).await.unwrap();
    assert_eq!(case.facts.name, "Ravi");
    assert_eq!(case.stage, Stage::Created);
    assert_eq!(case.facts.claim.as_deref(), Some("Claim rejected for pre-existing condition"));
    assert!(store.get(Collection::Enquiries, &enquiry_id).await.unwrap().is_none());

    assert!(matches!(
        engine.migrate_enquiry(&s, &enquiry_id).await,
        Err(CaseError::NotFound { collection: Collection::Enquiries, .. })
    ));
}

#[tokio::test]
async fn store_write_failure_surfaces_once() {
    let case = Case::new(new_case("Asha"), t0());
    let document = case.to_document().unwrap();

    let mut store = MockDocumentStore::new();
    store
        .expect_get()
        .times(1)
        .returning(move |_, _| Ok(Some(document.clone())));
    store
        .expect_patch()
        .times(1)
        .returning(|_, _, _| Err(StoreError::Io(std::io::Error::other("disk full"))));

    let engine = LifecycleEngine::new(Arc::new(store)).with_clock(t0);
    let result = engine.send_to_review(&staff(), "c1").await;
    assert!(matches!(result, Err(CaseError::Store(StoreError::Io(_)))));
    assert_eq!(engine.metrics().get_stats().store_errors, 1);
    assert_eq!(engine.metrics().get_stats().transitions_applied, 0);
}

#[tokio::test]
async fn missing_case_is_not_a_store_failure() {
    let (engine, _) = engine();
    assert!(matches!(
        engine.delete_case(&staff(), "ghost").await,
        Err(CaseError::NotFound { .. })
    ));
    assert!(matches!(
        engine.append_log(&staff(), "ghost", LogChannel::Main, "hello").await,
        Err(CaseError::NotFound { .. })
    ));
    assert_eq!(engine.metrics().get_stats().store_errors, 0);
}

#[tokio::test]
async fn failed_enquiry_delete_is_counted() {
    let enquiry = crate::model::Enquiry::new(
        NewEnquiry {
            name: "Ravi".into(),
            ..Default::default()
        },
        t0(),
    );
    let document = serde_json::to_value(&enquiry).unwrap();

    let mut store = MockDocumentStore::new();
    store
        .expect_get()
        .times(1)
        .returning(move |_, _| Ok(Some(document.clone())));
    store
        .expect_create()
        .times(1)
        .returning(|_, _| Ok("case-1".to_string()));
    store
        .expect_delete()
        .times(1)
        .returning(|_, _| Err(StoreError::Io(std::io::Error::other("disk full"))));

    let metrics = Arc::new(crate::observability::LifecycleMetrics::new());
    let engine = LifecycleEngine::new(Arc::new(store))
        .with_clock(t0)
        .with_metrics(metrics.clone());
    let result = engine.migrate_enquiry(&staff(), "enq-1").await;

    assert!(matches!(result, Err(CaseError::Store(StoreError::Io(_)))));
    assert_eq!(metrics.get_stats().store_errors, 1);
}

#[tokio::test]
async fn generated_document_url_is_recorded() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    let mut dispatcher = MockDocumentDispatcher::new();
    dispatcher
        .expect_generate_and_send()
        .times(1)
        .withf(|kind, _, email, fields| {
            *kind == DocumentKind::Consent && email.eq_ignore_ascii_case("asha@example.com") && fields.name == "Asha"
        })
        .returning(|_, _, _, _| Ok("https://files.example.com/consent.pdf".to_string()));

    let url = engine
        .generate_document(&s, &id, DocumentKind::Consent, &dispatcher)
        .await
        .unwrap();
    assert_eq!(url, "https://files.example.com/consent.pdf");

    let case = engine.get_case(&s, &id).await.unwrap();
    assert_eq!(case.document(DocumentKind::Consent), Some(url.as_str()));
    assert_eq!(case.document(DocumentKind::Contract), None);
}

#[tokio::test]
async fn contract_without_claim_details_never_reaches_dispatcher() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    let mut dispatcher = MockDocumentDispatcher::new();
    dispatcher.expect_generate_and_send().never();

    assert!(matches!(
        engine
            .generate_document(&s, &id, DocumentKind::Contract, &dispatcher)
            .await,
        Err(CaseError::ValidationFailed { .. })
    ));
}

#[tokio::test]
async fn dispatcher_failure_is_external_service_error() {
    let (engine, _) = engine();
    let s = staff();
    let id = engine.create_case(&s, new_case("Asha")).await.unwrap();

    let mut dispatcher = MockDocumentDispatcher::new();
    dispatcher.expect_generate_and_send().times(1).returning(|_, _, _, _| {
        Err(DispatchError::Service {
            status: 502,
            message: "mailer down".into(),
        })
    });

    assert!(matches!(
        engine
            .generate_document(&s, &id, DocumentKind::Consent, &dispatcher)
            .await,
        Err(CaseError::ExternalService(DispatchError::Service { status: 502, .. }))
    ));
    let case = engine.get_case(&s, &id).await.unwrap();
    assert!(case.consent_form.is_none());
}
