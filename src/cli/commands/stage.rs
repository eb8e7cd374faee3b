use anyhow::Result;
use casedesk::model::Escalation;
use casedesk::{CaseEvent, OmbudsmanUpdate};

use super::{print_outcome, require_confirmation, Command, Workspace};
use crate::cli::StageCommands;

impl Command for StageCommands {
    async fn execute(&self, workspace: &Workspace) -> Result<()> {
        let engine = &workspace.engine;
        let session = &workspace.session;

        match self {
            StageCommands::Review { id } => {
                print_outcome(&engine.send_to_review(session, id).await?);
            }
            StageCommands::Igms { id, reason, document_short } => {
                let outcome = engine
                    .send_to_igms(session, id, reason.clone(), Some(*document_short))
                    .await?;
                print_outcome(&outcome);
            }
            StageCommands::Ombudsman { id, case_reason, igms_reason } => {
                let outcome = engine
                    .send_to_ombudsman(session, id, case_reason.clone(), igms_reason.clone())
                    .await?;
                print_outcome(&outcome);
            }
            StageCommands::Resolve { id } => {
                print_outcome(&engine.mark_resolved(session, id).await?);
            }
            StageCommands::Reject { id, reason, yes } => {
                require_confirmation(*yes, &format!("reject case {id}"))?;
                // Rejection is recorded against whatever stage the case is in
                let case = engine.get_case(session, id).await?;
                let reason = reason.clone();
                let event = match case.stage.escalation() {
                    Some(Escalation::Igms) => CaseEvent::RejectInIgms { reason },
                    Some(Escalation::Ombudsman) => CaseEvent::RejectInOmbudsman { reason },
                    _ => CaseEvent::RejectInReview { reason },
                };
                print_outcome(&engine.transition(session, id, event).await?);
            }
            StageCommands::OmbudsmanStatus {
                id,
                courier_date,
                complaint_no,
                six_a_form,
                mode,
                rejection_reason,
            } => {
                let update = OmbudsmanUpdate {
                    courier_date: *courier_date,
                    complaint_no: complaint_no.clone(),
                    six_a_form_submitted: *six_a_form,
                    mode: mode.clone(),
                    rejection_reason: rejection_reason.clone(),
                };
                let patch = engine.update_ombudsman_status(session, id, update).await?;
                let fields: Vec<&str> = patch.fields().filter(|f| *f != "lastUpdated").collect();
                println!("⚖️  Updated {} on case {id}", fields.join(", "));
            }
            StageCommands::FollowUp { id, stage, date } => {
                engine.schedule_follow_up(session, id, *stage, *date).await?;
                println!("🗓️  {stage} follow-up for case {id} set to {date}");
            }
        }
        Ok(())
    }
}
