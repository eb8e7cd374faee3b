use anyhow::Result;
use casedesk::model::NewEnquiry;

use super::{Command, Workspace};
use crate::cli::EnquiryCommands;

impl Command for EnquiryCommands {
    async fn execute(&self, workspace: &Workspace) -> Result<()> {
        let engine = &workspace.engine;

        match self {
            EnquiryCommands::Create {
                name,
                mobile,
                email,
                company,
                policy_no,
                message,
                partner_ref,
            } => {
                let details = NewEnquiry {
                    name: name.clone(),
                    mobile: mobile.clone(),
                    email: email.clone(),
                    company_name: company.clone(),
                    policy_no: policy_no.clone(),
                    message: message.clone(),
                    partner_ref: partner_ref.clone(),
                };
                let id = engine.create_enquiry(details).await?;
                println!("📨 Enquiry {id} received");
            }
            EnquiryCommands::List => {
                let enquiries = engine.list_enquiries(&workspace.session).await?;
                if enquiries.is_empty() {
                    println!("📨 No enquiries");
                    return Ok(());
                }
                for enquiry in &enquiries {
                    println!(
                        "  {}  {:<24} {}  {}",
                        enquiry.id,
                        enquiry.details.name,
                        enquiry.created_at.format("%Y-%m-%d"),
                        enquiry.details.message.as_deref().unwrap_or(""),
                    );
                }
            }
            EnquiryCommands::Migrate { id } => {
                let case_id = engine.migrate_enquiry(&workspace.session, id).await?;
                println!("🆕 Enquiry {id} became case {case_id}");
            }
        }
        Ok(())
    }
}
