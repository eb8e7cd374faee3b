use anyhow::Result;
use casedesk::case_lifecycle::available_events;
use casedesk::model::{CaseFacts, CaseFactsPatch};
use casedesk::{Case, LogChannel, NewCase};

use super::{require_confirmation, Command, Workspace};
use crate::cli::{CaseCommands, CaseEditArgs, CaseFactsArgs};

impl Command for CaseCommands {
    async fn execute(&self, workspace: &Workspace) -> Result<()> {
        let engine = &workspace.engine;
        let session = &workspace.session;

        match self {
            CaseCommands::Create(args) => {
                let id = engine.create_case(session, new_case(args)).await?;
                println!("🆕 Created case {id}");
            }
            CaseCommands::Show { id, json } => {
                let case = engine.get_case(session, id).await?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&case.to_document()?)?);
                } else {
                    print_case(&case);
                }
            }
            CaseCommands::List { stage } => {
                let cases = engine.list_cases(session, *stage).await?;
                if cases.is_empty() {
                    println!("📋 No cases in '{stage}'");
                    return Ok(());
                }
                println!("📋 {} case(s) in '{stage}':", cases.len());
                for case in &cases {
                    println!(
                        "  {}  {:<24} {:<22} {}",
                        case.id,
                        case.facts.name,
                        case.status(),
                        case.facts.partner_ref.as_deref().unwrap_or("-"),
                    );
                }
            }
            CaseCommands::Delete { id, yes } => {
                require_confirmation(*yes, &format!("delete case {id}"))?;
                engine.delete_case(session, id).await?;
                println!("🗑️  Deleted case {id}");
            }
            CaseCommands::Edit { id, facts } => {
                engine.update_facts(session, id, facts_patch(facts)).await?;
                println!("✏️  Updated case {id}");
            }
            CaseCommands::Attach { id, name, url } => {
                let file = engine.attach_file(session, id, name, url).await?;
                println!("📎 Attached {} to case {id}", file.name);
            }
        }
        Ok(())
    }
}

fn new_case(args: &CaseFactsArgs) -> NewCase {
    NewCase {
        facts: CaseFacts {
            name: args.name.clone(),
            mobile: args.mobile.clone(),
            email: args.email.clone(),
            address: args.address.clone(),
            policy_holder: args.policy_holder.clone(),
            company_name: args.company.clone(),
            policy_no: args.policy_no.clone(),
            claim_no: args.claim_no.clone(),
            partner_ref: args.partner_ref.clone(),
            estimated_claim_amount: args.amount,
            claim: args.claim.clone(),
            ..Default::default()
        },
        complaint_date: args.complaint_date,
    }
}

fn facts_patch(args: &CaseEditArgs) -> CaseFactsPatch {
    CaseFactsPatch {
        name: args.name.clone(),
        mobile: args.mobile.clone(),
        email: args.email.clone(),
        address: args.address.clone(),
        policy_holder: args.policy_holder.clone(),
        company_name: args.company.clone(),
        policy_no: args.policy_no.clone(),
        claim_no: args.claim_no.clone(),
        partner_ref: args.partner_ref.clone(),
        estimated_claim_amount: args.amount,
        claim: args.claim.clone(),
        commission_received: args.commission_received,
        partner_commission: args.partner_commission,
    }
}

fn print_case(case: &Case) {
    let facts = &case.facts;
    let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    println!("📁 CASE {}", case.id);
    println!("==========================");
    println!("   👤 Name: {}", facts.name);
    println!("   📌 Status: {}", case.status());
    if let Some(email) = &facts.email {
        println!("   ✉️  Email: {email}");
    }
    if let Some(mobile) = &facts.mobile {
        println!("   📞 Mobile: {mobile}");
    }
    if let Some(company) = &facts.company_name {
        println!("   🏢 Insurer: {company}");
    }
    if let Some(policy_no) = &facts.policy_no {
        println!("   📄 Policy: {policy_no}");
    }
    if let Some(amount) = facts.estimated_claim_amount {
        println!("   💰 Estimated claim: {amount}");
    }
    if let Some(partner_ref) = &facts.partner_ref {
        println!("   🤝 Partner: {partner_ref}");
    }
    println!();
    println!("🗓️  TIMELINE:");
    println!("   Created:   {}", date(case.created_at));
    println!("   Review:    {}", date(case.review_date));
    println!("   IGMS:      {}", date(case.igms_date));
    println!("   Ombudsman: {}", date(case.ombudsman_date));
    println!("   Solved:    {}", date(case.solved_date));
    println!("   Rejected:  {}", date(case.case_rejection_date));
    if !case.file_bucket.is_empty() {
        println!();
        println!("📎 FILES:");
        for file in &case.file_bucket {
            println!("   {} - {}", file.name, file.url);
        }
    }

    let main_logs = case.logs(LogChannel::Main);
    if !main_logs.is_empty() {
        println!();
        println!("📝 MAIN LOG:");
        for entry in main_logs {
            println!("   {} {}", entry.date.format("%Y-%m-%d %H:%M"), entry.remark);
        }
    }

    let next = available_events(case.stage);
    if !next.is_empty() {
        println!();
        println!("➡️  Next: {}", next.join(", "));
    }
}
