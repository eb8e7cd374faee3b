use anyhow::Result;
use casedesk::model::NewPartner;

use super::{Command, Workspace};
use crate::cli::PartnerCommands;

impl Command for PartnerCommands {
    async fn execute(&self, workspace: &Workspace) -> Result<()> {
        let partners = &workspace.partners;
        let session = &workspace.session;

        match self {
            PartnerCommands::Create { name, email, phone, source } => {
                let input = NewPartner {
                    name: name.clone(),
                    email: email.clone(),
                    phone_number: phone.clone(),
                    source: source.clone(),
                };
                let partner = partners.create_partner(session, input).await?;
                println!("🤝 Registered partner {} ({})", partner.name, partner.partner_ref);
                println!("   🆔 {}", partner.id);
            }
            PartnerCommands::List => {
                let all = partners.list_partners(session).await?;
                if all.is_empty() {
                    println!("🤝 No partners registered");
                    return Ok(());
                }
                for partner in &all {
                    println!(
                        "  {:<12} {:<24} {:<28} {}",
                        partner.partner_ref, partner.name, partner.email, partner.phone_number
                    );
                }
            }
            PartnerCommands::Show { id } => {
                let partner = partners.get_partner(session, id).await?;
                println!("🤝 PARTNER {}", partner.partner_ref);
                println!("   👤 Name: {}", partner.name);
                println!("   ✉️  Email: {}", partner.email);
                println!("   📞 Phone: {}", partner.phone_number);
                if let Some(source) = &partner.source {
                    println!("   🔗 Source: {source}");
                }
                println!("   🗓️  Registered: {}", partner.created_at.format("%Y-%m-%d"));
            }
            PartnerCommands::Cases { partner_ref } => {
                let cases = partners.cases_for_partner(session, partner_ref).await?;
                println!("📋 {} case(s) referred by {partner_ref}", cases.len());
                for case in &cases {
                    println!("  {}  {:<24} {}", case.id, case.facts.name, case.status());
                }
            }
        }
        Ok(())
    }
}
