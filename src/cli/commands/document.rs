use anyhow::Result;

use super::{Command, Workspace};
use crate::cli::DocumentCommands;

impl Command for DocumentCommands {
    async fn execute(&self, workspace: &Workspace) -> Result<()> {
        let dispatcher = workspace.dispatcher()?;
        let engine = &workspace.engine;
        let session = &workspace.session;

        match self {
            DocumentCommands::Send { id, kind } => {
                print!("📤 Generating {kind} for case {id}... ");
                std::io::Write::flush(&mut std::io::stdout())?;
                let url = engine.generate_document(session, id, *kind, &dispatcher).await?;
                println!("✅");
                println!("   🔗 {url}");
            }
            DocumentCommands::Resend { id, kind, email } => {
                engine
                    .resend_document(session, id, *kind, email.as_deref(), &dispatcher)
                    .await?;
                println!("📤 {kind} for case {id} sent again");
            }
        }
        Ok(())
    }
}
