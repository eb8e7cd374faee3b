use anyhow::Result;

use super::{Command, Workspace};
use crate::cli::LogCommands;

impl Command for LogCommands {
    async fn execute(&self, workspace: &Workspace) -> Result<()> {
        let engine = &workspace.engine;
        let session = &workspace.session;

        match self {
            LogCommands::Add { id, remark, channel } => {
                let entry = engine.append_log(session, id, *channel, remark).await?;
                println!("📝 [{channel}] {} {}", entry.date.format("%Y-%m-%d %H:%M"), entry.remark);
            }
            LogCommands::Show { id, channel } => {
                let entries = engine.logs(session, id, *channel).await?;
                if entries.is_empty() {
                    println!("📝 No {channel} log entries for case {id}");
                    return Ok(());
                }
                println!("📝 {} LOG - case {id}", channel.as_str().to_uppercase());
                for entry in entries {
                    println!("   {} {}", entry.date.format("%Y-%m-%d %H:%M"), entry.remark);
                }
            }
        }
        Ok(())
    }
}
