use anyhow::Result;
use casedesk::{init_telemetry, CaseDeskConfig};
use clap::Parser;

mod cli;

use cli::commands::dashboard::dashboard_command;
use cli::commands::init::InitCommand;
use cli::commands::service::{lookup_command, sign_command, sign_in_command};
use cli::commands::{show_how_to_get_started, Command, Workspace};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    CaseDeskConfig::load_env_file()?;
    let config = CaseDeskConfig::load()?;
    init_telemetry(&config.observability)?;

    let Some(command) = cli.command else {
        // No subcommand: explain how to get started
        return show_how_to_get_started();
    };

    tokio::runtime::Runtime::new()?.block_on(async {
        if let Commands::Init { force, dry_run } = command {
            return InitCommand::new(force, dry_run).execute(&config).await;
        }

        let workspace = Workspace::open(config, cli.as_partner).await?;
        let result = match command {
            Commands::Init { .. } => Ok(()),
            Commands::Case(case) => case.execute(&workspace).await,
            Commands::Stage(stage) => stage.execute(&workspace).await,
            Commands::Log(log) => log.execute(&workspace).await,
            Commands::Partner(partner) => partner.execute(&workspace).await,
            Commands::Enquiry(enquiry) => enquiry.execute(&workspace).await,
            Commands::Document(document) => document.execute(&workspace).await,
            Commands::Sign { case_id, kind, typed, drawn } => {
                sign_command(&workspace, &case_id, kind, typed, drawn).await
            }
            Commands::Lookup { email } => lookup_command(&workspace, &email).await,
            Commands::SignIn { email, password } => sign_in_command(&workspace, &email, &password).await,
            Commands::Dashboard => dashboard_command(&workspace).await,
        };

        workspace.close().await;
        result
    })
}
