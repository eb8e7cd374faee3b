use anyhow::{anyhow, Result};
use casedesk::config::{CaseDeskConfig, StoreBackend, CONFIG_FILE};
use std::path::PathBuf;

/// Writes casedesk.toml and prepares the store location.
///
/// An existing configuration file is only replaced with `--force`; the data
/// directory and anything already stored in it are never touched.
pub struct InitCommand {
    pub force: bool,
    pub dry_run: bool,
    root: PathBuf,
}

impl InitCommand {
    pub fn new(force: bool, dry_run: bool) -> Self {
        Self {
            force,
            dry_run,
            root: PathBuf::from("."),
        }
    }

    pub fn in_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub async fn execute(&self, config: &CaseDeskConfig) -> Result<()> {
        if self.dry_run {
            println!("🚀 CASEDESK INIT (DRY RUN)");
        } else {
            println!("🚀 CASEDESK INIT");
        }
        println!("==========================");
        println!();

        let config_path = self.root.join(CONFIG_FILE);
        if config_path.exists() && !self.force {
            return Err(anyhow!(
                "{} already exists; use --force to overwrite it",
                config_path.display()
            ));
        }

        let data_dir = self.root.join(&config.store.data_dir);
        println!("⚙️  Configuration:");
        println!("   📄 Config file: {}", config_path.display());
        match config.store.backend {
            StoreBackend::File => println!("   🗄️  File store: {}", data_dir.display()),
            StoreBackend::Sqlite => println!("   🗄️  SQLite store: {}", config.store.database_url),
        }
        println!("   🌐 Document service: {}", config.dispatcher.base_url);
        println!();

        if self.dry_run {
            println!("Would write {} and create {}", config_path.display(), data_dir.display());
            return Ok(());
        }

        if config.store.backend == StoreBackend::File {
            tokio::fs::create_dir_all(&data_dir).await?;
        }
        config.save_to_file(&config_path)?;

        println!("✅ Ready. Next: casedesk case create \"<claimant name>\"");
        Ok(())
    }
}
