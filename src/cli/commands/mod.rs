use anyhow::{bail, Result};
use casedesk::config::{StoreBackend, StoreConfig};
use casedesk::{
    CaseDeskConfig, DocumentStore, FileStore, HttpDispatcher, LifecycleEngine, LifecycleMetrics,
    PartnerRegistry, Session, SignatureCollector, TransitionOutcome,
};
use std::sync::Arc;
use tracing::debug;

pub mod case;
pub mod dashboard;
pub mod document;
pub mod enquiry;
pub mod init;
pub mod log;
pub mod partner;
pub mod service;
pub mod stage;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self, workspace: &Workspace) -> Result<()>;
}

/// Everything a command needs: the configured store wrapped in the engine
/// and registries, plus the caller's session.
pub struct Workspace {
    pub config: CaseDeskConfig,
    pub session: Session,
    pub metrics: Arc<LifecycleMetrics>,
    pub engine: LifecycleEngine,
    pub partners: PartnerRegistry,
    pub signatures: SignatureCollector,
}

impl Workspace {
    pub async fn open(config: CaseDeskConfig, as_partner: Option<String>) -> Result<Self> {
        let store = open_store(&config.store).await?;
        let session = match as_partner {
            Some(partner_ref) => Session::partner(&config.session.user_id, &config.session.email, partner_ref),
            None => Session::staff(&config.session.user_id, &config.session.email),
        };
        debug!(
            role = session.role_name(),
            backend = store.backend(),
            "Workspace opened"
        );

        let metrics = Arc::new(LifecycleMetrics::new());
        Ok(Self {
            engine: LifecycleEngine::new(store.clone()).with_metrics(metrics.clone()),
            metrics,
            partners: PartnerRegistry::new(store.clone()),
            signatures: SignatureCollector::new(store),
            session,
            config,
        })
    }

    pub fn dispatcher(&self) -> Result<HttpDispatcher> {
        Ok(HttpDispatcher::new(&self.config.dispatcher)?.with_metrics(self.metrics.clone()))
    }

    /// Log the run's counters and release the store
    pub async fn close(&self) {
        self.metrics.log_stats();
        self.engine.store().close().await;
    }
}

pub async fn open_store(settings: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match settings.backend {
        StoreBackend::File => Ok(Arc::new(FileStore::open(settings.data_dir.clone())?)),
        #[cfg(feature = "database")]
        StoreBackend::Sqlite => {
            let store =
                casedesk::store::SqliteStore::connect(&settings.database_url, settings.auto_migrate).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "database"))]
        StoreBackend::Sqlite => {
            bail!("the sqlite backend needs casedesk built with --features database")
        }
    }
}

/// Destructive commands run only with an explicit `--yes`
pub fn require_confirmation(confirmed: bool, action: &str) -> Result<()> {
    if !confirmed {
        bail!("refusing to {action} without --yes");
    }
    Ok(())
}

pub fn print_outcome(outcome: &TransitionOutcome) {
    println!(
        "✅ Case {}: {} → {}",
        outcome.case_id,
        outcome.from.status_label(),
        outcome.to.status_label()
    );
}

pub fn show_how_to_get_started() -> Result<()> {
    println!("📁 Casedesk - Insurance Complaint Case Management");
    println!();
    println!("To get started:");
    println!("  ⚙️  casedesk init                      # Write casedesk.toml");
    println!("  🆕 casedesk case create \"Asha Rao\"     # Open a case");
    println!("  📋 casedesk case list                  # See every case");
    println!("  📊 casedesk dashboard                  # Counts per stage");
    println!();
    println!("Moving cases along:");
    println!("  🔍 casedesk stage review <id>");
    println!("  🏛️  casedesk stage igms <id>");
    println!("  ⚖️  casedesk stage ombudsman <id>");
    println!("  ✅ casedesk stage resolve <id>");
    println!();
    println!("💡 Run 'casedesk --help' for the full command list.");
    Ok(())
}
