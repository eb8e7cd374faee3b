use casedesk::model::Amount;
use casedesk::{DocumentKind, FollowUpStage, LogChannel, StageFilter};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "casedesk")]
#[command(about = "Insurance complaint case management")]
#[command(
    long_about = "Casedesk tracks insurance-claim complaints from intake through internal review, \
                  IGMS and the ombudsman until they are resolved or rejected. Get started with \
                  'casedesk init' and 'casedesk case create'."
)]
pub struct Cli {
    /// Act as a partner instead of staff
    #[arg(long, global = true, value_name = "PARTNER_REF", help = "Run the command with a partner session")]
    pub as_partner: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default casedesk.toml and create the data directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, help = "Overwrite an existing casedesk.toml")]
        force: bool,
        /// Show what would be created without making changes
        #[arg(long, help = "Show what would be created without making changes")]
        dry_run: bool,
    },
    /// Create, inspect and edit cases
    #[command(subcommand)]
    Case(CaseCommands),
    /// Move a case through review, IGMS and the ombudsman
    #[command(subcommand)]
    Stage(StageCommands),
    /// Read and append case log channels
    #[command(subcommand)]
    Log(LogCommands),
    /// Manage referring partners
    #[command(subcommand)]
    Partner(PartnerCommands),
    /// Public enquiries and their promotion to cases
    #[command(subcommand)]
    Enquiry(EnquiryCommands),
    /// Generate and send consent forms and contracts
    #[command(subcommand)]
    Document(DocumentCommands),
    /// Record a claimant's signature on a consent form or contract
    Sign {
        case_id: String,
        #[arg(long, default_value = "consent", help = "Document to sign: consent or contract")]
        kind: DocumentKind,
        /// Name typed by the claimant
        #[arg(long, conflicts_with = "drawn", required_unless_present = "drawn")]
        typed: Option<String>,
        /// URL of the uploaded drawn signature image
        #[arg(long)]
        drawn: Option<String>,
    },
    /// Look up the case id registered for an email address
    Lookup { email: String },
    /// Sign in against the document service and show the granted session
    SignIn {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show case counts per dashboard tab
    Dashboard,
}

#[derive(Subcommand)]
pub enum CaseCommands {
    /// Open a new case
    Create(CaseFactsArgs),
    /// Show one case
    Show {
        id: String,
        #[arg(long, help = "Print the stored document as JSON")]
        json: bool,
    },
    /// List cases, newest first
    List {
        #[arg(long, default_value = "all", help = "Dashboard tab: all, new, review, igms, ombudsman, resolved, rejected")]
        stage: StageFilter,
    },
    /// Permanently delete a case
    Delete {
        id: String,
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
    /// Change contact and claim facts
    Edit {
        id: String,
        #[command(flatten)]
        facts: CaseEditArgs,
    },
    /// Add an uploaded file to the case file bucket
    Attach { id: String, name: String, url: String },
}

#[derive(Args)]
pub struct CaseFactsArgs {
    /// Claimant name
    pub name: String,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub policy_holder: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub policy_no: Option<String>,
    #[arg(long)]
    pub claim_no: Option<String>,
    #[arg(long)]
    pub partner_ref: Option<String>,
    #[arg(long, help = "Estimated claim amount, e.g. 150000 or 1,50,000.50")]
    pub amount: Option<Amount>,
    /// Free-text description of the claim
    #[arg(long)]
    pub claim: Option<String>,
    #[arg(long, help = "Date the complaint was raised (YYYY-MM-DD)")]
    pub complaint_date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct CaseEditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub policy_holder: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub policy_no: Option<String>,
    #[arg(long)]
    pub claim_no: Option<String>,
    #[arg(long)]
    pub partner_ref: Option<String>,
    #[arg(long)]
    pub amount: Option<Amount>,
    #[arg(long)]
    pub claim: Option<String>,
    #[arg(long)]
    pub commission_received: Option<Amount>,
    #[arg(long)]
    pub partner_commission: Option<Amount>,
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// Take a new case into internal review
    Review { id: String },
    /// File a reviewed case with IGMS
    Igms {
        id: String,
        #[arg(long, help = "Insurer's reason for rejecting the claim")]
        reason: Option<String>,
        #[arg(long, help = "Mark the submission as short of documents")]
        document_short: bool,
    },
    /// Escalate an IGMS case to the ombudsman
    Ombudsman {
        id: String,
        #[arg(long)]
        case_reason: Option<String>,
        #[arg(long)]
        igms_reason: Option<String>,
    },
    /// Close an active case as resolved
    Resolve { id: String },
    /// Reject a case at its current stage
    Reject {
        id: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long, help = "Confirm the rejection")]
        yes: bool,
    },
    /// Record ombudsman filing details
    OmbudsmanStatus {
        id: String,
        #[arg(long)]
        courier_date: Option<NaiveDate>,
        #[arg(long)]
        complaint_no: Option<String>,
        #[arg(long)]
        six_a_form: Option<bool>,
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        rejection_reason: Option<String>,
    },
    /// Schedule the next follow-up with IGMS or the ombudsman
    FollowUp {
        id: String,
        #[arg(long, help = "igms or ombudsman")]
        stage: FollowUpStage,
        #[arg(long, help = "Follow-up date (YYYY-MM-DD)")]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
pub enum LogCommands {
    /// Append a remark to a log channel
    Add {
        id: String,
        remark: String,
        #[arg(long, default_value = "main", help = "Channel: main, internal, igms, ombudsman")]
        channel: LogChannel,
    },
    /// Print a log channel, oldest first
    Show {
        id: String,
        #[arg(long, default_value = "main")]
        channel: LogChannel,
    },
}

#[derive(Subcommand)]
pub enum PartnerCommands {
    /// Register a partner
    Create {
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        source: Option<String>,
    },
    /// List partners
    List,
    /// Show one partner
    Show { id: String },
    /// List cases carrying a partner reference
    Cases { partner_ref: String },
}

#[derive(Subcommand)]
pub enum EnquiryCommands {
    /// Submit an enquiry as the public form would
    Create {
        name: String,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        policy_no: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        partner_ref: Option<String>,
    },
    /// List enquiries, newest first
    List,
    /// Promote an enquiry to a case
    Migrate { id: String },
}

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// Generate a document for a case and email it to the claimant
    Send {
        id: String,
        #[arg(long, default_value = "consent")]
        kind: DocumentKind,
    },
    /// Email an already generated document again
    Resend {
        id: String,
        #[arg(long, default_value = "consent")]
        kind: DocumentKind,
        #[arg(long, help = "Send to this address instead of the case email")]
        email: Option<String>,
    },
}
