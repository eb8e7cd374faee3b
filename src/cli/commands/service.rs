// Commands for the public signing page and the document service's lookup/sign-in
use anyhow::{bail, Result};
use casedesk::model::Signature;
use casedesk::{DocumentDispatcher, DocumentKind, Session};

use super::Workspace;

pub async fn sign_command(
    workspace: &Workspace,
    case_id: &str,
    kind: DocumentKind,
    typed: Option<String>,
    drawn: Option<String>,
) -> Result<()> {
    let signature = match (typed, drawn) {
        (Some(name), None) => Signature::Typed { name },
        (None, Some(image_url)) => Signature::Drawn { image_url },
        _ => bail!("give exactly one of --typed or --drawn"),
    };

    workspace
        .signatures
        .record_signature(case_id, kind, signature)
        .await?;
    println!("✍️  {kind} signed for case {case_id}");
    Ok(())
}

pub async fn lookup_command(workspace: &Workspace, email: &str) -> Result<()> {
    let dispatcher = workspace.dispatcher()?;
    match dispatcher.lookup_case_id(email).await? {
        Some(case_id) => println!("🔎 {email} → case {case_id}"),
        None => println!("🔎 No case registered for {email}"),
    }
    Ok(())
}

pub async fn sign_in_command(workspace: &Workspace, email: &str, password: &str) -> Result<()> {
    let dispatcher = workspace.dispatcher()?;
    let grant = dispatcher.sign_in(email, password).await?;
    let session = Session::from_grant(email, grant)?;

    println!("🔐 Signed in as {} ({})", session.email, session.role_name());
    if let Some(token) = &session.token {
        println!("   🔑 Token: {token}");
    }
    if let Some(partner_ref) = session.partner_ref() {
        println!("   🤝 Partner reference: {partner_ref}");
        println!("   💡 Use --as-partner {partner_ref} to act with this session");
    }
    Ok(())
}
