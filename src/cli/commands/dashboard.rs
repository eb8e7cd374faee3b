use anyhow::Result;
use casedesk::StageFilter;

use super::Workspace;

/// Case counts per dashboard tab
pub async fn dashboard_command(workspace: &Workspace) -> Result<()> {
    let counts = workspace.engine.stage_counts(&workspace.session).await?;

    println!("📊 CASE DASHBOARD");
    println!("==========================");
    for filter in StageFilter::ALL {
        println!("   {:<10} {:>5}", filter.as_str(), counts.get(filter));
    }
    Ok(())
}
