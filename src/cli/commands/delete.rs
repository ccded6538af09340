//! Submission deletion

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::cli::prompts;
use crate::scorecard::DRAFT_KEY;
use crate::store::RecordStore;

#[derive(Args)]
pub struct DeleteArgs {
    /// Submission id to delete
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

/// Delete a stored submission after confirmation
pub async fn delete_command(args: DeleteArgs) -> Result<()> {
    if args.id == DRAFT_KEY {
        anyhow::bail!("Use 'scorecard-cli draft clear' to remove the draft");
    }

    let store = crate::record_store();

    // get() errors on a corrupted entry, which is still deletable
    let exists = match store.get(&args.id).await {
        Ok(Some(_)) => true,
        Ok(None) => false,
        Err(_) => true,
    };
    if !exists {
        anyhow::bail!("No submission stored under '{}'", args.id);
    }

    if !args.yes && !prompts::confirm(&format!("Delete submission '{}'?", args.id), false)? {
        println!("  {}", "Not deleted".dimmed());
        return Ok(());
    }

    store.delete(&args.id).await?;
    println!("  {} {}", "Deleted".bright_green(), args.id.bright_white());

    Ok(())
}
