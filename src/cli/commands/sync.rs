//! Manual re-delivery of pending submissions

use anyhow::Result;
use colored::*;

use crate::cli::ui::with_spinner;

/// Deliver every pending submission, then report the aggregate outcome
pub async fn sync_command() -> Result<()> {
    let coordinator = crate::coordinator();

    let newly_synced =
        with_spinner("Syncing pending submissions...", coordinator.sync_pending()).await?;
    let still_pending = coordinator.pending_count().await?;

    println!();
    if newly_synced > 0 {
        println!(
            "  {}",
            format!("{} submission(s) newly synced", newly_synced).bright_green().bold()
        );
    }
    if still_pending > 0 {
        println!(
            "  {}",
            format!("{} submission(s) still pending - will retry on the next sync", still_pending)
                .bright_yellow()
        );
    }
    if newly_synced == 0 && still_pending == 0 {
        println!("  {}", "Everything is synced".bright_green().bold());
    }

    Ok(())
}
