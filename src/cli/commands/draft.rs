//! Draft inspection and cleanup outside the form flow

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::cli::prompts;

#[derive(Subcommand)]
pub enum DraftCommands {
    /// Show the autosaved draft, if any
    Show,
    /// Discard the autosaved draft
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn draft_command(command: DraftCommands) -> Result<()> {
    match command {
        DraftCommands::Show => show_draft().await,
        DraftCommands::Clear { yes } => clear_draft(yes).await,
    }
}

async fn show_draft() -> Result<()> {
    let coordinator = crate::coordinator();

    let Some(draft) = coordinator.load_draft().await else {
        println!();
        println!("  {}", "No draft saved".dimmed());
        return Ok(());
    };

    println!();
    println!("  {}", "Autosaved draft".bright_white().bold());
    println!("  {} {}", "Location:".dimmed(), draft.location);
    println!("  {} {}", "Train:".dimmed(), draft.train_no);
    println!(
        "  {} {}",
        "Date:".dimmed(),
        draft.date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!("  {} {}", "Inspector:".dimmed(), draft.inspector_name);
    println!(
        "  {} {}",
        "Scored so far:".dimmed(),
        format!("{}/{}", draft.total_score(), draft.max_score())
    );
    println!();
    println!("  {}", "Run 'scorecard-cli new' to resume it".dimmed());

    Ok(())
}

async fn clear_draft(yes: bool) -> Result<()> {
    let coordinator = crate::coordinator();

    if !yes && !prompts::confirm("Discard the saved draft?", false)? {
        println!("  {}", "Draft kept".dimmed());
        return Ok(());
    }

    if coordinator.discard_draft().await? {
        println!("  {}", "Draft discarded".bright_green());
    } else {
        println!("  {}", "No draft to discard".dimmed());
    }

    Ok(())
}
