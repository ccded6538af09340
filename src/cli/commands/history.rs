//! Submission history listing and detail view

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::scorecard::{DRAFT_KEY, codec};
use crate::store::RecordStore;

#[derive(Args)]
pub struct HistoryArgs {
    /// Show only submissions still pending delivery
    #[arg(long)]
    pub pending: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Submission id to display
    pub id: String,
}

/// List stored submissions, newest first
pub async fn history_command(args: HistoryArgs) -> Result<()> {
    let store = crate::record_store();

    let mut keys: Vec<String> = store
        .keys()
        .await?
        .into_iter()
        .filter(|key| key != DRAFT_KEY)
        .collect();
    // Ids are timestamp-derived, so lexicographic order is chronological
    keys.sort();
    keys.reverse();

    if keys.is_empty() {
        println!();
        println!("  {}", "No submissions stored yet".dimmed());
        println!("  {}", "Run 'scorecard-cli new' to create one".dimmed());
        return Ok(());
    }

    println!();
    println!("  {}", "Stored submissions:".bright_white().bold());

    let mut shown = 0;
    for key in &keys {
        match store.get(key).await {
            Ok(Some(mapping)) => {
                let record = codec::decode(&mapping);
                if args.pending && record.is_synced {
                    continue;
                }
                shown += 1;

                let marker = if record.is_synced {
                    "●".bright_green()
                } else {
                    "○".bright_yellow()
                };
                let state = if record.is_synced {
                    "synced".bright_green()
                } else {
                    "pending".bright_yellow()
                };

                let date = record
                    .date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "no date".to_string());

                println!("  {} {} [{}]", marker, key.bright_white(), state);
                println!(
                    "    {} {} | {} {} | {}",
                    "location:".dimmed(),
                    nonempty_or(&record.location, "-"),
                    "train:".dimmed(),
                    nonempty_or(&record.train_no, "-"),
                    date.dimmed()
                );
            }
            Ok(None) => {}
            Err(e) => {
                shown += 1;
                log::warn!("Unreadable record {}: {:#}", key, e);
                println!("  {} {} [{}]", "✗".bright_red(), key.bright_white(), "unreadable".bright_red());
                println!(
                    "    {}",
                    format!("corrupted entry - remove with 'scorecard-cli delete {}'", key).dimmed()
                );
            }
        }
    }

    if shown == 0 {
        println!("  {}", "Nothing pending - everything is synced".bright_green());
    }

    Ok(())
}

/// Show one submission in full
pub async fn show_command(args: ShowArgs) -> Result<()> {
    let store = crate::record_store();

    let mapping = match store.get(&args.id).await? {
        Some(mapping) => mapping,
        None => anyhow::bail!("No submission stored under '{}'", args.id),
    };
    let record = codec::decode(&mapping);

    println!();
    println!("  {}", args.id.bright_white().bold());
    let state = if record.is_synced {
        "synced".bright_green().bold()
    } else {
        "pending".bright_yellow().bold()
    };
    println!("  {} {}", "Sync state:".dimmed(), state);
    println!("  {} {}", "Location:".dimmed(), nonempty_or(&record.location, "-"));
    println!("  {} {}", "Train:".dimmed(), nonempty_or(&record.train_no, "-"));
    println!(
        "  {} {}",
        "Date:".dimmed(),
        record.date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  {} {} ({})",
        "Inspector:".dimmed(),
        nonempty_or(&record.inspector_name, "-"),
        nonempty_or(&record.inspector_designation, "-")
    );

    for section in &record.sections {
        println!();
        println!(
            "  {} {}",
            section.title.bright_blue().bold(),
            format!("{}/{}", section.total_score(), section.max_score()).dimmed()
        );
        for parameter in &section.parameters {
            let score = format!("{:>2}", parameter.score);
            let score = match parameter.score {
                0..=3 => score.bright_red(),
                4..=6 => score.bright_yellow(),
                _ => score.bright_green(),
            };
            print!("    {} {}", score, parameter.name);
            if parameter.remarks.is_empty() {
                println!();
            } else {
                println!(" {}", format!("({})", parameter.remarks).dimmed());
            }
        }
    }

    if !record.remarks_overall.is_empty() {
        println!();
        println!("  {} {}", "Overall remarks:".dimmed(), record.remarks_overall);
    }

    println!();
    println!(
        "  {} {}",
        "Total:".bright_white().bold(),
        format!("{}/{}", record.total_score(), record.max_score()).bright_white().bold()
    );

    Ok(())
}

fn nonempty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
