//! Interactive score-card entry
//!
//! Walks the canonical schema section by section, autosaving the draft as
//! the form progresses. Submitting hands the finished record to the sync
//! coordinator; declining keeps the work as a draft for next time.

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::cli::prompts;
use crate::cli::ui::with_spinner;
use crate::scorecard::ScoreCardRecord;
use crate::store::repository::settings;

#[derive(Args)]
pub struct NewArgs {
    /// Station or location being inspected
    #[arg(long)]
    pub location: Option<String>,

    /// Train number under inspection
    #[arg(long)]
    pub train_no: Option<String>,

    /// Inspection date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,
}

/// Fill in and submit a new score-card
pub async fn new_command(args: NewArgs) -> Result<()> {
    let coordinator = crate::coordinator();
    let store = crate::record_store();

    let mut record = match coordinator.load_draft().await {
        Some(draft) => {
            let summary = draft_summary(&draft);
            if prompts::confirm(&format!("Resume saved draft ({})?", summary), true)? {
                println!("  {}", "Draft restored".bright_green());
                draft
            } else {
                coordinator.discard_draft().await?;
                println!("  {}", "Draft discarded".dimmed());
                ScoreCardRecord::default()
            }
        }
        None => ScoreCardRecord::default(),
    };

    // Prefill inspector identity from settings on a fresh form
    if record.inspector_name.is_empty() {
        if let Some(name) = store.get_setting(settings::INSPECTOR_NAME).await? {
            record.set_inspector_name(name);
        }
    }
    if record.inspector_designation.is_empty() {
        if let Some(designation) = store.get_setting(settings::INSPECTOR_DESIGNATION).await? {
            record.set_inspector_designation(designation);
        }
    }

    println!();
    println!("  {}", "Inspection details".bright_white().bold());

    let location = match args.location {
        Some(location) => location,
        None => prompts::text_input("Location / station", Some(&record.location))?,
    };
    record.set_location(location);

    let train_no = match args.train_no {
        Some(train_no) => train_no,
        None => prompts::text_input("Train number", Some(&record.train_no))?,
    };
    record.set_train_no(train_no);

    let date = match args.date {
        Some(date) => Some(date),
        None => prompts::date_input("Inspection date", record.date)?,
    };
    record.set_date(date);

    let inspector_name = prompts::text_input("Inspector name", Some(&record.inspector_name))?;
    record.set_inspector_name(inspector_name);

    let inspector_designation =
        prompts::text_input("Inspector designation", Some(&record.inspector_designation))?;
    record.set_inspector_designation(inspector_designation);

    coordinator.save_draft(&record).await;

    for index in 0..record.sections.len() {
        let title = record.sections[index].title.clone();
        println!();
        println!("  {}", title.bright_blue().bold());

        let section = &mut record.sections[index];
        for parameter in &mut section.parameters {
            parameter.score = prompts::score_input(&parameter.name, parameter.score)?;
            parameter.remarks = prompts::text_input("  Remarks", Some(&parameter.remarks))?;
        }

        // Autosave after each completed section so an interrupted session
        // resumes close to where it stopped
        coordinator.save_draft(&record).await;
    }

    println!();
    let remarks_overall = prompts::text_input("Overall remarks", Some(&record.remarks_overall))?;
    record.set_remarks_overall(remarks_overall);
    coordinator.save_draft(&record).await;

    println!();
    println!(
        "  Total score: {}",
        format!("{}/{}", record.total_score(), record.max_score()).bright_white().bold()
    );

    if !prompts::confirm("Submit this score-card now?", true)? {
        println!("  {}", "Kept as draft - run 'scorecard-cli new' to continue".bright_yellow());
        return Ok(());
    }

    let submission = coordinator.submit(record).await?;
    println!("  {} {}", "Saved locally as".bright_green(), submission.id.bright_white().bold());

    let delivered = with_spinner("Delivering to endpoint...", submission.delivery)
        .await
        .unwrap_or(false);

    if delivered {
        println!("  {}", "Delivered and marked as synced".bright_green().bold());
    } else {
        println!(
            "  {}",
            "Not delivered yet - it stays pending and 'scorecard-cli sync' will retry"
                .bright_yellow()
        );
    }

    Ok(())
}

fn draft_summary(draft: &ScoreCardRecord) -> String {
    let mut parts = Vec::new();
    if !draft.location.is_empty() {
        parts.push(draft.location.clone());
    }
    if !draft.train_no.is_empty() {
        parts.push(format!("train {}", draft.train_no));
    }
    if let Some(date) = draft.date {
        parts.push(date.to_string());
    }
    if parts.is_empty() {
        "no details yet".to_string()
    } else {
        parts.join(", ")
    }
}
