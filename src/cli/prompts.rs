//! Interactive prompts for the form and destructive-action flows

use anyhow::Result;
use chrono::NaiveDate;
use dialoguer::{Input, Select};

use crate::scorecard::model::MAX_SCORE;

/// Interactive confirmation prompt using arrow-key navigable selection
///
/// # Arguments
/// * `prompt` - The question to ask the user
/// * `default_yes` - Whether "Yes" should be the default selection (index 0)
///
/// # Returns
/// * `Ok(true)` if user selects "Yes"
/// * `Ok(false)` if user selects "No"
pub fn confirm(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

/// Simple text input prompt with optional default value
pub fn text_input(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_prompt = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);

    if let Some(default_val) = default {
        if !default_val.is_empty() {
            input_prompt = input_prompt.default(default_val.to_string());
        }
    }

    Ok(input_prompt.interact()?)
}

/// Prompt for a parameter score in 0..=10
pub fn score_input(prompt: &str, default: u8) -> Result<u8> {
    let score = Input::<u8>::new()
        .with_prompt(format!("{} (0-{})", prompt, MAX_SCORE))
        .default(default)
        .validate_with(|value: &u8| {
            if *value <= MAX_SCORE {
                Ok(())
            } else {
                Err(format!("Score must be between 0 and {}", MAX_SCORE))
            }
        })
        .interact()?;

    Ok(score)
}

/// Prompt for an inspection date; empty input means no date
pub fn date_input(prompt: &str, default: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    loop {
        let raw = text_input(
            &format!("{} (YYYY-MM-DD, empty to skip)", prompt),
            default.map(|d| d.to_string()).as_deref(),
        )?;

        if raw.trim().is_empty() {
            return Ok(None);
        }

        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => return Ok(Some(date)),
            Err(_) => println!("Invalid date '{}', expected YYYY-MM-DD", raw.trim()),
        }
    }
}
