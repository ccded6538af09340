//! Tool settings management

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::store::repository::settings;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show all settings
    Show,
    /// Get one setting value
    Get {
        /// Setting key
        key: String,
    },
    /// Set a setting value
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
    /// Remove a setting
    Reset {
        /// Setting key
        key: String,
    },
}

pub async fn config_command(command: ConfigCommands) -> Result<()> {
    let store = crate::record_store();

    match command {
        ConfigCommands::Show => {
            println!();
            println!("  {}", "Settings:".bright_white().bold());
            for key in settings::KNOWN_KEYS {
                let value = store.get_setting(key).await?;
                match value {
                    Some(value) => println!("  {} = {}", key.cyan(), value),
                    None => println!("  {} = {}", key.cyan(), "(unset)".dimmed()),
                }
            }
        }
        ConfigCommands::Get { key } => {
            validate_key(&key)?;
            match store.get_setting(&key).await? {
                Some(value) => println!("{}", value),
                None => println!("{}", "(unset)".dimmed()),
            }
        }
        ConfigCommands::Set { key, value } => {
            validate_key(&key)?;
            store.set_setting(&key, &value).await?;
            println!("  {} {} = {}", "Set".bright_green(), key.cyan(), value);
            if key == settings::ENDPOINT_URL {
                println!("  {}", "New endpoint takes effect on the next run".dimmed());
            }
        }
        ConfigCommands::Reset { key } => {
            validate_key(&key)?;
            if store.delete_setting(&key).await? {
                println!("  {} {}", "Unset".bright_green(), key.cyan());
            } else {
                println!("  {} was not set", key.cyan());
            }
        }
    }

    Ok(())
}

fn validate_key(key: &str) -> Result<()> {
    if settings::KNOWN_KEYS.contains(&key) {
        Ok(())
    } else {
        anyhow::bail!("Unknown setting '{}'. Known settings: {}", key, settings::KNOWN_KEYS.join(", "))
    }
}
