use super::commands::config::ConfigCommands;
use super::commands::delete::DeleteArgs;
use super::commands::draft::DraftCommands;
use super::commands::form::NewArgs;
use super::commands::history::{HistoryArgs, ShowArgs};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scorecard-cli")]
#[command(about = "Offline-first inspection score-card entry and sync")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in and submit a new inspection score-card
    New(NewArgs),
    /// List stored submissions and their sync state
    History(HistoryArgs),
    /// Show one stored submission in full
    Show(ShowArgs),
    /// Deliver all pending submissions to the endpoint
    Sync,
    /// Delete a stored submission
    Delete(DeleteArgs),
    /// Inspect or discard the autosaved draft
    #[command(subcommand)]
    Draft(DraftCommands),
    /// Manage tool settings
    #[command(subcommand)]
    Config(ConfigCommands),
}
