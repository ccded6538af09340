pub mod config;
pub mod delete;
pub mod draft;
pub mod form;
pub mod history;
pub mod sync;

pub use config::config_command;
pub use delete::delete_command;
pub use draft::draft_command;
pub use form::new_command;
pub use history::{history_command, show_command};
pub use sync::sync_command;
