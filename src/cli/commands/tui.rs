//! TUI launcher command.
//!
//! Launches the interactive TUI interface.

use crate::cli::{Cli, TuiArgs};
use crate::error::Result;

/// Run the TUI command.
pub fn run(cli: &Cli, args: &TuiArgs) -> Result<()> {
    #[cfg(feature = "tui")]
    {
        let dir = super::get_chat_dir(cli)?;
        let mut config = super::load_config(cli, &dir)?;
        if let Some(theme) = &args.theme {
            config.display.theme.clone_from(theme);
        }
        let folders = super::get_folders(cli, &dir)?;
        crate::tui::run(dir, folders, config, args.chat.as_deref())
    }

    #[cfg(not(feature = "tui"))]
    {
        let _ = (cli, args);
        Err(crate::error::ViewerError::unsupported(
            "TUI feature not enabled. Rebuild with --features tui",
        ))
    }
}
