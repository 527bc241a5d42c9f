//! outsw binary entry point
//!
//! Dispatches to the one-shot commands or the terminal menu.

use clap::Parser;
use color_eyre::eyre::Result;
use outsw::{cli::Args, cli::Command, commands, config::Config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        // No subcommand - list devices
        None => {
            let config = load_config_with_logging()?;
            commands::list(&config, false).await
        }

        Some(Command::List { json }) => {
            let config = load_config_with_logging()?;
            commands::list(&config, json).await
        }

        Some(Command::Switch { id, label }) => {
            let config = load_config_with_logging()?;
            commands::switch(&config, &id, label.as_deref())
        }

        Some(Command::Validate) => {
            let config = load_config_with_logging()?;
            config.print_summary();
            Ok(())
        }

        // TUI - logs go to a file so they don't corrupt the screen
        Some(Command::Menu) => {
            #[cfg(feature = "tui")]
            {
                let config = Config::load()?;
                let _log_guard = logging::init_file(&config.log_filter())?;
                outsw::tui::run(config).await
            }
            #[cfg(not(feature = "tui"))]
            {
                eprintln!("TUI feature not enabled");
                eprintln!("Rebuild with: cargo build --features tui");
                std::process::exit(1);
            }
        }
    }
}

/// CLI logs go to stderr at warn level unless `RUST_LOG` says otherwise
fn load_config_with_logging() -> Result<Config> {
    logging::init_stderr("warn");
    Config::load()
}
