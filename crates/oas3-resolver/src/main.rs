#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::ui::{Cli, Colors, Commands, ListCommands, colors};

mod ui;

fn init_tracing(verbose: bool) {
  let fallback = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::List { list_command } => {
      init_tracing(false);
      match list_command {
        ListCommands::Models { input } => ui::commands::list_models(&input, &colors).await?,
        ListCommands::Enums { input } => ui::commands::list_enums(&input, &colors).await?,
        ListCommands::Operations { input } => ui::commands::list_operations(&input, &colors).await?,
      }
    }
    Commands::Check(command) => {
      init_tracing(command.verbose);
      let config = ui::commands::CheckConfig::from_command(command)?;
      ui::commands::check_document(config, &colors).await?;
    }
  }

  Ok(())
}
