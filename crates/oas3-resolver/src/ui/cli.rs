use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-resolver")]
#[command(author, version, about = "Resolves OpenAPI component schemas into a typed property model")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Resolve a specification and report statistics and diagnostics
  Check(CheckCommand),
  /// List information from a resolved specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
}

#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
  /// Path to the OpenAPI specification file (JSON or YAML)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Enable verbose output: cycle details, every warning and debug logging
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,

  /// Rename a generated class (repeatable): OLD=NEW or OLD=NEW:module
  #[arg(long = "override", value_name = "OLD=NEW[:MODULE]")]
  pub overrides: Vec<String>,

  /// Do not prefix titled nested schemas with their parent's class name
  #[arg(long, default_value_t = false)]
  pub no_title_prefixes: bool,

  /// Print the resolution statistics as JSON
  #[arg(long, default_value_t = false)]
  pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List the resolved models with their properties
  Models {
    /// Path to the OpenAPI specification file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
  /// List the resolved enums with their values
  Enums {
    /// Path to the OpenAPI specification file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
  /// List all operations with their resolved request and response types
  Operations {
    /// Path to the OpenAPI specification file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
