use std::{collections::BTreeMap, path::PathBuf};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::ui::{CheckCommand, Colors};
use oas3_resolver::{
  resolver::{ClassOverride, Orchestrator, ResolutionStats, ResolverConfig},
  utils::spec::SpecLoader,
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct CheckConfig {
  pub input: PathBuf,
  pub verbose: bool,
  pub quiet: bool,
  pub json: bool,
  pub title_prefixes: bool,
  pub overrides: BTreeMap<String, ClassOverride>,
}

impl CheckConfig {
  pub fn from_command(command: CheckCommand) -> anyhow::Result<Self> {
    let CheckCommand {
      input,
      verbose,
      quiet,
      overrides,
      no_title_prefixes,
      json,
    } = command;

    Ok(Self {
      input,
      verbose,
      quiet: quiet || json,
      json,
      title_prefixes: !no_title_prefixes,
      overrides: parse_overrides(overrides)?,
    })
  }

  fn resolver_config(&self) -> ResolverConfig {
    ResolverConfig::builder()
      .class_overrides(self.overrides.clone())
      .use_path_prefixes_for_title_model_names(self.title_prefixes)
      .build()
  }
}

/// Parses `OLD=NEW` and `OLD=NEW:module` entries. An empty `NEW` keeps the class name and only moves
/// the class to another module.
fn parse_overrides(entries: Vec<String>) -> anyhow::Result<BTreeMap<String, ClassOverride>> {
  let mut map = BTreeMap::new();
  for entry in entries {
    let (key, value) = entry
      .split_once('=')
      .filter(|(key, _)| !key.is_empty())
      .ok_or_else(|| anyhow::anyhow!("Invalid override format '{entry}': expected OLD=NEW[:module] (e.g., Pet=Animal)"))?;

    let (class_name, module_name) = match value.split_once(':') {
      Some((class_name, module_name)) => (class_name, Some(module_name.to_string())),
      None => (value, None),
    };
    let class_name = (!class_name.is_empty()).then(|| class_name.to_string());
    if class_name.is_none() && module_name.is_none() {
      anyhow::bail!("Invalid override format '{entry}': nothing to override");
    }

    map.insert(
      key.to_string(),
      ClassOverride {
        class_name,
        module_name,
      },
    );
  }
  Ok(map)
}

struct CheckLogger<'a> {
  config: &'a CheckConfig,
  colors: &'a Colors,
}

impl<'a> CheckLogger<'a> {
  fn new(config: &'a CheckConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading OpenAPI spec from: {}", self.config.input.display())
        .with(self.colors.heading())
        .to_string(),
    );
  }

  fn print_statistics(&self, stats: &ResolutionStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Passes:", stats.passes.to_string());
    if stats.reference_passes > 0 {
      self.stat("", format!("{} reference passes", stats.reference_passes));
    }
    self.stat("Models resolved:", stats.models_resolved.to_string());
    self.stat("Enums resolved:", stats.enums_resolved.to_string());
    self.stat("Parameters resolved:", stats.parameters_resolved.to_string());
    self.stat("Operations resolved:", stats.operations_resolved.to_string());
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }
    self.print_cycles(stats);
  }

  fn print_cycles(&self, stats: &ResolutionStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", stats.cycles_detected.to_string());

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.warning()),
          cycle.join(" -> ").with(self.colors.class())
        );
      }
    }
  }

  /// Errors always print; warnings only with `--verbose` or when nothing else is printed.
  fn print_warnings(&self, stats: &ResolutionStats) {
    let mut printed_header = false;
    for warning in &stats.warnings {
      if !(warning.is_error() || self.config.verbose || self.config.quiet) {
        continue;
      }

      if !printed_header && !self.config.quiet {
        println!();
        printed_header = true;
      }

      let (label, color) = if warning.is_error() {
        ("Error:", self.colors.error())
      } else {
        ("Warning:", self.colors.warning())
      };
      eprintln!("{} {}", label.with(color), warning.to_string().with(self.colors.heading()));
    }
  }

  fn log_result(&self, stats: &ResolutionStats) {
    if self.config.quiet {
      return;
    }
    println!();
    if stats.warnings.is_empty() {
      self.info(&"Every schema resolved".with(self.colors.success()).to_string());
    } else {
      self.info(
        &format!("{} schemas or operations could not be resolved", stats.warnings.len())
          .with(self.colors.warning())
          .to_string(),
      );
    }
  }
}

pub async fn check_document(config: CheckConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = CheckLogger::new(&config, colors);

  logger.log_loading();
  let document = SpecLoader::open(&config.input).await?.parse()?;

  let resolution = Orchestrator::new(document, config.resolver_config()).resolve()?;
  let stats = &resolution.stats;

  if config.json {
    println!("{}", serde_json::to_string_pretty(stats)?);
  }
  logger.print_statistics(stats);
  logger.print_warnings(stats);
  logger.log_result(stats);

  if !stats.warnings.is_empty() {
    anyhow::bail!(
      "{} problems found while resolving {}",
      stats.warnings.len(),
      config.input.display()
    );
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entries(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
  }

  #[test]
  fn test_parse_overrides_empty() {
    let result = parse_overrides(vec![]).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn test_parse_overrides_class_only() {
    let result = parse_overrides(entries(&["Pet=Animal"])).unwrap();
    assert_eq!(
      result.get("Pet"),
      Some(&ClassOverride {
        class_name: Some("Animal".to_string()),
        module_name: None,
      })
    );
  }

  #[test]
  fn test_parse_overrides_with_module() {
    let result = parse_overrides(entries(&["Pet=Animal:zoo", "Owner=:people"])).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result["Pet"].module_name.as_deref(), Some("zoo"));
    assert_eq!(result["Owner"].class_name, None);
    assert_eq!(result["Owner"].module_name.as_deref(), Some("people"));
  }

  #[test]
  fn test_parse_overrides_invalid_format() {
    let error = parse_overrides(entries(&["Pet"])).unwrap_err();
    assert!(error.to_string().contains("Invalid override format 'Pet'"));

    assert!(parse_overrides(entries(&["=Animal"])).is_err());
    assert!(parse_overrides(entries(&["Pet="])).is_err());
  }

  #[test]
  fn test_from_command_maps_flags() {
    let command = CheckCommand {
      input: PathBuf::from("openapi.json"),
      verbose: false,
      quiet: false,
      overrides: entries(&["Pet=Animal"]),
      no_title_prefixes: true,
      json: true,
    };
    let config = CheckConfig::from_command(command).unwrap();
    assert!(config.quiet, "json output implies quiet");

    let resolver = config.resolver_config();
    assert!(!resolver.use_path_prefixes_for_title_model_names);
    assert!(resolver.class_overrides.contains_key("Pet"));
  }
}
