use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use itertools::Itertools;
use oas3_resolver::{
  resolver::{AdditionalProperties, Orchestrator, Property, Resolution, ResolverConfig},
  utils::spec::SpecLoader,
};

use crate::ui::{Colors, term_width};

async fn resolve(input: &Path) -> anyhow::Result<Resolution> {
  let document = SpecLoader::open(input).await?.parse()?;
  Ok(Orchestrator::new(document, ResolverConfig::default()).resolve()?)
}

fn table(colors: &Colors, headers: &[&str]) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in headers {
    row.add_cell(Cell::new(header).fg(Colors::cell(colors.label())));
  }
  table.set_header(row);
  table
}

fn class_cell(name: &str, colors: &Colors) -> Cell {
  Cell::new(name)
    .fg(Colors::cell(colors.value()))
    .add_attribute(Attribute::Bold)
}

fn describe_property(property: &Property) -> String {
  let marker = if property.is_required() { "" } else { "?" };
  format!("{}{marker}: {}", property.name(), property.type_string())
}

pub async fn list_models(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let resolution = resolve(input).await?;

  let mut table = table(colors, &["MODEL", "MODULE", "PROPERTIES", "EXTRA"]);
  for model in resolution.schemas.models().sorted_by(|a, b| a.class.cmp(&b.class)) {
    let extra = match &model.additional_properties {
      AdditionalProperties::Disallowed => "none".to_string(),
      AdditionalProperties::Freeform => "any".to_string(),
      AdditionalProperties::Typed(property) => property.type_string(),
    };
    let mut name = model.class.name.clone();
    if resolution.schemas.is_cyclic(&model.class) {
      name.push_str(" ↻");
    }

    let mut row = Row::new();
    row.add_cell(class_cell(&name, colors));
    row.add_cell(Cell::new(&model.class.module_name).fg(Colors::cell(colors.class())));
    row.add_cell(Cell::new(model.properties().map(describe_property).join("\n")));
    row.add_cell(Cell::new(extra).fg(Colors::cell(colors.heading())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}

pub async fn list_enums(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let resolution = resolve(input).await?;

  let mut table = table(colors, &["ENUM", "KIND", "VALUES"]);
  for enumeration in resolution.schemas.enums().sorted_by(|a, b| a.class.cmp(&b.class)) {
    let values = enumeration
      .values
      .iter()
      .map(|(key, literal)| format!("{key} = {literal}"))
      .join("\n");

    let mut row = Row::new();
    row.add_cell(class_cell(&enumeration.class.name, colors));
    row.add_cell(
      Cell::new(enumeration.value_kind.to_string())
        .fg(Colors::cell(colors.warning()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(values).fg(Colors::cell(colors.heading())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let resolution = resolve(input).await?;

  let mut table = table(colors, &["OPERATION ID", "METHOD", "PATH", "BODY", "RESPONSES"]);
  for operation in resolution.operations.iter().sorted_by(|a, b| a.id.cmp(&b.id)) {
    let body = operation
      .request_body
      .as_ref()
      .map(Property::type_string)
      .unwrap_or_default();
    let responses = operation
      .responses
      .iter()
      .map(|(status, property)| match property {
        Some(property) => format!("{status}: {}", property.type_string()),
        None => status.clone(),
      })
      .join("\n");

    let mut row = Row::new();
    row.add_cell(class_cell(&operation.id, colors));
    row.add_cell(
      Cell::new(&operation.method)
        .fg(Colors::cell(colors.warning()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(&operation.path).fg(Colors::cell(colors.heading())));
    row.add_cell(Cell::new(body).fg(Colors::cell(colors.class())));
    row.add_cell(Cell::new(responses).fg(Colors::cell(colors.class())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}
