use std::{ffi::OsStr, path::Path};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};

use crate::resolver::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }
}

/// Memory-maps an OpenAPI document and parses it into a [`Document`].
pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let format = path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(SpecFormat::default(), SpecFormat::from_extension);

    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("Failed to open {}", path.display()))?;

    Ok(Self { file, format })
  }

  pub fn format(&self) -> SpecFormat {
    self.format
  }

  /// JSON input keeps the declaration order of component keys; YAML input falls back to
  /// alphabetical order.
  pub fn parse(&self) -> anyhow::Result<Document> {
    match self.format {
      SpecFormat::Json => {
        let value = serde_json::from_slice::<serde_json::Value>(self.file.as_slice())?;
        Ok(Document::from_json_value(value)?)
      }
      SpecFormat::Yaml => {
        let content = std::str::from_utf8(self.file.as_slice())?;
        Ok(Document::from_spec(oas3::from_yaml(content)?))
      }
    }
  }
}
