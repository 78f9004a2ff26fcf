use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

/// One entry per output role: `(r, g, b)` on a dark background, then on a light one.
type Swatch = ((u8, u8, u8), (u8, u8, u8));

const TIMESTAMP: Swatch = ((118, 166, 166), (92, 62, 38));
const HEADING: Swatch = ((191, 126, 4), (70, 42, 25));
const LABEL: Swatch = ((217, 164, 4), (176, 103, 66));
const VALUE: Swatch = ((242, 211, 56), (199, 146, 76));
const CLASS: Swatch = ((118, 166, 166), (40, 111, 170));
const WARNING: Swatch = ((166, 84, 55), (211, 99, 70));
const ERROR: Swatch = ((214, 64, 48), (170, 30, 30));
const SUCCESS: Swatch = ((140, 182, 96), (34, 142, 90));

pub struct Colors {
  enabled: bool,
  theme: Theme,
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  const fn pick(&self, swatch: Swatch) -> Color {
    if !self.enabled {
      return Color::Reset;
    }
    let (r, g, b) = match self.theme {
      Theme::Dark => swatch.0,
      Theme::Light => swatch.1,
    };
    Color::Rgb { r, g, b }
  }

  pub const fn timestamp(&self) -> Color {
    self.pick(TIMESTAMP)
  }

  pub const fn heading(&self) -> Color {
    self.pick(HEADING)
  }

  pub const fn label(&self) -> Color {
    self.pick(LABEL)
  }

  pub const fn value(&self) -> Color {
    self.pick(VALUE)
  }

  pub const fn class(&self) -> Color {
    self.pick(CLASS)
  }

  pub const fn warning(&self) -> Color {
    self.pick(WARNING)
  }

  pub const fn error(&self) -> Color {
    self.pick(ERROR)
  }

  pub const fn success(&self) -> Color {
    self.pick(SUCCESS)
  }

  /// Same role colors for table cells.
  pub fn cell(color: Color) -> ComfyColor {
    match color {
      Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
      Color::AnsiValue(value) => ComfyColor::AnsiValue(value),
      _ => ComfyColor::Reset,
    }
  }

  const fn to_clap(swatch: Swatch) -> Option<clap::builder::styling::Color> {
    use clap::builder::styling::{Color as ClapColor, RgbColor};

    let (r, g, b) = swatch.0;
    Some(ClapColor::Rgb(RgbColor(r, g, b)))
  }

  pub const fn clap_styles() -> clap::builder::Styles {
    use clap::builder::styling::{Style, Styles};

    Styles::styled()
      .header(Style::new().bold().underline().fg_color(Self::to_clap(LABEL)))
      .usage(Style::new().bold().fg_color(Self::to_clap(LABEL)))
      .literal(Style::new().fg_color(Self::to_clap(SUCCESS)))
      .placeholder(Style::new().fg_color(Self::to_clap(CLASS)))
      .error(Style::new().bold().fg_color(Self::to_clap(ERROR)))
      .valid(Style::new().fg_color(Self::to_clap(SUCCESS)))
      .invalid(Style::new().bold().fg_color(Self::to_clap(WARNING)))
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => std::env::var("COLORFGBG")
      .ok()
      .as_deref()
      .and_then(theme_from_colorfgbg)
      .unwrap_or(Theme::Dark),
  }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); background indices 8 and up are light.
fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
  let background = value.rsplit(';').next()?.parse::<u8>().ok()?;
  Some(if background >= 8 { Theme::Light } else { Theme::Dark })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_theme_from_colorfgbg() {
    assert_eq!(theme_from_colorfgbg("15;0"), Some(Theme::Dark));
    assert_eq!(theme_from_colorfgbg("0;15"), Some(Theme::Light));
    assert_eq!(theme_from_colorfgbg("0;default;15"), Some(Theme::Light));
    assert_eq!(theme_from_colorfgbg("garbage"), None);
  }

  #[test]
  fn test_disabled_colors_reset() {
    let colors = Colors::new(false, Theme::Light);
    assert_eq!(colors.error(), Color::Reset);
    assert_eq!(Colors::cell(colors.class()), ComfyColor::Reset);
  }
}
