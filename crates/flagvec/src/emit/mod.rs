//! Rendering of generated tables for downstream test harnesses.

mod c;
mod json;

use std::fmt;
use std::str::FromStr;

pub use c::render_c;
pub use json::render_json;

use crate::error::ConfigError;
use crate::Synthesis;

/// Symbol prefix used when none is configured.
pub const DEFAULT_SYMBOL_PREFIX: &str = "binop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// C header plus data sources, separated by file-splitter markers.
    #[default]
    C,
    Json,
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" => Ok(Format::C),
            "json" => Ok(Format::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::C => "c",
            Format::Json => "json",
        })
    }
}

pub fn render(
    synthesis: &Synthesis,
    format: Format,
    prefix: &str,
) -> serde_json::Result<String> {
    match format {
        Format::C => Ok(render_c(synthesis, prefix)),
        Format::Json => render_json(synthesis),
    }
}
