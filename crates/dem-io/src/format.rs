//! Text raster format selection.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use dem_common::CellKind;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// File suffix that conventionally marks OmniGlyph output.
pub const OMNIGLYPH_EXTENSION: &str = "omg";

/// Syntax used by the text grid writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// ArcGrid ASCII: six-field header, space separated rows.
    #[default]
    ArcGrid,
    /// OmniGlyph: descriptive header, pipe delimited rows.
    OmniGlyph,
}

impl TextFormat {
    /// Pick a format from a file name: `.omg` (any case) selects OmniGlyph,
    /// anything else ArcGrid ASCII.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(OMNIGLYPH_EXTENSION) => Self::OmniGlyph,
            _ => Self::ArcGrid,
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "arcgrid" | "ascii" | "asc" => Some(Self::ArcGrid),
            "omniglyph" | "omg" => Some(Self::OmniGlyph),
            _ => None,
        }
    }

    /// Get the format name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArcGrid => "arcgrid",
            Self::OmniGlyph => "omniglyph",
        }
    }

    /// Cell separator; it is also written after the last cell of a row.
    pub fn separator(&self) -> &'static str {
        match self {
            Self::ArcGrid => " ",
            Self::OmniGlyph => "|",
        }
    }

    /// Prefix written before the first cell of a row.
    pub fn row_prefix(&self) -> &'static str {
        match self {
            Self::ArcGrid => "",
            Self::OmniGlyph => "|",
        }
    }
}

/// Render a number the way text grids store it: integer kinds are
/// truncated toward zero, decimal kinds use `precision` fractional digits.
pub(crate) fn write_number<W, V>(
    out: &mut W,
    value: V,
    kind: CellKind,
    precision: usize,
) -> io::Result<()>
where
    W: Write + ?Sized,
    V: ToPrimitive + Display,
{
    match kind {
        CellKind::Integer => match value.to_i64() {
            Some(v) => write!(out, "{}", v),
            None => write!(out, "{}", value),
        },
        CellKind::Decimal => match value.to_f64() {
            Some(v) => write!(out, "{:.*}", precision, v),
            None => write!(out, "{}", value),
        },
    }
}
