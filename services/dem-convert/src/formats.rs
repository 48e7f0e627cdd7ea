//! File format detection from paths.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use dem_io::format::OMNIGLYPH_EXTENSION;
use dem_io::TextFormat;

/// Formats the converter can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// ArcGrid ASCII text
    Arcgrid,
    /// `.hdr`/`.flt` pair
    Binary,
}

/// Formats the converter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ArcGrid ASCII text
    Arcgrid,
    /// Pipe-delimited OmniGlyph text
    Omniglyph,
    /// `.hdr`/`.flt` pair
    Binary,
}

impl OutputFormat {
    pub fn text_format(&self) -> Option<TextFormat> {
        match self {
            Self::Arcgrid => Some(TextFormat::ArcGrid),
            Self::Omniglyph => Some(TextFormat::OmniGlyph),
            Self::Binary => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arcgrid => "arcgrid",
            Self::Omniglyph => "omniglyph",
            Self::Binary => "binary",
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.to_lowercase())
}

fn is_binary_half(ext: &str) -> bool {
    matches!(ext, "hdr" | "flt")
}

/// Detect the input format of a path.
///
/// `.asc` and `.txt` are ArcGrid ASCII. Anything else names a binary pair.
pub fn detect_input(path: &Path) -> InputFormat {
    match extension(path).as_deref() {
        Some("asc") | Some("txt") => InputFormat::Arcgrid,
        _ => InputFormat::Binary,
    }
}

/// Detect the output format of a path.
pub fn detect_output(path: &Path) -> OutputFormat {
    match extension(path).as_deref() {
        Some(ext) if ext == OMNIGLYPH_EXTENSION => OutputFormat::Omniglyph,
        Some("asc") | Some("txt") => OutputFormat::Arcgrid,
        _ => OutputFormat::Binary,
    }
}

/// Basename of a binary pair: a trailing `.hdr` or `.flt` is stripped,
/// any other extension is kept as part of the name.
pub fn binary_basename(path: &Path) -> PathBuf {
    match extension(path) {
        Some(ext) if is_binary_half(&ext) => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}
