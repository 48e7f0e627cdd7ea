//! Command line converter between raster grid file formats.
//!
//! Reads an ArcGrid ASCII file or a `.hdr`/`.flt` pair and writes it as
//! ArcGrid ASCII, OmniGlyph text or a binary pair. Formats are inferred from
//! the file names unless given explicitly.

mod convert;
mod formats;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dem_io::{IoConfig, SizeCheck};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use convert::{CellType, Conversion};
use formats::{detect_input, detect_output, InputFormat, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "dem-convert")]
#[command(about = "Convert raster grids between ArcGrid ASCII, OmniGlyph and binary .hdr/.flt")]
struct Args {
    /// Input file (.asc) or binary basename (.hdr, .flt or no extension)
    input: PathBuf,

    /// Output file (.asc, .omg) or binary basename
    output: PathBuf,

    /// Input format (default: inferred from the input path)
    #[arg(long, value_enum)]
    from: Option<InputFormat>,

    /// Output format (default: inferred from the output path)
    #[arg(long, value_enum)]
    to: Option<OutputFormat>,

    /// Fractional digits for text output
    #[arg(short, long)]
    precision: Option<usize>,

    /// In-memory cell type
    #[arg(long, value_enum, default_value = "f32")]
    cell_type: CellType,

    /// Accept payloads whose length differs from the header
    #[arg(long)]
    lenient: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print a JSON report of both steps to stdout
    #[arg(long)]
    report: bool,
}

impl Args {
    fn conversion(&self) -> Conversion {
        let mut config = IoConfig::from_env();
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if self.lenient {
            config.size_check = SizeCheck::Lenient;
        }

        Conversion {
            input: self.input.clone(),
            from: self.from.unwrap_or_else(|| detect_input(&self.input)),
            output: self.output.clone(),
            to: self.to.unwrap_or_else(|| detect_output(&self.output)),
            cell_type: self.cell_type,
            config,
        }
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so that --report output stays clean
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let conversion = args.conversion();
    info!(
        input = %conversion.input.display(),
        from = ?conversion.from,
        output = %conversion.output.display(),
        to = conversion.to.as_str(),
        cell_type = ?conversion.cell_type,
        precision = conversion.config.precision,
        size_check = conversion.config.size_check.as_str(),
        "Starting conversion"
    );

    let steps = conversion.run()?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&steps)?);
    }

    info!("Conversion complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_inferred_from_paths() {
        let args = Args::try_parse_from(["dem-convert", "in.asc", "out.omg"]).unwrap();
        let conversion = args.conversion();
        assert_eq!(conversion.from, InputFormat::Arcgrid);
        assert_eq!(conversion.to, OutputFormat::Omniglyph);
        assert_eq!(conversion.cell_type, CellType::F32);
    }

    #[test]
    fn test_explicit_flags_override() {
        let args = Args::try_parse_from([
            "dem-convert",
            "in.dat",
            "out.omg",
            "--from",
            "arcgrid",
            "--to",
            "binary",
            "--precision",
            "3",
            "--cell-type",
            "i16",
            "--lenient",
        ])
        .unwrap();
        let conversion = args.conversion();
        assert_eq!(conversion.from, InputFormat::Arcgrid);
        assert_eq!(conversion.to, OutputFormat::Binary);
        assert_eq!(conversion.config.precision, 3);
        assert_eq!(conversion.config.size_check, SizeCheck::Lenient);
        assert_eq!(conversion.cell_type, CellType::I16);
    }

    #[test]
    fn test_unknown_cell_type_rejected() {
        assert!(Args::try_parse_from(["dem-convert", "a", "b", "--cell-type", "u64"]).is_err());
    }
}
