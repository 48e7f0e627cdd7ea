//! Read a grid in one format and write it in another.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytemuck::Zeroable;
use clap::ValueEnum;
use dem_common::{Grid, GridCell};
use dem_io::{
    AsciiGridReader, AsciiGridWriter, BinaryGridReader, BinaryGridWriter, IoConfig, IoReport,
    LogProgress,
};
use serde::Serialize;
use tracing::info;

use crate::formats::{binary_basename, InputFormat, OutputFormat};

/// In-memory cell type used for the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CellType {
    U8,
    I16,
    I32,
    F32,
    F64,
}

/// One resolved conversion job.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub input: PathBuf,
    pub from: InputFormat,
    pub output: PathBuf,
    pub to: OutputFormat,
    pub cell_type: CellType,
    pub config: IoConfig,
}

/// Report of one half of a conversion.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: &'static str,
    pub path: PathBuf,
    pub format: &'static str,
    #[serde(flatten)]
    pub report: IoReport,
    pub elapsed_ms: u64,
}

impl StepReport {
    fn new(step: &'static str, path: &Path, format: &'static str, report: IoReport) -> Self {
        let elapsed_ms = report.elapsed_ms();
        Self {
            step,
            path: path.to_path_buf(),
            format,
            report,
            elapsed_ms,
        }
    }
}

impl Conversion {
    /// Run the conversion with the configured cell type.
    pub fn run(&self) -> Result<Vec<StepReport>> {
        self.config.validate()?;
        match self.cell_type {
            CellType::U8 => self.run_as::<u8>(),
            CellType::I16 => self.run_as::<i16>(),
            CellType::I32 => self.run_as::<i32>(),
            CellType::F32 => self.run_as::<f32>(),
            CellType::F64 => self.run_as::<f64>(),
        }
    }

    fn run_as<T: GridCell>(&self) -> Result<Vec<StepReport>> {
        let mut grid = Grid::empty(T::zeroed());
        let mut steps = Vec::with_capacity(2);

        let read = match self.from {
            InputFormat::Arcgrid => {
                let report = AsciiGridReader::new(self.config.clone())
                    .read(&self.input, &mut grid, &mut LogProgress::new("read"))
                    .with_context(|| format!("reading {}", self.input.display()))?;
                StepReport::new("read", &self.input, "arcgrid", report)
            }
            InputFormat::Binary => {
                let base = binary_basename(&self.input);
                let report = BinaryGridReader::new(self.config.clone())
                    .read(&base, &mut grid, &mut LogProgress::new("read"))
                    .with_context(|| format!("reading {}", base.display()))?;
                StepReport::new("read", &base, "binary", report)
            }
        };
        info!(
            cell_type = T::TYPE_NAME,
            width = grid.width(),
            height = grid.height(),
            data_cells = grid.data_cells,
            "Loaded input grid"
        );
        steps.push(read);

        let mut progress = LogProgress::new("write");
        let written = match self.to.text_format() {
            Some(format) => {
                let report = AsciiGridWriter::new(self.config.clone())
                    .write(&self.output, &grid, format, &mut progress)
                    .with_context(|| format!("writing {}", self.output.display()))?;
                StepReport::new("write", &self.output, self.to.as_str(), report)
            }
            None => {
                let base = binary_basename(&self.output);
                let report = BinaryGridWriter::new(self.config.clone())
                    .write(&base, &grid, &mut progress)
                    .with_context(|| format!("writing {}", base.display()))?;
                StepReport::new("write", &base, self.to.as_str(), report)
            }
        };
        steps.push(written);

        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dem_io::{header_path, read_ascii, read_binary, write_ascii, write_binary};
    use std::fs;
    use test_utils::{basename_in, create_class_grid, small_grid, temp_test_dir};

    fn conversion(input: PathBuf, output: PathBuf, cell_type: CellType) -> Conversion {
        Conversion {
            from: crate::formats::detect_input(&input),
            to: crate::formats::detect_output(&output),
            input,
            output,
            cell_type,
            config: IoConfig::default(),
        }
    }

    #[test]
    fn test_ascii_to_binary() {
        let dir = temp_test_dir();
        let input = dir.path().join("small.asc");
        write_ascii(&input, &small_grid(), 4).unwrap();

        let output = dir.path().join("small.flt");
        let steps = conversion(input, output, CellType::F32).run().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].path, dir.path().join("small"));

        let mut grid = Grid::empty(0.0f32);
        read_binary(dir.path().join("small"), &mut grid).unwrap();
        assert_eq!(grid, small_grid());
    }

    #[test]
    fn test_binary_to_omniglyph() {
        let dir = temp_test_dir();
        let base = basename_in(dir.path(), "classes");
        let classes = create_class_grid(4, 3);
        write_binary(&base, &classes).unwrap();

        let output = dir.path().join("classes.omg");
        let steps = conversion(header_path(&base), output.clone(), CellType::U8)
            .run()
            .unwrap();
        assert_eq!(steps[0].format, "binary");
        assert_eq!(steps[1].format, "omniglyph");

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("Contents: Pixel array\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("|") && l.len() > 1).count(), 3);
    }

    #[test]
    fn test_binary_to_arcgrid_round_trip() {
        let dir = temp_test_dir();
        let base = basename_in(dir.path(), "dem");
        write_binary(&base, &small_grid()).unwrap();

        let output = dir.path().join("dem.asc");
        conversion(base.clone(), output.clone(), CellType::F32).run().unwrap();

        let mut grid = Grid::empty(0.0f32);
        read_ascii(&output, &mut grid).unwrap();
        assert_eq!(grid, small_grid());

        // An f32 payload is too short to be read as f64 cells
        let err = conversion(base, output, CellType::F64).run().unwrap_err();
        assert!(format!("{:#}", err).contains("dem.flt"), "{:#}", err);
    }

    #[test]
    fn test_missing_input_reports_path() {
        let dir = temp_test_dir();
        let input = dir.path().join("absent.asc");
        let err = conversion(input, dir.path().join("out.asc"), CellType::F32)
            .run()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("absent.asc"));
    }
}
