//! Text grid encoders: ArcGrid ASCII and OmniGlyph.
//!
//! ```text
//! ncols        2
//! nrows        2
//! xllcorner    0.00
//! yllcorner    0.00
//! cellsize     1.00
//! NODATA_value -9999.00
//! 1.50 2.50
//! 3.50 4.50
//! ```
//!
//! Every row ends with a trailing separator before the newline. OmniGlyph
//! output replaces the header with a descriptive block and delimits cells
//! with `|`.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use dem_common::{Grid, GridCell};
use num_traits::NumCast;
use tracing::{debug, info, warn};

use crate::config::{IoConfig, SizeCheck};
use crate::error::{GridIoError, Result};
use crate::format::{write_number, TextFormat};
use crate::header::{GridFileHeader, ARCGRID_HEADER_KEYS};
use crate::progress::{LogProgress, ProgressReporter, Timer};
use crate::IoReport;

/// Writes grids as ArcGrid ASCII or OmniGlyph text.
#[derive(Debug, Clone, Default)]
pub struct AsciiGridWriter {
    config: IoConfig,
}

impl AsciiGridWriter {
    /// Create a new AsciiGridWriter with the given configuration.
    pub fn new(config: IoConfig) -> Self {
        Self { config }
    }

    /// Write `grid` to `path` in the given text format.
    ///
    /// The file is created or truncated. If writing fails midway the partial
    /// file is left in place.
    pub fn write<T: GridCell>(
        &self,
        path: impl AsRef<Path>,
        grid: &Grid<T>,
        format: TextFormat,
        progress: &mut dyn ProgressReporter,
    ) -> Result<IoReport> {
        self.config.validate()?;
        let path = path.as_ref();
        let timer = Timer::started();

        debug!(path = %path.display(), format = format.as_str(), "Opening ASCII output file");
        let file = File::create(path).map_err(|e| GridIoError::open(path, e))?;
        let mut out = BufWriter::new(file);

        debug!(format = format.as_str(), "Writing header");
        let header = match format {
            TextFormat::ArcGrid => GridFileHeader::from_grid(grid).write_arcgrid(
                &mut out,
                self.config.precision,
                grid.kind(),
            ),
            TextFormat::OmniGlyph => write_omniglyph_header(&mut out, grid),
        };
        header.map_err(|e| GridIoError::write(path, e))?;

        debug!(width = grid.width(), height = grid.height(), "Writing cell data");
        write_rows(&mut out, grid, format, self.config.precision, progress)
            .and_then(|_| out.flush())
            .map_err(|e| GridIoError::write(path, e))?;
        let elapsed = progress.stop();

        let bytes = out
            .get_ref()
            .metadata()
            .map_err(|e| GridIoError::write(path, e))?
            .len();

        let report = IoReport {
            cells: grid.len(),
            data_cells: grid.count_data_cells(),
            bytes,
            elapsed: timer.accumulated(),
        };
        info!(
            path = %path.display(),
            format = format.as_str(),
            width = grid.width(),
            height = grid.height(),
            bytes,
            stream_ms = elapsed.as_millis() as u64,
            elapsed_ms = report.elapsed_ms(),
            "Wrote text grid"
        );
        Ok(report)
    }
}

fn write_omniglyph_header<T: GridCell, W: Write>(out: &mut W, grid: &Grid<T>) -> io::Result<()> {
    let min = grid.min().unwrap_or(grid.no_data);
    let max = grid.max().unwrap_or(grid.no_data);

    // The lower bound of the actual range is the sentinel, widened if a
    // valid cell lies below it.
    let actual_low = if grid.no_data > min {
        warn!(
            no_data = %grid.no_data,
            min = %min,
            "No-data value exceeds the grid minimum; widening the actual range"
        );
        min
    } else {
        grid.no_data
    };

    writeln!(out, "Contents: Pixel array")?;
    writeln!(out)?;
    writeln!(out, "Width:    {}", grid.width())?;
    writeln!(out, "Height:   {}", grid.height())?;
    writeln!(out)?;
    writeln!(out, "Spectral bands:   1")?;
    writeln!(out, "Bits per band:   32")?;
    writeln!(out, "Range of values:   {},{}", min, max)?;
    writeln!(out, "Actual range:   {},{}", actual_low, max)?;
    writeln!(out, "Gamma exponent:   0.")?;
    writeln!(out, "Resolution:   100 pixels per inch")?;
    writeln!(out)?;
    writeln!(out, "|")
}

fn write_rows<T: GridCell, W: Write>(
    out: &mut W,
    grid: &Grid<T>,
    format: TextFormat,
    precision: usize,
    progress: &mut dyn ProgressReporter,
) -> io::Result<()> {
    let separator = format.separator();
    let kind = grid.kind();

    progress.start(grid.len());
    for y in 0..grid.height() {
        progress.update(y * grid.width());
        out.write_all(format.row_prefix().as_bytes())?;
        for &value in grid.row(y) {
            write_number(out, value, kind, precision)?;
            out.write_all(separator.as_bytes())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Reads ArcGrid ASCII files into grids.
#[derive(Debug, Clone, Default)]
pub struct AsciiGridReader {
    config: IoConfig,
}

impl AsciiGridReader {
    /// Create a new AsciiGridReader with the given configuration.
    pub fn new(config: IoConfig) -> Self {
        Self { config }
    }

    /// Read the ArcGrid ASCII file at `path` into `grid`.
    ///
    /// `grid` is resized to the header's dimensions and its previous
    /// contents discarded. It is left untouched if the file cannot be
    /// opened or parsed. `data_cells` is recomputed.
    pub fn read<T: GridCell>(
        &self,
        path: impl AsRef<Path>,
        grid: &mut Grid<T>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<IoReport> {
        let path = path.as_ref();
        let timer = Timer::started();

        debug!(path = %path.display(), "Opening ASCII input file");
        let mut file = File::open(path).map_err(|e| GridIoError::open(path, e))?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .map_err(|e| GridIoError::read(path, e))?;
        let bytes = raw.len() as u64;
        let text = decode_utf8(path, raw)?;

        debug!("Reading ArcGrid ASCII header");
        let (header, consumed) = GridFileHeader::parse_arcgrid(text.lines())
            .map_err(|msg| GridIoError::header_parse(path, msg))?;
        let no_data = header.no_data_as::<T>().ok_or_else(|| {
            GridIoError::header_parse(
                path,
                format!(
                    "NODATA_value {} is not representable as {}",
                    header.no_data,
                    T::TYPE_NAME
                ),
            )
        })?;

        let cells = header
            .checked_cells()
            .map_err(|msg| GridIoError::header_parse(path, msg))?;
        debug!(
            ncols = header.ncols,
            nrows = header.nrows,
            approx_mb = header.payload_len::<T>().unwrap_or(u64::MAX) / 1024 / 1024,
            "Parsing cell data"
        );

        progress.start(cells);
        // Every cell takes at least one digit and one separator
        let mut values = Vec::with_capacity(cells.min(text.len() / 2 + 1));
        for (index, line) in text.lines().enumerate().skip(consumed) {
            if values.len() % header.ncols.max(1) == 0 {
                progress.update(values.len());
            }
            for token in line.split_whitespace() {
                values.push(parse_cell::<T>(token).ok_or_else(|| {
                    GridIoError::invalid_data(
                        path,
                        index + 1,
                        format!("'{}' is not a valid {}", token, T::TYPE_NAME),
                    )
                })?);
            }
        }
        progress.stop();

        if values.len() != cells {
            match self.config.size_check {
                SizeCheck::Strict => {
                    return Err(GridIoError::size_mismatch(
                        path,
                        cells as u64,
                        values.len() as u64,
                        "cells",
                    ));
                }
                SizeCheck::Lenient => {
                    warn!(
                        path = %path.display(),
                        expected = cells,
                        found = values.len(),
                        "Cell count differs from header, padding with no-data"
                    );
                    values.resize(cells, no_data);
                }
            }
        }

        header
            .apply_to(grid)
            .map_err(|msg| GridIoError::header_parse(path, msg))?;
        for y in 0..header.nrows {
            let start = y * header.ncols;
            grid.row_mut(y)
                .copy_from_slice(&values[start..start + header.ncols]);
        }
        grid.data_cells = grid.count_data_cells();

        let report = IoReport {
            cells,
            data_cells: grid.data_cells,
            bytes,
            elapsed: timer.accumulated(),
        };
        info!(
            path = %path.display(),
            width = header.ncols,
            height = header.nrows,
            data_cells = grid.data_cells,
            elapsed_ms = report.elapsed_ms(),
            "Read ArcGrid ASCII grid"
        );
        Ok(report)
    }
}

/// Decode a text grid. Invalid bytes inside the six header lines make the
/// header malformed; anywhere later they are bad cell data.
fn decode_utf8(path: &Path, raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        let message = format!("not valid UTF-8: {}", e.utf8_error());
        if line <= ARCGRID_HEADER_KEYS.len() {
            GridIoError::header_parse(path, message)
        } else {
            GridIoError::invalid_data(path, line, message)
        }
    })
}

/// Parse a text cell: natively first, then through `f64` so that decimal
/// renderings of integer cells ("7.00") are accepted.
fn parse_cell<T: GridCell>(token: &str) -> Option<T> {
    token
        .parse::<T>()
        .ok()
        .or_else(|| token.parse::<f64>().ok().and_then(NumCast::from))
}

/// Write `grid` to `path`, choosing OmniGlyph output for `.omg` paths and
/// ArcGrid ASCII otherwise.
///
/// `precision` may be at most 17, the number of fractional digits an `f64`
/// can carry; larger values fail with [`GridIoError::Config`] before the
/// file is created.
pub fn write_ascii<T: GridCell>(
    path: impl AsRef<Path>,
    grid: &Grid<T>,
    precision: usize,
) -> Result<IoReport> {
    let path = path.as_ref();
    let writer = AsciiGridWriter::new(IoConfig::default().with_precision(precision));
    let mut progress = LogProgress::new("write_ascii");
    writer.write(path, grid, TextFormat::from_path(path), &mut progress)
}

/// Read the ArcGrid ASCII file at `path` into `grid` with default settings.
pub fn read_ascii<T: GridCell>(path: impl AsRef<Path>, grid: &mut Grid<T>) -> Result<IoReport> {
    let mut progress = LogProgress::new("read_ascii");
    AsciiGridReader::default().read(path, grid, &mut progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    fn render<T: GridCell>(grid: &Grid<T>, format: TextFormat, precision: usize) -> String {
        let mut out = Vec::new();
        write_rows(&mut out, grid, format, precision, &mut NoProgress::new()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_arcgrid_rows_have_trailing_separator() {
        let grid = Grid::from_vec(2, 2, vec![1.5f32, 2.5, 3.5, 4.5], -9999.0).unwrap();
        assert_eq!(render(&grid, TextFormat::ArcGrid, 2), "1.50 2.50 \n3.50 4.50 \n");
    }

    #[test]
    fn test_omniglyph_rows_are_pipe_delimited() {
        let grid = Grid::from_vec(3, 1, vec![1u8, 2, 3], 0).unwrap();
        assert_eq!(render(&grid, TextFormat::OmniGlyph, 4), "|1|2|3|\n");
    }

    #[test]
    fn test_omniglyph_header_ranges() {
        let grid = Grid::from_vec(2, 1, vec![5.0f32, -9999.0], -9999.0).unwrap();
        let mut out = Vec::new();
        write_omniglyph_header(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Range of values:   5,5\n"));
        assert!(text.contains("Actual range:   -9999,5\n"));
        assert!(text.ends_with("\n|\n"));
    }

    #[test]
    fn test_omniglyph_actual_range_widened() {
        let grid = Grid::from_vec(2, 1, vec![1.0f64, 8.0], 100.0).unwrap();
        let mut out = Vec::new();
        write_omniglyph_header(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Actual range:   1,8\n"));
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell::<u8>("7"), Some(7));
        assert_eq!(parse_cell::<u8>("7.00"), Some(7));
        assert_eq!(parse_cell::<u8>("300"), None);
        assert_eq!(parse_cell::<f32>("-9999.00"), Some(-9999.0));
        assert_eq!(parse_cell::<f32>("abc"), None);
    }
}
