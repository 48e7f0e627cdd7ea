//! Binary grid pairs: a `.hdr` text header plus a raw `.flt` payload.
//!
//! The payload holds the cells in row-major order, in their native
//! in-memory representation, with no framing or padding. The header records
//! a `BYTEORDER` label, but no byte swapping is performed in either
//! direction.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use dem_common::{Grid, GridCell};
use tracing::{debug, info, warn};

use crate::config::{IoConfig, SizeCheck};
use crate::error::{GridIoError, Result};
use crate::header::{ByteOrder, GridFileHeader};
use crate::progress::{LogProgress, ProgressReporter, Timer};
use crate::IoReport;

/// Extension of the header half of a binary pair.
pub const HEADER_EXTENSION: &str = "hdr";

/// Extension of the payload half of a binary pair.
pub const DATA_EXTENSION: &str = "flt";

/// Path of the `.hdr` file for `basename`.
///
/// The extension is appended, never substituted, so basenames may contain
/// dots of their own.
pub fn header_path(basename: impl AsRef<Path>) -> PathBuf {
    with_suffix(basename.as_ref(), HEADER_EXTENSION)
}

/// Path of the `.flt` file for `basename`.
pub fn data_path(basename: impl AsRef<Path>) -> PathBuf {
    with_suffix(basename.as_ref(), DATA_EXTENSION)
}

fn with_suffix(basename: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(basename.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Writes grids as `.hdr`/`.flt` pairs.
#[derive(Debug, Clone, Default)]
pub struct BinaryGridWriter {
    config: IoConfig,
}

impl BinaryGridWriter {
    /// Create a new BinaryGridWriter with the given configuration.
    pub fn new(config: IoConfig) -> Self {
        Self { config }
    }

    /// Write `grid` to `basename.hdr` and `basename.flt`.
    ///
    /// The two files are written one after the other; if the payload fails,
    /// the header already on disk is left in place.
    pub fn write<T: GridCell>(
        &self,
        basename: impl AsRef<Path>,
        grid: &Grid<T>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<IoReport> {
        self.config.validate()?;
        let hdr_path = header_path(&basename);
        let flt_path = data_path(&basename);
        let timer = Timer::started();

        debug!(path = %hdr_path.display(), "Opening binary header file for writing");
        let file = File::create(&hdr_path).map_err(|e| GridIoError::open(&hdr_path, e))?;
        let mut out = BufWriter::new(file);
        GridFileHeader::from_grid(grid)
            .write_binary(&mut out, self.config.header_precision)
            .and_then(|_| out.flush())
            .map_err(|e| GridIoError::write(&hdr_path, e))?;

        debug!(path = %flt_path.display(), "Opening binary data file for writing");
        let file = File::create(&flt_path).map_err(|e| GridIoError::open(&flt_path, e))?;
        let mut out = BufWriter::new(file);

        progress.start(grid.len());
        for y in 0..grid.height() {
            progress.update(y * grid.width());
            out.write_all(bytemuck::cast_slice(grid.row(y)))
                .map_err(|e| GridIoError::write(&flt_path, e))?;
        }
        out.flush().map_err(|e| GridIoError::write(&flt_path, e))?;
        let elapsed = progress.stop();

        let report = IoReport {
            cells: grid.len(),
            data_cells: grid.count_data_cells(),
            bytes: (grid.len() * std::mem::size_of::<T>()) as u64,
            elapsed: timer.accumulated(),
        };
        info!(
            path = %flt_path.display(),
            cell_type = T::TYPE_NAME,
            width = grid.width(),
            height = grid.height(),
            bytes = report.bytes,
            stream_ms = elapsed.as_millis() as u64,
            elapsed_ms = report.elapsed_ms(),
            "Wrote binary grid"
        );
        Ok(report)
    }
}

/// Reads `.hdr`/`.flt` pairs into grids.
#[derive(Debug, Clone, Default)]
pub struct BinaryGridReader {
    config: IoConfig,
}

impl BinaryGridReader {
    /// Create a new BinaryGridReader with the given configuration.
    pub fn new(config: IoConfig) -> Self {
        Self { config }
    }

    /// Read `basename.hdr` and `basename.flt` into `grid`.
    ///
    /// `grid` is resized to the header's dimensions, its previous contents
    /// discarded, and its corner, cellsize and no-data value replaced. It is
    /// left untouched if either file cannot be opened, the header is
    /// malformed, or (under [`SizeCheck::Strict`]) the payload length does
    /// not match the header. `data_cells` is recomputed.
    pub fn read<T: GridCell>(
        &self,
        basename: impl AsRef<Path>,
        grid: &mut Grid<T>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<IoReport> {
        let hdr_path = header_path(&basename);
        let flt_path = data_path(&basename);
        let timer = Timer::started();

        debug!(path = %hdr_path.display(), "Opening binary header file for reading");
        let mut file = File::open(&hdr_path).map_err(|e| GridIoError::open(&hdr_path, e))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| GridIoError::read(&hdr_path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            GridIoError::header_parse(&hdr_path, format!("header is not valid UTF-8: {}", e))
        })?;

        let header = GridFileHeader::parse_binary(&text)
            .map_err(|msg| GridIoError::header_parse(&hdr_path, msg))?;
        let cells = header
            .checked_cells()
            .map_err(|msg| GridIoError::header_parse(&hdr_path, msg))?;
        let expected = header.payload_len::<T>().ok_or_else(|| {
            GridIoError::header_parse(
                &hdr_path,
                format!(
                    "{} cells of {} overflow the addressable payload length",
                    cells,
                    T::TYPE_NAME
                ),
            )
        })?;
        if header.no_data_as::<T>().is_none() {
            return Err(GridIoError::header_parse(
                &hdr_path,
                format!(
                    "NODATA_value {} is not representable as {}",
                    header.no_data,
                    T::TYPE_NAME
                ),
            ));
        }
        match header.byte_order {
            Some(order) if order == ByteOrder::host() => {}
            other => warn!(
                path = %hdr_path.display(),
                byte_order = ?other,
                host = ?ByteOrder::host(),
                "Byte order label is unrecognised or differs from host; payload is read unswapped"
            ),
        }

        let cell_size = std::mem::size_of::<T>();
        debug!(
            ncols = header.ncols,
            nrows = header.nrows,
            cell_type = T::TYPE_NAME,
            approx_mb = expected / 1024 / 1024,
            "Loaded grid will require approximately this much RAM"
        );

        debug!(path = %flt_path.display(), "Opening binary data file for reading");
        let file = File::open(&flt_path).map_err(|e| GridIoError::open(&flt_path, e))?;
        let actual = file
            .metadata()
            .map_err(|e| GridIoError::read(&flt_path, e))?
            .len();

        if actual != expected {
            match self.config.size_check {
                SizeCheck::Strict => {
                    return Err(GridIoError::size_mismatch(&flt_path, expected, actual, "bytes"));
                }
                SizeCheck::Lenient => warn!(
                    path = %flt_path.display(),
                    expected,
                    actual,
                    "Payload length differs from header; reading what is available"
                ),
            }
        }

        header
            .apply_to(grid)
            .map_err(|msg| GridIoError::header_parse(&hdr_path, msg))?;

        // Cells past the end of a short payload keep the no-data fill from
        // the resize above.
        let available = usize::try_from(actual / cell_size.max(1) as u64).unwrap_or(usize::MAX);
        let readable = cells.min(available);
        let mut reader = BufReader::new(file);

        progress.start(cells);
        for y in 0..header.nrows {
            let offset = y * header.ncols;
            let count = readable.saturating_sub(offset).min(header.ncols);
            if count == 0 {
                break;
            }
            progress.update(offset);
            let row = &mut grid.row_mut(y)[..count];
            reader
                .read_exact(bytemuck::cast_slice_mut(row))
                .map_err(|e| GridIoError::read(&flt_path, e))?;
        }
        let elapsed = progress.stop();

        grid.data_cells = grid.count_data_cells();

        let report = IoReport {
            cells,
            data_cells: grid.data_cells,
            bytes: (readable * cell_size) as u64,
            elapsed: timer.accumulated(),
        };
        info!(
            path = %flt_path.display(),
            cell_type = T::TYPE_NAME,
            width = header.ncols,
            height = header.nrows,
            data_cells = grid.data_cells,
            stream_ms = elapsed.as_millis() as u64,
            elapsed_ms = report.elapsed_ms(),
            "Read binary grid"
        );
        Ok(report)
    }
}

/// Write `grid` to `basename.hdr` and `basename.flt` with default settings.
pub fn write_binary<T: GridCell>(basename: impl AsRef<Path>, grid: &Grid<T>) -> Result<IoReport> {
    let mut progress = LogProgress::new("write_binary");
    BinaryGridWriter::default().write(basename, grid, &mut progress)
}

/// Read `basename.hdr` and `basename.flt` into `grid` with default settings.
pub fn read_binary<T: GridCell>(basename: impl AsRef<Path>, grid: &mut Grid<T>) -> Result<IoReport> {
    let mut progress = LogProgress::new("read_binary");
    BinaryGridReader::default().read(basename, grid, &mut progress)
}
