//! Raster grid file I/O for elevation tooling.
//!
//! This crate imports and exports rectangular numeric grids in two on-disk
//! representations:
//!
//! - **Text grids**: ArcGrid ASCII, or the pipe-delimited OmniGlyph variant
//! - **Binary pairs**: a `.hdr` text header plus a raw `.flt` payload
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │
//!   ├─► AsciiGridWriter::write(path, grid, format, progress)
//!   │        open ─► header ─► rows (y outer, x inner) ─► flush
//!   │
//!   ├─► BinaryGridWriter::write(basename, grid, progress)
//!   │        basename.hdr ─► basename.flt
//!   │
//!   └─► BinaryGridReader::read(basename, grid, progress)
//!            parse .hdr ─► check .flt length ─► resize grid ─► stream rows
//! ```
//!
//! Every operation is synchronous, touches only its own files and the grid
//! it is given, and reports failures as [`GridIoError`] values.
//!
//! # Example
//!
//! ```no_run
//! use dem_common::Grid;
//! use dem_io::{read_binary, write_ascii, write_binary};
//!
//! let grid = Grid::from_vec(2, 2, vec![1.5f32, 2.5, 3.5, 4.5], -9999.0)?;
//! write_ascii("dem.asc", &grid, 2)?;
//! write_binary("dem", &grid)?;
//!
//! let mut copy = Grid::empty(0.0f32);
//! read_binary("dem", &mut copy)?;
//! assert_eq!(copy.data(), grid.data());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use serde::Serialize;

pub mod ascii;
pub mod binary;
pub mod config;
pub mod error;
pub mod format;
pub mod header;
pub mod progress;

// Re-export commonly used types at crate root
pub use ascii::{read_ascii, write_ascii, AsciiGridReader, AsciiGridWriter};
pub use binary::{data_path, header_path, read_binary, write_binary, BinaryGridReader, BinaryGridWriter};
pub use config::{IoConfig, SizeCheck, MAX_PRECISION};
pub use error::{GridIoError, Result};
pub use format::TextFormat;
pub use header::{ByteOrder, GridFileHeader};
pub use progress::{LogProgress, NoProgress, ProgressReporter, Timer};

/// Summary of a completed read or write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IoReport {
    /// Cells declared by the grid or header.
    pub cells: usize,
    /// Cells whose value differs from the no-data sentinel.
    pub data_cells: usize,
    /// Bytes written or read.
    pub bytes: u64,
    /// Wall time of the whole operation.
    pub elapsed: Duration,
}

impl IoReport {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
