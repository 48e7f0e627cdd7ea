//! Grid file headers.
//!
//! Both the ArcGrid ASCII format and the binary `.hdr`/`.flt` pair describe
//! a grid with the same handful of fields. [`GridFileHeader`] carries them
//! between a [`Grid`] and the text that ends up on disk.

use std::io::{self, Write};

use dem_common::{CellKind, Grid, GridCell};
use num_traits::{NumCast, ToPrimitive};

use crate::format::write_number;

/// Keys of a binary `.hdr` file, in the order they must appear.
pub const BINARY_HEADER_KEYS: [&str; 7] = [
    "ncols",
    "nrows",
    "xllcorner",
    "yllcorner",
    "cellsize",
    "NODATA_value",
    "BYTEORDER",
];

/// Keys of an ArcGrid ASCII header, in the order they must appear.
pub const ARCGRID_HEADER_KEYS: [&str; 6] = [
    "ncols",
    "nrows",
    "xllcorner",
    "yllcorner",
    "cellsize",
    "NODATA_value",
];

/// Width of the key column in ArcGrid ASCII headers.
const ARCGRID_KEY_WIDTH: usize = 13;

/// Byte order label recorded in a binary header.
///
/// The label is informational only; payloads are always read and written
/// in the host's native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LsbFirst,
    MsbFirst,
}

impl ByteOrder {
    /// Parse a header label (`LSBFIRST`/`MSBFIRST`, case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_uppercase().as_str() {
            "LSBFIRST" | "LSB" | "I" => Some(Self::LsbFirst),
            "MSBFIRST" | "MSB" | "M" => Some(Self::MsbFirst),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LsbFirst => "LSBFIRST",
            Self::MsbFirst => "MSBFIRST",
        }
    }

    /// Byte order of the machine running this code.
    pub fn host() -> Self {
        if cfg!(target_endian = "little") {
            Self::LsbFirst
        } else {
            Self::MsbFirst
        }
    }
}

/// The grid metadata serialized into a file header.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFileHeader {
    pub ncols: usize,
    pub nrows: usize,
    pub xllcorner: f64,
    pub yllcorner: f64,
    pub cellsize: f64,
    /// No-data sentinel, widened to `f64` until it is cast back to a cell type.
    pub no_data: f64,
    /// Only present in binary headers, and `None` there when the label is
    /// not one we recognise.
    pub byte_order: Option<ByteOrder>,
}

impl GridFileHeader {
    /// Capture the header fields of `grid`.
    ///
    /// The byte order is always labelled `LSBFIRST`, regardless of the host.
    pub fn from_grid<T: GridCell>(grid: &Grid<T>) -> Self {
        Self {
            ncols: grid.width(),
            nrows: grid.height(),
            xllcorner: grid.xllcorner,
            yllcorner: grid.yllcorner,
            cellsize: grid.cellsize,
            no_data: grid.no_data.to_f64().unwrap_or(f64::NAN),
            byte_order: Some(ByteOrder::LsbFirst),
        }
    }

    /// Number of cells the header declares, or `None` if it overflows.
    pub fn cells(&self) -> Option<usize> {
        self.ncols.checked_mul(self.nrows)
    }

    /// Like [`cells`](Self::cells), with the overflow as a message.
    pub fn checked_cells(&self) -> Result<usize, String> {
        self.cells().ok_or_else(|| {
            format!(
                "ncols {} x nrows {} overflows the addressable cell count",
                self.ncols, self.nrows
            )
        })
    }

    /// Payload length in bytes for cells of type `T`, or `None` if it
    /// overflows.
    pub fn payload_len<T: GridCell>(&self) -> Option<u64> {
        self.cells()?
            .checked_mul(std::mem::size_of::<T>())
            .and_then(|bytes| u64::try_from(bytes).ok())
    }

    /// The no-data sentinel as a `T`, if it is representable.
    pub fn no_data_as<T: GridCell>(&self) -> Option<T> {
        NumCast::from(self.no_data)
    }

    /// Copy the metadata onto `grid` and resize it, discarding its contents.
    ///
    /// Fails without touching `grid` if the sentinel does not fit in `T` or
    /// the dimensions overflow.
    pub fn apply_to<T: GridCell>(&self, grid: &mut Grid<T>) -> Result<(), String> {
        let no_data = self.no_data_as::<T>().ok_or_else(|| {
            format!(
                "NODATA_value {} is not representable as {}",
                self.no_data,
                T::TYPE_NAME
            )
        })?;
        self.checked_cells()?;

        grid.xllcorner = self.xllcorner;
        grid.yllcorner = self.yllcorner;
        grid.cellsize = self.cellsize;
        grid.no_data = no_data;
        grid.resize(self.ncols, self.nrows)
            .map_err(|e| e.to_string())
    }

    /// Write the seven tab separated lines of a `.hdr` file.
    pub fn write_binary<W: Write + ?Sized>(&self, out: &mut W, precision: usize) -> io::Result<()> {
        let byte_order = self.byte_order.unwrap_or(ByteOrder::LsbFirst);
        writeln!(out, "ncols\t\t{}", self.ncols)?;
        writeln!(out, "nrows\t\t{}", self.nrows)?;
        writeln!(out, "xllcorner\t{:.*}", precision, self.xllcorner)?;
        writeln!(out, "yllcorner\t{:.*}", precision, self.yllcorner)?;
        writeln!(out, "cellsize\t{:.*}", precision, self.cellsize)?;
        writeln!(out, "NODATA_value\t{:.*}", precision, self.no_data)?;
        writeln!(out, "BYTEORDER\t{}", byte_order.label())
    }

    /// Parse a `.hdr` file: exactly seven whitespace separated key/value
    /// pairs in [`BINARY_HEADER_KEYS`] order. The `BYTEORDER` value is
    /// required but not validated.
    pub fn parse_binary(text: &str) -> Result<Self, String> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != BINARY_HEADER_KEYS.len() * 2 {
            return Err(format!(
                "expected {} key/value pairs, found {} tokens",
                BINARY_HEADER_KEYS.len(),
                tokens.len()
            ));
        }

        let mut values = [""; 7];
        for (i, (pair, key)) in tokens.chunks(2).zip(BINARY_HEADER_KEYS).enumerate() {
            values[i] = expect_key(pair[0], key, pair[1])?;
        }

        Ok(Self {
            ncols: parse_field(values[0], "ncols")?,
            nrows: parse_field(values[1], "nrows")?,
            xllcorner: parse_field(values[2], "xllcorner")?,
            yllcorner: parse_field(values[3], "yllcorner")?,
            cellsize: parse_field(values[4], "cellsize")?,
            no_data: parse_field(values[5], "NODATA_value")?,
            byte_order: ByteOrder::from_label(values[6]),
        })
    }

    /// Write the six header lines of an ArcGrid ASCII file.
    ///
    /// `kind` decides whether `NODATA_value` is written as an integer.
    pub fn write_arcgrid<W: Write + ?Sized>(
        &self,
        out: &mut W,
        precision: usize,
        kind: CellKind,
    ) -> io::Result<()> {
        let w = ARCGRID_KEY_WIDTH;
        writeln!(out, "{:<w$}{}", "ncols", self.ncols)?;
        writeln!(out, "{:<w$}{}", "nrows", self.nrows)?;
        writeln!(out, "{:<w$}{:.*}", "xllcorner", precision, self.xllcorner)?;
        writeln!(out, "{:<w$}{:.*}", "yllcorner", precision, self.yllcorner)?;
        writeln!(out, "{:<w$}{:.*}", "cellsize", precision, self.cellsize)?;
        write!(out, "{:<w$}", "NODATA_value")?;
        write_number(out, self.no_data, kind, precision)?;
        writeln!(out)
    }

    /// Parse the header of an ArcGrid ASCII file from its first six
    /// non-empty lines. Returns the header and the number of lines consumed.
    pub fn parse_arcgrid<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<(Self, usize), String> {
        let mut values = [""; 6];
        let mut found = 0;
        let mut consumed = 0;

        for line in lines {
            if found == ARCGRID_HEADER_KEYS.len() {
                break;
            }
            consumed += 1;

            let mut parts = line.split_whitespace();
            let Some(key) = parts.next() else {
                continue;
            };
            let value = parts
                .next()
                .ok_or_else(|| format!("missing value for '{}'", key))?;
            if let Some(extra) = parts.next() {
                return Err(format!("unexpected token '{}' after '{}'", extra, key));
            }

            values[found] = expect_key(key, ARCGRID_HEADER_KEYS[found], value)?;
            found += 1;
        }

        if found < ARCGRID_HEADER_KEYS.len() {
            return Err(format!("missing '{}'", ARCGRID_HEADER_KEYS[found]));
        }

        let header = Self {
            ncols: parse_field(values[0], "ncols")?,
            nrows: parse_field(values[1], "nrows")?,
            xllcorner: parse_field(values[2], "xllcorner")?,
            yllcorner: parse_field(values[3], "yllcorner")?,
            cellsize: parse_field(values[4], "cellsize")?,
            no_data: parse_field(values[5], "NODATA_value")?,
            byte_order: None,
        };
        Ok((header, consumed))
    }
}

fn expect_key<'a>(found: &str, expected: &str, value: &'a str) -> Result<&'a str, String> {
    if found.eq_ignore_ascii_case(expected) {
        Ok(value)
    } else {
        Err(format!("expected '{}', found '{}'", expected, found))
    }
}

fn parse_field<F: std::str::FromStr>(value: &str, key: &str) -> Result<F, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value '{}' for '{}'", value, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ncols\t\t2\nnrows\t\t3\nxllcorner\t10.5000000000\n\
                          yllcorner\t-20.2500000000\ncellsize\t30.0000000000\n\
                          NODATA_value\t-9999.0000000000\nBYTEORDER\tLSBFIRST\n";

    #[test]
    fn test_parse_binary() {
        let header = GridFileHeader::parse_binary(HEADER).unwrap();
        assert_eq!(header.ncols, 2);
        assert_eq!(header.nrows, 3);
        assert_eq!(header.xllcorner, 10.5);
        assert_eq!(header.yllcorner, -20.25);
        assert_eq!(header.cellsize, 30.0);
        assert_eq!(header.no_data, -9999.0);
        assert_eq!(header.byte_order, Some(ByteOrder::LsbFirst));
    }

    #[test]
    fn test_write_binary_layout() {
        let header = GridFileHeader::parse_binary(HEADER).unwrap();
        let mut out = Vec::new();
        header.write_binary(&mut out, 10).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), HEADER);
    }

    #[test]
    fn test_parse_binary_missing_byteorder() {
        let text = HEADER.replace("BYTEORDER\tLSBFIRST\n", "");
        let err = GridFileHeader::parse_binary(&text).unwrap_err();
        assert!(err.contains("found 12 tokens"), "{}", err);
    }

    #[test]
    fn test_parse_binary_unknown_byteorder_label() {
        let text = HEADER.replace("LSBFIRST", "LITTLEENDIAN");
        let header = GridFileHeader::parse_binary(&text).unwrap();
        assert_eq!(header.byte_order, None);
        assert_eq!(header.ncols, 2);
    }

    #[test]
    fn test_oversized_dimensions() {
        let text = HEADER
            .replace("ncols\t\t2", "ncols\t\t4294967296")
            .replace("nrows\t\t3", "nrows\t\t4294967296");
        let header = GridFileHeader::parse_binary(&text).unwrap();
        assert_eq!(header.cells(), None);
        assert_eq!(header.payload_len::<f32>(), None);
        assert!(header.checked_cells().unwrap_err().contains("overflows"));

        let mut grid = Grid::new(1, 1, 0.0f32);
        assert!(header.apply_to(&mut grid).is_err());
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_payload_len() {
        let header = GridFileHeader::parse_binary(HEADER).unwrap();
        assert_eq!(header.cells(), Some(6));
        assert_eq!(header.payload_len::<f64>(), Some(48));
        assert_eq!(header.payload_len::<u8>(), Some(6));
    }

    #[test]
    fn test_parse_binary_extra_field() {
        let text = format!("{}EXTRA\t1\n", HEADER);
        assert!(GridFileHeader::parse_binary(&text).is_err());
    }

    #[test]
    fn test_parse_binary_out_of_order() {
        let text = HEADER
            .replace("ncols\t\t2", "TMP\t\t2")
            .replace("nrows\t\t3", "ncols\t\t3")
            .replace("TMP", "nrows");
        let err = GridFileHeader::parse_binary(&text).unwrap_err();
        assert_eq!(err, "expected 'ncols', found 'nrows'");
    }

    #[test]
    fn test_parse_binary_wrong_type() {
        let text = HEADER.replace("ncols\t\t2", "ncols\t\ttwo");
        let err = GridFileHeader::parse_binary(&text).unwrap_err();
        assert_eq!(err, "invalid value 'two' for 'ncols'");
    }

    #[test]
    fn test_arcgrid_header_round_trip() {
        let header = GridFileHeader {
            ncols: 4,
            nrows: 5,
            xllcorner: 1.25,
            yllcorner: 2.5,
            cellsize: 0.5,
            no_data: -9999.0,
            byte_order: None,
        };
        let mut out = Vec::new();
        header.write_arcgrid(&mut out, 2, CellKind::Decimal).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("ncols        4\nnrows        5\n"));
        assert!(text.contains("NODATA_value -9999.00\n"));

        let (parsed, consumed) = GridFileHeader::parse_arcgrid(text.lines()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_arcgrid_integer_no_data() {
        let header = GridFileHeader {
            ncols: 1,
            nrows: 1,
            xllcorner: 0.0,
            yllcorner: 0.0,
            cellsize: 1.0,
            no_data: 255.0,
            byte_order: None,
        };
        let mut out = Vec::new();
        header.write_arcgrid(&mut out, 3, CellKind::Integer).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("NODATA_value 255\n"));
    }

    #[test]
    fn test_apply_to_rejects_unrepresentable_no_data() {
        let header = GridFileHeader::parse_binary(HEADER).unwrap();
        let mut grid = Grid::new(1, 1, 0u8);
        assert!(header.apply_to(&mut grid).is_err());
        assert_eq!(grid.width(), 1);

        let mut grid = Grid::new(1, 1, 0.0f32);
        header.apply_to(&mut grid).unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 3));
        assert_eq!(grid.no_data, -9999.0);
    }
}
