//! Rectangular raster grids for elevation data.
//!
//! A [`Grid`] stores a single band of cells in row-major order (row `y`
//! varies slowest, column `x` fastest), which is also the order rows appear
//! on disk. Alongside the cells it carries the georeferencing metadata that
//! the ArcGrid family of formats writes into their headers.

use std::fmt::{Debug, Display};
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use bytemuck::Pod;
use num_traits::NumCast;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// How cell values are rendered by text encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Rendered as a whole number, truncating any fractional part.
    Integer,
    /// Rendered as a fixed-point decimal with the requested precision.
    Decimal,
}

impl CellKind {
    /// Kind implied by a cell's storage width: one-byte cells (flags,
    /// classes, flow directions) are integer-like, everything wider is
    /// treated as a measurement.
    pub const fn for_width(bytes: usize) -> Self {
        if bytes == 1 {
            CellKind::Integer
        } else {
            CellKind::Decimal
        }
    }

    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Integer => "integer",
            CellKind::Decimal => "decimal",
        }
    }
}

/// Numeric types that can be stored in a [`Grid`].
///
/// `Pod` gives access to the native in-memory byte representation used by
/// the binary `.flt` payload; `NumCast` covers conversion to and from the
/// `f64` values that text headers carry, `FromStr` parsing of text cells.
pub trait GridCell:
    Pod + NumCast + PartialOrd + FromStr + Display + Debug + Send + Sync
{
    /// Short type name used in diagnostics (e.g. `"f32"`).
    const TYPE_NAME: &'static str;
    /// Rendering kind assigned to new grids of this type.
    const DEFAULT_KIND: CellKind;
}

macro_rules! impl_grid_cell {
    ($($t:ty),* $(,)?) => {
        $(
            impl GridCell for $t {
                const TYPE_NAME: &'static str = stringify!($t);
                const DEFAULT_KIND: CellKind = CellKind::for_width(std::mem::size_of::<$t>());
            }
        )*
    };
}

impl_grid_cell!(u8, i8, u16, i16, u32, i32, f32, f64);

/// A two-dimensional raster of cells of type `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: GridCell> {
    /// X coordinate of the lower-left corner.
    pub xllcorner: f64,
    /// Y coordinate of the lower-left corner.
    pub yllcorner: f64,
    /// Edge length of a (square) cell.
    pub cellsize: f64,
    /// Sentinel marking cells without a valid measurement.
    pub no_data: T,
    /// Number of cells whose value differs from `no_data`.
    ///
    /// Recomputed by readers; writers do not maintain it.
    pub data_cells: usize,
    width: usize,
    height: usize,
    kind: CellKind,
    data: Vec<T>,
}

impl<T: GridCell> Grid<T> {
    /// Create a `width` x `height` grid with every cell set to `no_data`.
    pub fn new(width: usize, height: usize, no_data: T) -> Self {
        Self {
            xllcorner: 0.0,
            yllcorner: 0.0,
            cellsize: 1.0,
            no_data,
            data_cells: 0,
            width,
            height,
            kind: T::DEFAULT_KIND,
            data: vec![no_data; width * height],
        }
    }

    /// Create a zero-sized grid, typically as a destination for a reader.
    pub fn empty(no_data: T) -> Self {
        Self::new(0, 0, no_data)
    }

    /// Build a grid from row-major cell values.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>, no_data: T) -> GridResult<Self> {
        if data.len() != width * height {
            return Err(GridError::DimensionMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }

        let mut grid = Self {
            data,
            ..Self::empty(no_data)
        };
        grid.width = width;
        grid.height = height;
        grid.data_cells = grid.count_data_cells();
        Ok(grid)
    }

    /// Override the rendering kind, builder style.
    pub fn with_kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the georeferencing metadata, builder style.
    pub fn with_geometry(mut self, xllcorner: f64, yllcorner: f64, cellsize: f64) -> Self {
        self.xllcorner = xllcorner;
        self.yllcorner = yllcorner;
        self.cellsize = cellsize;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: CellKind) {
        self.kind = kind;
    }

    /// Get the value at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Set the value at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> GridResult<()> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        self.data[y * self.width + x] = value;
        Ok(())
    }

    /// Cells of row `y`, left to right.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Mutable cells of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// All cells in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Resize to `cols` x `rows`, discarding the previous contents.
    ///
    /// Every cell is reset to `no_data` and `data_cells` to zero. Metadata
    /// (corner, cellsize, sentinel, kind) is kept. Fails without touching
    /// the grid if `cols * rows` overflows.
    pub fn resize(&mut self, cols: usize, rows: usize) -> GridResult<()> {
        let cells = cols.checked_mul(rows).ok_or(GridError::TooLarge {
            width: cols,
            height: rows,
        })?;
        self.width = cols;
        self.height = rows;
        self.data.clear();
        self.data.resize(cells, self.no_data);
        self.data_cells = 0;
        Ok(())
    }

    /// Smallest value among cells that are not `no_data`.
    pub fn min(&self) -> Option<T> {
        self.extreme(|candidate, current| candidate < current)
    }

    /// Largest value among cells that are not `no_data`.
    pub fn max(&self) -> Option<T> {
        self.extreme(|candidate, current| candidate > current)
    }

    /// Count the cells whose value differs from `no_data`.
    pub fn count_data_cells(&self) -> usize {
        self.data.iter().filter(|&&v| v != self.no_data).count()
    }

    fn extreme(&self, better: impl Fn(T, T) -> bool) -> Option<T> {
        self.data
            .iter()
            .copied()
            // NaN never compares, so it can't win and is skipped here as well
            .filter(|&v| v != self.no_data && v.partial_cmp(&v).is_some())
            .fold(None, |acc, v| match acc {
                Some(current) if !better(v, current) => Some(current),
                _ => Some(v),
            })
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> GridError {
        GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: GridCell> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(x < self.width && y < self.height, "{}", self.out_of_bounds(x, y));
        &self.data[y * self.width + x]
    }
}

impl<T: GridCell> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(x < self.width && y < self.height, "{}", self.out_of_bounds(x, y));
        &mut self.data[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kind_follows_width() {
        assert_eq!(u8::DEFAULT_KIND, CellKind::Integer);
        assert_eq!(i8::DEFAULT_KIND, CellKind::Integer);
        assert_eq!(i16::DEFAULT_KIND, CellKind::Decimal);
        assert_eq!(f32::DEFAULT_KIND, CellKind::Decimal);
        assert_eq!(f64::DEFAULT_KIND, CellKind::Decimal);
    }

    #[test]
    fn test_new_grid_is_all_no_data() {
        let grid = Grid::new(3, 2, -9999.0f32);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.count_data_cells(), 0);
        assert_eq!(grid.min(), None);
        assert_eq!(grid.max(), None);
    }

    #[test]
    fn test_index_is_column_then_row() {
        let grid = Grid::from_vec(2, 2, vec![1.5f32, 2.5, 3.5, 4.5], -9999.0).unwrap();
        assert_eq!(grid[(1, 0)], 2.5);
        assert_eq!(grid[(0, 1)], 3.5);
        assert_eq!(grid.row(1), &[3.5f32, 4.5]);
    }

    #[test]
    fn test_min_max_skip_no_data() {
        let grid = Grid::from_vec(3, 1, vec![-9999.0f64, 7.0, 2.0], -9999.0).unwrap();
        assert_eq!(grid.min(), Some(2.0));
        assert_eq!(grid.max(), Some(7.0));
        assert_eq!(grid.data_cells, 2);
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut grid = Grid::from_vec(2, 1, vec![1i16, 2], -1).unwrap();
        grid.resize(3, 3).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert!(grid.data().iter().all(|&v| v == -1));
        assert_eq!(grid.data_cells, 0);
    }

    #[test]
    fn test_resize_overflow_leaves_grid_alone() {
        let mut grid = Grid::from_vec(2, 1, vec![1i16, 2], -1).unwrap();
        let huge = 1usize << (usize::BITS / 2);
        assert_eq!(
            grid.resize(huge, huge),
            Err(GridError::TooLarge {
                width: huge,
                height: huge
            })
        );
        assert_eq!((grid.width(), grid.height()), (2, 1));
        assert_eq!(grid.data(), &[1, 2]);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut grid = Grid::new(2, 2, 0u8);
        assert_eq!(
            grid.set(2, 0, 1),
            Err(GridError::OutOfBounds {
                x: 2,
                y: 0,
                width: 2,
                height: 2
            })
        );
    }
}
