//! Common test fixtures with known file renderings.

use dem_common::Grid;

/// The 2x2 grid `[[1.5, 2.5], [3.5, 4.5]]` with no-data `-9999`.
pub fn small_grid() -> Grid<f32> {
    match Grid::from_vec(2, 2, vec![1.5, 2.5, 3.5, 4.5], -9999.0) {
        Ok(grid) => grid,
        Err(e) => panic!("fixture grid is malformed: {}", e),
    }
}

/// ArcGrid ASCII rendering of [`small_grid`] at precision 2.
pub const SMALL_GRID_ARCGRID: &str = "\
ncols        2
nrows        2
xllcorner    0.00
yllcorner    0.00
cellsize     1.00
NODATA_value -9999.00
1.50 2.50 \n3.50 4.50 \n";

/// A `.hdr` file matching [`small_grid`].
pub const SMALL_GRID_HDR: &str = "\
ncols\t\t2
nrows\t\t2
xllcorner\t0.0000000000
yllcorner\t0.0000000000
cellsize\t1.0000000000
NODATA_value\t-9999.0000000000
BYTEORDER\tLSBFIRST
";
