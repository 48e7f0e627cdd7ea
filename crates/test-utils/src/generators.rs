//! Test data generators for creating synthetic elevation-like grids.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite.

use dem_common::Grid;

/// Sentinel used by the floating-point generators.
pub const TEST_NO_DATA: f32 = -9999.0;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `x * 1000 + y`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that `grid[(x, y)] == x * 1000 + y`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[(0, 0)], 0.0);
/// assert_eq!(grid[(1, 0)], 1000.0);
/// assert_eq!(grid[(0, 1)], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Grid<f32> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 1000 + y) as f32);
        }
    }
    from_rows(width, height, data, TEST_NO_DATA).with_geometry(500_000.0, 4_100_000.0, 30.0)
}

/// Creates a hillslope with elevations between roughly 200 m and 900 m.
///
/// Elevation rises towards the top-left corner with a gentle ripple, so
/// values carry a fractional part.
pub fn create_elevation_grid(width: usize, height: usize) -> Grid<f32> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let fx = 1.0 - x as f32 / width.max(1) as f32;
            let fy = 1.0 - y as f32 / height.max(1) as f32;
            let ripple = ((x as f32 * 0.7).sin() + (y as f32 * 0.3).cos()) * 12.5;
            data.push(200.0 + 350.0 * fx + 325.0 * fy + ripple);
        }
    }
    from_rows(width, height, data, TEST_NO_DATA).with_geometry(-93.5, 44.75, 0.000277)
}

/// Creates a one-byte class grid (values `0..=7`, 255 as no-data), like a
/// land cover or flow direction raster.
pub fn create_class_grid(width: usize, height: usize) -> Grid<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            data.push((simple_hash(x as u32, y as u32, 7) % 8) as u8);
        }
    }
    from_rows(width, height, data, 255)
}

/// Replaces roughly one cell in `one_in` with the grid's no-data value,
/// deterministically from `seed`. Returns the number of cells replaced.
pub fn punch_no_data_holes(grid: &mut Grid<f32>, one_in: u32, seed: u32) -> usize {
    let mut replaced = 0;
    let no_data = grid.no_data;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if simple_hash(x as u32, y as u32, seed) % one_in.max(1) == 0 {
                grid[(x, y)] = no_data;
                replaced += 1;
            }
        }
    }
    grid.data_cells = grid.count_data_cells();
    replaced
}

fn from_rows<T: dem_common::GridCell>(width: usize, height: usize, data: Vec<T>, no_data: T) -> Grid<T> {
    match Grid::from_vec(width, height, data, no_data) {
        Ok(grid) => grid,
        Err(e) => panic!("generator produced a malformed grid: {}", e),
    }
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
