//! Shared test utilities for the DEM tooling workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Deterministic grid generators
//! - Small fixture grids with known file renderings
//! - Scratch directories for file round trips
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that two grids share dimensions, georeferencing and sentinel,
/// and that every cell matches within `epsilon`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_grid_approx_eq;
///
/// assert_grid_approx_eq!(read_back, original, 0.005);
/// ```
#[macro_export]
macro_rules! assert_grid_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = &$left;
        let right = &$right;
        assert_eq!(
            (left.width(), left.height()),
            (right.width(), right.height()),
            "grid dimensions differ"
        );
        $crate::assert_approx_eq!(left.xllcorner, right.xllcorner, $epsilon);
        $crate::assert_approx_eq!(left.yllcorner, right.yllcorner, $epsilon);
        $crate::assert_approx_eq!(left.cellsize, right.cellsize, $epsilon);
        $crate::assert_approx_eq!(left.no_data, right.no_data, $epsilon);
        for (i, (a, b)) in left.data().iter().zip(right.data()).enumerate() {
            let diff = (*a as f64 - *b as f64).abs();
            assert!(
                diff <= $epsilon as f64,
                "cell {} differs: {:?} vs {:?}",
                i,
                a,
                b
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_grid_approx_eq_passes() {
        let grid = create_test_grid(3, 2);
        assert_grid_approx_eq!(grid.clone(), grid, 0.0);
    }

    #[test]
    #[should_panic(expected = "cell 1 differs")]
    fn test_assert_grid_approx_eq_reports_cell() {
        let left = create_test_grid(2, 1);
        let mut right = left.clone();
        right[(1, 0)] += 1.0;
        assert_grid_approx_eq!(left, right, 0.5);
    }
}
