//! Common types shared across the DEM tooling crates.

pub mod error;
pub mod grid;

pub use error::{GridError, GridResult};
pub use grid::{CellKind, Grid, GridCell};
