//! Ocean grid abstraction.
//!
//! Every ocean product is laid out `[k, j, i]` (depth, row, column) with
//! `k = 0` at the surface. Diagnostics only see a grid through
//! [`OceanGrid`], so the same integration code serves the ORCA C-grid and
//! the MOM5 B-grid.

pub mod mom;
pub mod orca;

use {
    ndarray::{Array1, Array3, ArrayView1, ArrayView2, ArrayView3},
    serde::{Deserialize, Serialize},
    std::f64::consts::PI,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of columns (zonal)
    pub nx: usize,
    /// Number of rows (meridional)
    pub ny: usize,
    /// Number of vertical levels
    pub nz: usize,
}

impl Dimensions {
    pub fn horizontal(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    pub fn volume(&self) -> (usize, usize, usize) {
        (self.nz, self.ny, self.nx)
    }
}

/// How a tracer field is moved onto velocity points
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Nearest,
    Linear,
}

/// Direction of a running vertical sum
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// Accumulate from the surface downwards
    TopDown,
    /// Accumulate from the sea floor upwards
    BottomUp,
}

pub trait OceanGrid {
    fn dimensions(&self) -> Dimensions;

    /// Nominal latitude (degrees north) of each velocity row
    fn latitude(&self) -> ArrayView1<f64>;

    /// 1 for wet velocity cells, 0 otherwise
    fn velocity_mask(&self) -> ArrayView3<f64>;

    /// 1 for wet tracer cells, 0 otherwise
    fn tracer_mask(&self) -> ArrayView3<f64>;

    /// Zonal width (m) of each velocity cell
    fn zonal_width(&self) -> ArrayView2<f64>;

    /// Thickness (m) of each velocity cell, including the partial bottom cell
    fn velocity_thickness(&self) -> ArrayView3<f64>;

    /// Thickness (m) of each tracer cell, including the partial bottom cell
    fn tracer_thickness(&self) -> ArrayView3<f64>;

    /// Horizontal area (m2) of each tracer cell
    fn tracer_area(&self) -> ArrayView2<f64>;

    /// Depth (m) of the top of each nominal layer
    fn layer_tops(&self) -> ArrayView1<f64>;

    /// Moves a tracer field onto velocity points
    fn scalar_on_velocity(&self, field: ArrayView3<f64>, interpolation: Interpolation)
        -> Array3<f64>;
}

/// Zonal width (m) of one cell of a regular longitude grid at `latitude` degrees
pub fn zonal_cell_width(latitude: f64, nlon: usize, radius: f64) -> f64 {
    2.0 * PI * radius * latitude.to_radians().cos() / nlon as f64
}

/// Area (m2) of one cell of a regular longitude grid bounded by two latitudes
pub fn cell_area(lat_south: f64, lat_north: f64, nlon: usize, radius: f64) -> f64 {
    radius.powi(2) * (2.0 * PI / nlon as f64)
        * (lat_north.to_radians().sin() - lat_south.to_radians().sin())
}

/// Edges between consecutive cell-centre latitudes, with the outer edges
/// placed at the poles. Works for both ascending and descending rows.
pub fn latitude_bounds(latitude: ArrayView1<f64>) -> Array1<f64> {
    let n = latitude.len();
    let mut bounds = Array1::zeros(n + 1);

    if n == 0 {
        return bounds;
    }

    let descending = n > 1 && latitude[0] > latitude[n - 1];
    let (first, last) = if descending { (90.0, -90.0) } else { (-90.0, 90.0) };

    bounds[0] = first;
    bounds[n] = last;
    for j in 1..n {
        bounds[j] = 0.5 * (latitude[j - 1] + latitude[j]);
    }

    bounds
}
