//! Ocean diagnostics, generic over [`OceanGrid`](crate::grid::OceanGrid).

pub mod heat_content;
pub mod stream_function;
pub mod transport;

pub use {
    heat_content::{heat_content_profiles, ocean_heat_content, HeatContent},
    stream_function::stream_function,
    transport::{meridional_energy_transport, zonal_volume_transport, OceanTransport},
};

use {
    crate::{grid::OceanGrid, utils::check_shape},
    anyhow::Result,
    ndarray::{ArrayView2, ArrayView3},
};

fn check_volume<G: OceanGrid>(grid: &G, name: &str, field: &ArrayView3<f64>) -> Result<()> {
    let dims = grid.dimensions();
    check_shape(name, field.shape(), &[dims.nz, dims.ny, dims.nx])
}

fn check_basin<G: OceanGrid>(grid: &G, basin: &ArrayView2<f64>) -> Result<()> {
    let dims = grid.dimensions();
    check_shape("basin mask", basin.shape(), &[dims.ny, dims.nx])
}
