use {
    crate::{
        constants::{SVERDRUP, TERA},
        grid::{Interpolation, OceanGrid},
        ocean::{check_basin, check_volume},
        parameters::Physical,
        utils::zonal_sum,
    },
    anyhow::Result,
    ndarray::{Array1, Array2, Array3, ArrayView2, ArrayView3, Axis, Zip},
    rayon::prelude::*,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OceanTransport {
    /// Vertically integrated northward energy transport per column (TW)
    pub column: Array2<f64>,
    /// Zonally integrated northward energy transport per row (TW)
    pub zonal: Array1<f64>,
}

/// Northward ocean energy transport of one record.
///
/// For every velocity cell the flux is
/// `rho cp v (T_v - T_ref) dx dz mask basin`, where `T_v` is `theta` moved
/// onto the velocity point and `dz` already accounts for the partial
/// bottom cell. Fluxes are summed over the column and scaled to TW.
pub fn meridional_energy_transport<G: OceanGrid>(
    grid: &G,
    v: ArrayView3<f64>,
    theta: ArrayView3<f64>,
    basin: ArrayView2<f64>,
    physical: &Physical,
    interpolation: Interpolation,
) -> Result<OceanTransport> {
    check_volume(grid, "v", &v)?;
    check_volume(grid, "theta", &theta)?;
    check_basin(grid, &basin)?;

    let rho_cp = physical.volumetric_heat_capacity();
    let t_ref = physical.reference_temperature;

    let theta_v = grid.scalar_on_velocity(theta, interpolation);
    let weight = &grid.zonal_width() * &basin;
    let dz = grid.velocity_thickness();
    let mask = grid.velocity_mask();

    let mut flux = Array3::<f64>::zeros(v.raw_dim());

    flux.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(k, level)| {
            Zip::from(level)
                .and(v.index_axis(Axis(0), k))
                .and(theta_v.index_axis(Axis(0), k))
                .and(dz.index_axis(Axis(0), k))
                .and(mask.index_axis(Axis(0), k))
                .and(&weight)
                .apply(|f, &v, &t, &dz, &m, &w| {
                    *f = if m * w != 0.0 {
                        rho_cp * v * (t - t_ref) * w * dz * m
                    } else {
                        0.0
                    };
                });
        });

    let column = flux.sum_axis(Axis(0)) / TERA;
    let zonal = zonal_sum(column.view());

    Ok(OceanTransport { column, zonal })
}

/// Zonally integrated northward volume transport per level, `[k, j]` in Sv
pub fn zonal_volume_transport<G: OceanGrid>(
    grid: &G,
    v: ArrayView3<f64>,
    basin: ArrayView2<f64>,
) -> Result<Array2<f64>> {
    check_volume(grid, "v", &v)?;
    check_basin(grid, &basin)?;

    let weight = &grid.zonal_width() * &basin;
    let dz = grid.velocity_thickness();
    let mask = grid.velocity_mask();

    let mut transport = Array2::<f64>::zeros((v.len_of(Axis(0)), v.len_of(Axis(1))));

    transport
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(k, mut level)| {
            let mut cells = Array2::<f64>::zeros(weight.raw_dim());
            Zip::from(&mut cells)
                .and(v.index_axis(Axis(0), k))
                .and(dz.index_axis(Axis(0), k))
                .and(mask.index_axis(Axis(0), k))
                .and(&weight)
                .apply(|c, &v, &dz, &m, &w| {
                    if m * w != 0.0 {
                        *c = v * w * dz * m;
                    }
                });

            level.assign(&(zonal_sum(cells.view()) / SVERDRUP));
        });

    Ok(transport)
}
