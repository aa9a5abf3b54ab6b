use {
    crate::{
        grid::OceanGrid,
        ocean::{check_basin, check_volume},
        parameters::Physical,
        utils::zonal_sum,
    },
    anyhow::{ensure, Result},
    ndarray::{Array1, Array2, Array3, ArrayView2, ArrayView3, Axis, Zip},
    rayon::prelude::*,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatContent {
    /// Depth (m) the integral stops at, `None` for the full column
    pub depth_limit: Option<f64>,
    /// Heat content per column (J)
    pub column: Array2<f64>,
    /// Heat content per row (J)
    pub zonal: Array1<f64>,
    /// Heat content of the whole basin (J)
    pub total: f64,
}

/// Ocean heat content `rho cp (T - T_ref) dA dz`, integrated from the
/// surface down to `depth_limit`. The layer containing the limit only
/// contributes the part above it.
pub fn ocean_heat_content<G: OceanGrid>(
    grid: &G,
    theta: ArrayView3<f64>,
    basin: ArrayView2<f64>,
    physical: &Physical,
    depth_limit: Option<f64>,
) -> Result<HeatContent> {
    check_volume(grid, "theta", &theta)?;
    check_basin(grid, &basin)?;
    if let Some(limit) = depth_limit {
        ensure!(limit > 0.0, "depth limit must be positive, got {}", limit);
    }

    let rho_cp = physical.volumetric_heat_capacity();
    let t_ref = physical.reference_temperature;

    let weight = &grid.tracer_area() * &basin;
    let dz = grid.tracer_thickness();
    let mask = grid.tracer_mask();
    let tops = grid.layer_tops();

    let mut heat = Array3::<f64>::zeros(theta.raw_dim());

    heat.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(k, level)| {
            let top = tops[k];

            Zip::from(level)
                .and(theta.index_axis(Axis(0), k))
                .and(dz.index_axis(Axis(0), k))
                .and(mask.index_axis(Axis(0), k))
                .and(&weight)
                .apply(|h, &t, &dz, &m, &w| {
                    let dz = match depth_limit {
                        Some(limit) => (limit - top).max(0.0).min(dz),
                        None => dz,
                    };

                    *h = if m * w * dz != 0.0 {
                        rho_cp * (t - t_ref) * w * dz * m
                    } else {
                        0.0
                    };
                });
        });

    let column = heat.sum_axis(Axis(0));
    let zonal = zonal_sum(column.view());
    let total = zonal.sum();

    Ok(HeatContent {
        depth_limit,
        column,
        zonal,
        total,
    })
}

/// Heat content down to each of `depths`, followed by the full column
pub fn heat_content_profiles<G: OceanGrid>(
    grid: &G,
    theta: ArrayView3<f64>,
    basin: ArrayView2<f64>,
    physical: &Physical,
    depths: &[f64],
) -> Result<Vec<HeatContent>> {
    depths
        .iter()
        .map(|&d| Some(d))
        .chain(std::iter::once(None))
        .map(|limit| ocean_heat_content(grid, theta, basin, physical, limit))
        .collect()
}
