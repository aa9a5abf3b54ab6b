use {
    crate::{atmosphere::hybrid::HybridGrid, parameters::Physical, utils::check_shape},
    anyhow::{ensure, Result},
    ndarray::{Array3, ArrayView2, ArrayView3, Axis},
    rayon::prelude::*,
    std::f64::consts::LN_2,
};

/// Geopotential (m2 s-2) at full model levels, integrated hydrostatically
/// from the surface using the virtual temperature of each layer.
pub fn geopotential(
    grid: &HybridGrid,
    ps: ArrayView2<f64>,
    t: ArrayView3<f64>,
    q: ArrayView3<f64>,
    physical: &Physical,
) -> Result<Array3<f64>> {
    let shape = [grid.levels(), grid.nlat(), grid.nlon()];
    check_shape("temperature", t.shape(), &shape)?;
    check_shape("specific humidity", q.shape(), &shape)?;

    let nlev = grid.levels();
    let p = grid.half_level_pressure(ps)?;
    ensure!(
        (0..nlev).all(|k| {
            p.index_axis(Axis(0), k)
                .iter()
                .zip(p.index_axis(Axis(0), k + 1))
                .all(|(top, bottom)| bottom > top)
        }),
        "half level pressure must increase downwards"
    );
    let phi_surface = grid.surface_geopotential();

    let rd = physical.dry_air_gas_constant;
    let virtual_factor = physical.vapour_gas_constant / rd - 1.0;

    let mut phi = Array3::<f64>::zeros(t.raw_dim());

    phi.axis_iter_mut(Axis(1))
        .into_par_iter()
        .enumerate()
        .for_each(|(j, mut row)| {
            for i in 0..row.len_of(Axis(1)) {
                let mut phi_half = phi_surface[[j, i]];

                for k in (0..nlev).rev() {
                    let tv = t[[k, j, i]] * (1.0 + virtual_factor * q[[k, j, i]]);
                    let (p_top, p_bottom) = (p[[k, j, i]], p[[k + 1, j, i]]);

                    if p_top <= 0.0 {
                        row[[k, i]] = phi_half + LN_2 * rd * tv;
                        continue;
                    }

                    let dlnp = (p_bottom / p_top).ln();
                    let alpha = 1.0 - p_top / (p_bottom - p_top) * dlnp;

                    row[[k, i]] = phi_half + alpha * rd * tv;
                    phi_half += rd * tv * dlnp;
                }
            }
        });

    Ok(phi)
}
