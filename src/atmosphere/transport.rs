use {
    crate::{
        atmosphere::{
            correction::{correction_velocity, MassCorrection},
            geopotential::geopotential,
            hybrid::HybridGrid,
        },
        constants::PETA,
        parameters::Physical,
        utils::check_shape,
    },
    anyhow::Result,
    ndarray::{Array1, Array2, Array3, ArrayView3, Axis, Zip},
    serde::{Deserialize, Serialize},
};

/// Model level fields of one record, `[lev, lat, lon]`
#[derive(Debug, Clone)]
pub struct AtmosphereFields {
    /// Surface pressure (Pa)
    pub ps: Array2<f64>,
    /// Temperature (K)
    pub t: Array3<f64>,
    /// Specific humidity (kg kg-1)
    pub q: Array3<f64>,
    /// Zonal wind (m s-1)
    pub u: Array3<f64>,
    /// Meridional wind (m s-1)
    pub v: Array3<f64>,
}

/// Zonally integrated northward transport per row (PW), per energy form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereTransport {
    /// Internal energy `cp T`
    pub internal: Array1<f64>,
    /// Latent heat `Lv q`
    pub latent: Array1<f64>,
    /// Geopotential energy
    pub geopotential: Array1<f64>,
    /// Kinetic energy `(u^2 + v^2) / 2`
    pub kinetic: Array1<f64>,
    pub total: Array1<f64>,
    /// Net northward mass flux per row after any correction (kg s-1)
    pub mass_flux: Array1<f64>,
    /// Barotropic correction wind per row (m s-1), zero when uncorrected
    pub correction: Array1<f64>,
}

/// Row integrals `sum_i sum_k a b dp / g dx`
fn row_integral(
    a: ArrayView3<f64>,
    b: ArrayView3<f64>,
    dp: ArrayView3<f64>,
    dx: &Array1<f64>,
    gravity: f64,
) -> Array1<f64> {
    let mut cells = Array3::<f64>::zeros(a.raw_dim());
    Zip::from(&mut cells)
        .and(a)
        .and(b)
        .and(dp)
        .apply(|c, &a, &b, &dp| *c = a * b * dp / gravity);

    cells.sum_axis(Axis(0)).sum_axis(Axis(1)) * dx
}

/// Northward atmospheric energy transport of one record, split into its
/// internal, latent, geopotential and kinetic parts. When `correction` is
/// given, a barotropic wind per row is added so that the net mass flux
/// matches the budget it describes.
pub fn meridional_energy_transport(
    grid: &HybridGrid,
    fields: &AtmosphereFields,
    physical: &Physical,
    correction: Option<&MassCorrection>,
) -> Result<AtmosphereTransport> {
    let shape = [grid.levels(), grid.nlat(), grid.nlon()];
    check_shape("u", fields.u.shape(), &shape)?;
    check_shape("v", fields.v.shape(), &shape)?;

    let dp = grid.pressure_thickness(fields.ps.view())?;
    let phi = geopotential(
        grid,
        fields.ps.view(),
        fields.t.view(),
        fields.q.view(),
        physical,
    )?;

    let cpt = fields.t.mapv(|t| physical.air_heat_capacity * t);
    let lq = fields.q.mapv(|q| physical.latent_heat * q);
    let mut ke = Array3::<f64>::zeros(fields.u.raw_dim());
    Zip::from(&mut ke)
        .and(&fields.u)
        .and(&fields.v)
        .apply(|k, &u, &v| *k = 0.5 * (u * u + v * v));
    let ones = Array3::<f64>::ones(dp.raw_dim());

    let dx = grid.zonal_width(physical.earth_radius);
    let g = physical.gravity;
    let v = fields.v.view();

    let mass_flux = row_integral(v, ones.view(), dp.view(), &dx, g);
    let column_mass = row_integral(ones.view(), ones.view(), dp.view(), &dx, g);

    let vc = match correction {
        Some(correction) => {
            let required = correction.required_mass_flux(grid, physical)?;
            correction_velocity(required.view(), mass_flux.view(), column_mass.view())
        }
        None => Array1::zeros(grid.nlat()),
    };

    let integrate = |energy: &Array3<f64>| {
        let advected = row_integral(v, energy.view(), dp.view(), &dx, g);
        let content = row_integral(ones.view(), energy.view(), dp.view(), &dx, g);
        (advected + &vc * &content) / PETA
    };

    let internal = integrate(&cpt);
    let latent = integrate(&lq);
    let geopotential = integrate(&phi);
    let kinetic = integrate(&ke);
    let total = &internal + &latent + &geopotential + &kinetic;

    Ok(AtmosphereTransport {
        mass_flux: &mass_flux + &(&vc * &column_mass),
        internal,
        latent,
        geopotential,
        kinetic,
        total,
        correction: vc,
    })
}
