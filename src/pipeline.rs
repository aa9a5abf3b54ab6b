//! Record-by-record drivers for the ocean and atmosphere diagnostics.

use {
    crate::{
        atmosphere::{self, AtmosphereFields, HybridGrid, MassCorrection},
        basin::BasinMasks,
        grid::OceanGrid,
        ocean,
        parameters::Parameters,
        series::{RecordTime, Series},
        utils::check_shape,
    },
    anyhow::{ensure, Context, Result},
    log::{debug, info},
    ndarray::{Array1, Array2, Array3},
    serde::{Deserialize, Serialize},
};

/// Ocean fields of one record on the model grid, `[k, j, i]`
#[derive(Debug, Clone)]
pub struct OceanFields {
    /// Potential temperature (degC) at T points
    pub theta: Array3<f64>,
    /// Meridional velocity (m s-1) at velocity points
    pub v: Array3<f64>,
}

/// Atmosphere fields of one record
#[derive(Debug, Clone)]
pub struct AtmosphereRecord {
    pub fields: AtmosphereFields,
    /// Evaporation minus precipitation (kg m-2 s-1), when the product has it
    pub evaporation_minus_precipitation: Option<Array2<f64>>,
}

pub trait OceanSource {
    /// Every record the source holds, in any order
    fn records(&self) -> Result<Vec<RecordTime>>;

    fn load(&self, time: &RecordTime) -> Result<OceanFields>;
}

pub trait AtmosphereSource {
    fn records(&self) -> Result<Vec<RecordTime>>;

    fn load(&self, time: &RecordTime) -> Result<AtmosphereRecord>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OceanOutput {
    /// Latitude of each velocity row
    pub latitude: Array1<f64>,
    /// Zonally integrated energy transport (TW)
    pub transport: Series,
    /// Zonally integrated heat content (J) per depth limit, full column last
    pub heat_content: Vec<(Option<f64>, Series)>,
    /// Stream function (Sv) averaged over all records, `[k, j]`
    pub stream_function: Array2<f64>,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereOutput {
    pub latitude: Array1<f64>,
    /// Total energy transport (PW)
    pub total: Series,
    pub internal: Series,
    pub latent: Series,
    pub geopotential: Series,
    pub kinetic: Series,
    /// Barotropic correction wind (m s-1)
    pub correction: Series,
    pub records: usize,
}

/// Records of `available` within the configured years and of the configured
/// product kind, monthly means or 5-day records, sorted
fn select_records(available: Vec<RecordTime>, parameters: &Parameters) -> Result<Vec<RecordTime>> {
    let years = parameters.numerical.years();
    let monthly = parameters.numerical.records_per_month == 1;

    let mut times = available
        .into_iter()
        .filter(|t| years.contains(&t.year()) && t.is_monthly() == monthly)
        .collect::<Vec<_>>();
    times.sort();
    times.dedup();

    ensure!(
        !times.is_empty(),
        "no records between {} and {}",
        years.start(),
        years.end()
    );

    Ok(times)
}

pub fn run_ocean<G: OceanGrid, S: OceanSource>(
    grid: &G,
    masks: &BasinMasks,
    source: &S,
    parameters: &Parameters,
) -> Result<OceanOutput> {
    let numerical = &parameters.numerical;
    let dims = grid.dimensions();
    check_shape("basin masks", &[masks.dim().0, masks.dim().1], &[dims.ny, dims.nx])?;

    let times = select_records(source.records()?, parameters)?;
    info!(
        "ocean: {} records on a {}x{}x{} grid, {:?} basin",
        times.len(),
        dims.nx,
        dims.ny,
        dims.nz,
        numerical.basin
    );

    let basin = masks.select(numerical.basin)?;
    let mut transport = Series::new();
    let mut heat_content = numerical
        .heat_content_depths
        .iter()
        .map(|&d| Some(d))
        .chain(std::iter::once(None))
        .map(|limit| (limit, Series::new()))
        .collect::<Vec<_>>();
    let mut psi_sum = Array2::<f64>::zeros((dims.nz, dims.ny));

    for time in &times {
        info!("ocean record {}", time);
        let fields = source
            .load(time)
            .with_context(|| format!("failed to load ocean record {}", time))?;

        let energy = ocean::meridional_energy_transport(
            grid,
            fields.v.view(),
            fields.theta.view(),
            basin.view(),
            &parameters.physical,
            numerical.interpolation,
        )?;
        debug!(
            "peak transport {:.3} TW",
            energy.zonal.fold(0.0f64, |m, &t| m.max(t.abs()))
        );
        transport.push(*time, energy.zonal)?;

        psi_sum += &ocean::stream_function(
            grid,
            fields.v.view(),
            basin.view(),
            numerical.integration,
        )?;

        let profiles = ocean::heat_content_profiles(
            grid,
            fields.theta.view(),
            basin.view(),
            &parameters.physical,
            &numerical.heat_content_depths,
        )?;
        for ((_, series), profile) in heat_content.iter_mut().zip(profiles) {
            series.push(*time, profile.zonal)?;
        }
    }

    Ok(OceanOutput {
        latitude: grid.latitude().to_owned(),
        transport,
        heat_content,
        stream_function: psi_sum / times.len() as f64,
        records: times.len(),
    })
}

/// dps/dt of the current record, a backward difference against the
/// previous record or, for the first record, a forward difference against
/// the next one.
fn surface_pressure_tendency(
    previous: Option<(&RecordTime, &Array2<f64>)>,
    current: (&RecordTime, &Array2<f64>),
    next: Option<(&RecordTime, &Array2<f64>)>,
) -> Option<Array2<f64>> {
    let ((t0, p0), (t1, p1)) = match (previous, next) {
        (Some(previous), _) => (previous, current),
        (None, Some(next)) => (current, next),
        (None, None) => return None,
    };

    let dt = t0.seconds_until(t1);
    if dt <= 0.0 {
        return None;
    }

    Some((p1 - p0) / dt)
}

pub fn run_atmosphere<S: AtmosphereSource>(
    grid: &HybridGrid,
    source: &S,
    parameters: &Parameters,
) -> Result<AtmosphereOutput> {
    let times = select_records(source.records()?, parameters)?;
    info!(
        "atmosphere: {} records on {} levels, {}x{}",
        times.len(),
        grid.levels(),
        grid.nlon(),
        grid.nlat()
    );

    let load = |time: &RecordTime| {
        source
            .load(time)
            .with_context(|| format!("failed to load atmosphere record {}", time))
    };

    let mut output = AtmosphereOutput {
        latitude: grid.latitude().to_owned(),
        total: Series::new(),
        internal: Series::new(),
        latent: Series::new(),
        geopotential: Series::new(),
        kinetic: Series::new(),
        correction: Series::new(),
        records: times.len(),
    };

    let mut previous: Option<(RecordTime, Array2<f64>)> = None;
    let mut current = load(&times[0])?;

    for (n, time) in times.iter().enumerate() {
        info!("atmosphere record {}", time);
        let next = match times.get(n + 1) {
            Some(t) => Some((*t, load(t)?)),
            None => None,
        };

        let correction = if parameters.numerical.mass_correction {
            let tendency = surface_pressure_tendency(
                previous.as_ref().map(|(t, ps)| (t, ps)),
                (time, &current.fields.ps),
                next.as_ref().map(|(t, r)| (t, &r.fields.ps)),
            );
            Some(MassCorrection {
                surface_pressure_tendency: tendency,
                evaporation_minus_precipitation: current.evaporation_minus_precipitation.take(),
            })
        } else {
            None
        };

        let transport = atmosphere::meridional_energy_transport(
            grid,
            &current.fields,
            &parameters.physical,
            correction.as_ref(),
        )?;

        output.total.push(*time, transport.total)?;
        output.internal.push(*time, transport.internal)?;
        output.latent.push(*time, transport.latent)?;
        output.geopotential.push(*time, transport.geopotential)?;
        output.kinetic.push(*time, transport.kinetic)?;
        output.correction.push(*time, transport.correction)?;

        match next {
            Some((_, record)) => {
                previous = Some((*time, std::mem::replace(&mut current, record).fields.ps));
            }
            None => break,
        }
    }

    Ok(output)
}
