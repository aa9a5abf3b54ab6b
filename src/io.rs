//! Raw little-endian `.r8` files and plain text tables.
//!
//! Every field lives in its own file of `f64` values in row-major order.
//! Time-dependent fields are named `{var}_{yyyy}{mm}{dd}.r8`, with `dd`
//! set to `00` for monthly means.

use {
    crate::{
        atmosphere::{AtmosphereFields, HybridGrid},
        basin::BasinMasks,
        grid::{
            mom::{MomFields, MomGrid},
            orca::{OrcaFields, OrcaGrid},
            Dimensions,
        },
        parameters::Parameters,
        pipeline::{
            AtmosphereOutput, AtmosphereRecord, AtmosphereSource, OceanFields, OceanOutput,
            OceanSource,
        },
        series::{RecordTime, Series},
    },
    anyhow::{bail, ensure, Context, Result},
    byteorder::{ByteOrder, LittleEndian},
    log::{debug, info},
    ndarray::{Array, Array1, ArrayBase, ArrayView1, Data, Dimension, Ix1, Ix2, Ix3},
    serde::{de::DeserializeOwned, Serialize},
    std::{
        fs::{self, File},
        io::{BufReader, BufWriter, Write},
        path::{Path, PathBuf},
    },
};

/// Reads a field of `shape` from a raw little-endian file
pub fn read_array<D: Dimension>(path: &Path, shape: D) -> Result<Array<f64, D>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    ensure!(
        bytes.len() == shape.size() * 8,
        "{} holds {} bytes, expected {} for shape {:?}",
        path.display(),
        bytes.len(),
        shape.size() * 8,
        shape.slice()
    );

    let values = bytes
        .chunks(8)
        .map(LittleEndian::read_f64)
        .collect::<Vec<_>>();

    Ok(Array::from_shape_vec(shape, values)?)
}

/// Writes `array` in row-major order as raw little-endian `f64`
pub fn write_array<S, D>(path: &Path, array: &ArrayBase<S, D>) -> Result<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut buf = [0u8; 8];

    for &x in array.iter() {
        LittleEndian::write_f64(&mut buf, x);
        writer.write_all(&buf)?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads a field of level counts, stored as `f64`
pub fn read_levels(path: &Path, shape: Ix2) -> Result<Array<usize, Ix2>> {
    let levels = read_array(path, shape)?;

    ensure!(
        levels.iter().all(|&l| l >= 0.0 && l.fract() == 0.0),
        "{} holds non-integral or negative level counts",
        path.display()
    );

    Ok(levels.mapv(|l| l as usize))
}

fn horizontal(dims: Dimensions) -> Ix2 {
    Ix2(dims.ny, dims.nx)
}

fn volume(dims: Dimensions) -> Ix3 {
    Ix3(dims.nz, dims.ny, dims.nx)
}

/// Reads an ORCA mesh from `e1t`, `e2t`, `e1v`, `gphiv`, `e3t_0`, `gdepw_0`,
/// `mbathy`, `e3t_ps`, `tmask` and `vmask` in the input directory.
pub fn load_orca_grid(parameters: &Parameters) -> Result<OrcaGrid> {
    let dir = &parameters.environment.input_directory;
    let dims = parameters.numerical.dimensions;
    info!(
        "loading ORCA grid {}x{}x{} from {}",
        dims.nx,
        dims.ny,
        dims.nz,
        dir.display()
    );

    let fields = OrcaFields {
        dimensions: dims,
        e1t: read_array(&dir.join("e1t.r8"), horizontal(dims))?,
        e2t: read_array(&dir.join("e2t.r8"), horizontal(dims))?,
        e1v: read_array(&dir.join("e1v.r8"), horizontal(dims))?,
        gphiv: read_array(&dir.join("gphiv.r8"), horizontal(dims))?,
        e3t_0: read_array(&dir.join("e3t_0.r8"), Ix1(dims.nz))?,
        gdepw_0: read_array(&dir.join("gdepw_0.r8"), Ix1(dims.nz))?,
        mbathy: read_levels(&dir.join("mbathy.r8"), horizontal(dims))?,
        e3t_ps: read_array(&dir.join("e3t_ps.r8"), horizontal(dims))?,
        tmask: read_array(&dir.join("tmask.r8"), volume(dims))?,
        vmask: read_array(&dir.join("vmask.r8"), volume(dims))?,
    };

    OrcaGrid::new(fields, parameters.numerical.vertical_scale_factor)
}

/// Reads a MOM5 grid from `dxt`, `dyt`, `dxu`, `yu_ocean`, `sw_ocean`,
/// `kmt` and `ht` in the input directory.
pub fn load_mom_grid(parameters: &Parameters) -> Result<MomGrid> {
    let dir = &parameters.environment.input_directory;
    let dims = parameters.numerical.dimensions;
    info!(
        "loading MOM grid {}x{}x{} from {}",
        dims.nx,
        dims.ny,
        dims.nz,
        dir.display()
    );

    let fields = MomFields {
        dimensions: dims,
        dxt: read_array(&dir.join("dxt.r8"), horizontal(dims))?,
        dyt: read_array(&dir.join("dyt.r8"), horizontal(dims))?,
        dxu: read_array(&dir.join("dxu.r8"), horizontal(dims))?,
        yu_ocean: read_array(&dir.join("yu_ocean.r8"), Ix1(dims.ny))?,
        sw_ocean: read_array(&dir.join("sw_ocean.r8"), Ix1(dims.nz))?,
        kmt: read_levels(&dir.join("kmt.r8"), horizontal(dims))?,
        ht: read_array(&dir.join("ht.r8"), horizontal(dims))?,
    };

    MomGrid::new(fields)
}

/// Reads hybrid level coefficients and the surface geopotential. The
/// dimensions give `nz` full levels on `ny` latitudes and `nx` longitudes.
pub fn load_hybrid_grid(parameters: &Parameters) -> Result<HybridGrid> {
    let dir = &parameters.environment.input_directory;
    let dims = parameters.numerical.dimensions;
    info!(
        "loading hybrid grid with {} levels on {}x{} from {}",
        dims.nz,
        dims.nx,
        dims.ny,
        dir.display()
    );

    HybridGrid::new(
        read_array(&dir.join("a_half.r8"), Ix1(dims.nz + 1))?,
        read_array(&dir.join("b_half.r8"), Ix1(dims.nz + 1))?,
        read_array(&dir.join("latitude.r8"), Ix1(dims.ny))?,
        read_array(&dir.join("phis.r8"), horizontal(dims))?,
    )
}

/// Reads the Atlantic, Pacific and Indian masks. Without any of them only
/// the global ocean is available.
pub fn load_basin_masks(parameters: &Parameters) -> Result<BasinMasks> {
    let dir = &parameters.environment.input_directory;
    let shape = horizontal(parameters.numerical.dimensions);
    let names = ["mask_atlantic.r8", "mask_pacific.r8", "mask_indian.r8"];

    if names.iter().all(|name| !dir.join(name).exists()) {
        debug!("no basin masks in {}", dir.display());
        return Ok(BasinMasks::global((shape[0], shape[1])));
    }

    BasinMasks::new(
        read_array(&dir.join(names[0]), shape)?,
        read_array(&dir.join(names[1]), shape)?,
        read_array(&dir.join(names[2]), shape)?,
    )
}

pub fn field_path(dir: &Path, var: &str, time: &RecordTime) -> PathBuf {
    dir.join(format!("{}_{}.r8", var, time))
}

/// Record times of every `{var}_{yyyymmdd}.r8` file in `dir`
fn scan_records(dir: &Path, var: &str) -> Result<Vec<RecordTime>> {
    let prefix = format!("{}_", var);
    let mut times = vec![];

    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?
    {
        let name = entry?.file_name();
        let name = name.to_string_lossy();

        let stamp = match name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".r8"))
        {
            Some(stamp) => stamp,
            None => continue,
        };

        if stamp.len() != 8 || !stamp.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let (year, month, day) = (&stamp[..4], &stamp[4..6], &stamp[6..]);
        times.push(
            RecordTime::new(year.parse()?, month.parse()?, day.parse()?)
                .with_context(|| format!("bad time stamp in {}", name))?,
        );
    }

    times.sort();
    Ok(times)
}

/// Ocean records stored as `theta_*.r8` and `v_*.r8`
pub struct RawOceanSource {
    directory: PathBuf,
    dimensions: Dimensions,
}

impl RawOceanSource {
    pub fn new(parameters: &Parameters) -> Self {
        RawOceanSource {
            directory: parameters.environment.input_directory.clone(),
            dimensions: parameters.numerical.dimensions,
        }
    }
}

impl OceanSource for RawOceanSource {
    fn records(&self) -> Result<Vec<RecordTime>> {
        scan_records(&self.directory, "theta")
    }

    fn load(&self, time: &RecordTime) -> Result<OceanFields> {
        let shape = volume(self.dimensions);

        Ok(OceanFields {
            theta: read_array(&field_path(&self.directory, "theta", time), shape)?,
            v: read_array(&field_path(&self.directory, "v", time), shape)?,
        })
    }
}

/// Atmosphere records stored as `ps`, `t`, `q`, `u`, `v` and, optionally,
/// `emp` files.
pub struct RawAtmosphereSource {
    directory: PathBuf,
    dimensions: Dimensions,
}

impl RawAtmosphereSource {
    pub fn new(parameters: &Parameters) -> Self {
        RawAtmosphereSource {
            directory: parameters.environment.input_directory.clone(),
            dimensions: parameters.numerical.dimensions,
        }
    }
}

impl AtmosphereSource for RawAtmosphereSource {
    fn records(&self) -> Result<Vec<RecordTime>> {
        scan_records(&self.directory, "ps")
    }

    fn load(&self, time: &RecordTime) -> Result<AtmosphereRecord> {
        let dir = &self.directory;
        let (surface, levels) = (horizontal(self.dimensions), volume(self.dimensions));

        let emp_path = field_path(dir, "emp", time);
        let evaporation_minus_precipitation = if emp_path.exists() {
            Some(read_array(&emp_path, surface)?)
        } else {
            None
        };

        Ok(AtmosphereRecord {
            fields: AtmosphereFields {
                ps: read_array(&field_path(dir, "ps", time), surface)?,
                t: read_array(&field_path(dir, "t", time), levels)?,
                q: read_array(&field_path(dir, "q", time), levels)?,
                u: read_array(&field_path(dir, "u", time), levels)?,
                v: read_array(&field_path(dir, "v", time), levels)?,
            },
            evaporation_minus_precipitation,
        })
    }
}

/// One line per row: latitude followed by each column's value
pub fn format_profile_table(
    latitude: ArrayView1<f64>,
    columns: &[(&str, ArrayView1<f64>)],
) -> Result<String> {
    for (name, column) in columns {
        if column.len() != latitude.len() {
            bail!(
                "column {} has {} rows, expected {}",
                name,
                column.len(),
                latitude.len()
            );
        }
    }

    let mut s = String::from("# latitude");
    for (name, _) in columns {
        s += " ";
        s += name;
    }
    s += "\n";

    for (j, lat) in latitude.iter().enumerate() {
        s += &format!("{:.4}", lat);
        for (_, column) in columns {
            s += &format!(" {:.9}", column[j]);
        }
        s += "\n";
    }

    Ok(s)
}

pub fn write_profile_table(
    path: &Path,
    latitude: ArrayView1<f64>,
    columns: &[(&str, ArrayView1<f64>)],
) -> Result<()> {
    let table = format_profile_table(latitude, columns)?;
    let mut f =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    f.write_all(table.as_bytes())?;
    Ok(())
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn write_climatology(path: &Path, latitude: ArrayView1<f64>, series: &Series) -> Result<()> {
    let climatology = series.climatology();
    let columns = MONTHS
        .iter()
        .zip(climatology.outer_iter())
        .map(|(&name, row)| (name, row))
        .collect::<Vec<_>>();

    write_profile_table(path, latitude, &columns)
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    bincode::serialize_into(BufWriter::new(file), value)?;
    Ok(())
}

pub fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(bincode::deserialize_from(BufReader::new(file))?)
}

/// Writes `omet_mean.asc`, `omet_climatology.asc`, `psi.r8` and the whole
/// accumulation as `omet_series.bin` into `dir`
pub fn save_ocean_output(dir: &Path, output: &OceanOutput) -> Result<()> {
    let latitude = output.latitude.view();
    let width = latitude.len();
    let mean = |series: &Series| {
        series
            .mean()
            .unwrap_or_else(|| Array1::from_elem(width, f64::NAN))
    };

    let mut names = vec!["transport".to_owned()];
    let mut means = vec![mean(&output.transport)];
    for (limit, series) in &output.heat_content {
        names.push(match limit {
            Some(depth) => format!("ohc_{}", depth),
            None => "ohc_full".to_owned(),
        });
        means.push(mean(series));
    }
    let columns = names
        .iter()
        .zip(&means)
        .map(|(name, mean)| (name.as_str(), mean.view()))
        .collect::<Vec<_>>();

    write_profile_table(&dir.join("omet_mean.asc"), latitude, &columns)?;
    write_climatology(&dir.join("omet_climatology.asc"), latitude, &output.transport)?;
    write_array(&dir.join("psi.r8"), &output.stream_function)?;
    write_bincode(&dir.join("omet_series.bin"), output)?;

    info!("wrote {} ocean records to {}", output.records, dir.display());
    Ok(())
}

/// Writes `amet_mean.asc`, `amet_climatology.asc` and `amet_series.bin`
pub fn save_atmosphere_output(dir: &Path, output: &AtmosphereOutput) -> Result<()> {
    let latitude = output.latitude.view();
    let width = latitude.len();

    let parts = [
        ("total", &output.total),
        ("internal", &output.internal),
        ("latent", &output.latent),
        ("geopotential", &output.geopotential),
        ("kinetic", &output.kinetic),
        ("correction", &output.correction),
    ];
    let means = parts
        .iter()
        .map(|(_, series)| {
            series
                .mean()
                .unwrap_or_else(|| Array1::from_elem(width, f64::NAN))
        })
        .collect::<Vec<_>>();
    let columns = parts
        .iter()
        .zip(&means)
        .map(|((name, _), mean)| (*name, mean.view()))
        .collect::<Vec<_>>();

    write_profile_table(&dir.join("amet_mean.asc"), latitude, &columns)?;
    write_climatology(&dir.join("amet_climatology.asc"), latitude, &output.total)?;
    write_bincode(&dir.join("amet_series.bin"), output)?;

    info!(
        "wrote {} atmosphere records to {}",
        output.records,
        dir.display()
    );
    Ok(())
}
