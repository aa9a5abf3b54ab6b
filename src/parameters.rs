use {
    crate::{
        basin::Basin,
        constants::*,
        grid::{Dimensions, Integration, Interpolation},
    },
    serde::{Deserialize, Serialize},
    std::path::PathBuf,
};

/// Run parameters
#[derive(Debug, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct Parameters {
    pub environment: Environment,
    pub physical: Physical,
    pub numerical: Numerical,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Directory containing grid and field files
    pub input_directory: PathBuf,
    /// Directory tables and accumulated series are written to
    pub output_directory: PathBuf,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            input_directory: PathBuf::from("input"),
            output_directory: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Physical {
    /// Mean Earth radius
    pub earth_radius: f64,
    /// Gravitational acceleration
    pub gravity: f64,
    /// Specific heat of dry air
    pub air_heat_capacity: f64,
    /// Latent heat of vaporisation
    pub latent_heat: f64,
    pub dry_air_gas_constant: f64,
    pub vapour_gas_constant: f64,
    /// Reference sea water density
    pub sea_water_density: f64,
    /// Specific heat of sea water
    pub sea_water_heat_capacity: f64,
    /// Temperature (degC) heat content and transport are measured against
    pub reference_temperature: f64,
}

impl Default for Physical {
    fn default() -> Self {
        Physical {
            earth_radius: EARTH_RADIUS,
            gravity: GRAVITY,
            air_heat_capacity: CP_AIR,
            latent_heat: LATENT_HEAT,
            dry_air_gas_constant: R_DRY,
            vapour_gas_constant: R_VAPOUR,
            sea_water_density: RHO_SEA,
            sea_water_heat_capacity: CP_SEA,
            reference_temperature: 0.0,
        }
    }
}

impl Physical {
    /// rho * cp of sea water (J m-3 K-1)
    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.sea_water_density * self.sea_water_heat_capacity
    }
}

/// Ocean grid family of the input product
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKind {
    /// NEMO ORCA C-grid (ORAS4, GLORYS2V3)
    Orca,
    /// MOM5 B-grid (SODA3)
    Mom,
}

/// Thickness used for V cells on the ORCA grid
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalScaleFactor {
    /// Thickness of the T cell the V point belongs to
    TPoint,
    /// Minimum of the two T cells either side of the V point
    VPointMin,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Numerical {
    pub grid: GridKind,
    pub dimensions: Dimensions,
    /// Scalar interpolation onto velocity points
    pub interpolation: Interpolation,
    /// Direction of the stream function vertical sum
    pub integration: Integration,
    pub vertical_scale_factor: VerticalScaleFactor,
    /// Sub-basin the ocean diagnostics are restricted to
    pub basin: Basin,
    /// Depths (m) heat content is integrated down to, besides the full column
    pub heat_content_depths: Vec<f64>,
    pub start_year: u32,
    pub end_year: u32,
    /// 1 for monthly products, 6 for 5-day products
    pub records_per_month: u32,
    /// Apply the barotropic mass correction to atmospheric transport
    pub mass_correction: bool,
}

impl Default for Numerical {
    fn default() -> Self {
        Numerical {
            grid: GridKind::Orca,
            dimensions: Dimensions {
                nx: 362,
                ny: 292,
                nz: 42,
            },
            interpolation: Interpolation::Linear,
            integration: Integration::TopDown,
            vertical_scale_factor: VerticalScaleFactor::TPoint,
            basin: Basin::Global,
            heat_content_depths: vec![300.0, 700.0, 2000.0],
            start_year: 1979,
            end_year: 2014,
            records_per_month: 1,
            mass_correction: true,
        }
    }
}

impl Numerical {
    pub fn years(&self) -> std::ops::RangeInclusive<u32> {
        self.start_year..=self.end_year
    }
}

#[cfg(test)]
mod test {
    use {super::*, std::fs::File};

    #[test]
    fn defaults() {
        assert_eq!(
            Parameters::default(),
            serde_yaml::from_reader::<_, Parameters>(
                File::open("src/testdata/defaults.yaml").unwrap()
            )
            .unwrap()
        );
    }

    #[test]
    fn mom_five_day() {
        let yaml = r#"
environment:
  input_directory: /data/soda3
  output_directory: /tmp/soda3
physical:
  earth_radius: 6371009.0
  gravity: 9.80616
  air_heat_capacity: 1004.64
  latent_heat: 2501000.0
  dry_air_gas_constant: 287.05
  vapour_gas_constant: 461.5
  sea_water_density: 1027.0
  sea_water_heat_capacity: 3987.0
  reference_temperature: 0.0
numerical:
  grid: mom
  dimensions: { nx: 720, ny: 330, nz: 50 }
  interpolation: nearest
  integration: bottom_up
  vertical_scale_factor: t_point
  basin: atlantic
  heat_content_depths: [700.0]
  start_year: 1980
  end_year: 2015
  records_per_month: 6
  mass_correction: false
"#;
        let params = serde_yaml::from_str::<Parameters>(yaml).unwrap();

        assert_eq!(GridKind::Mom, params.numerical.grid);
        assert_eq!(Basin::Atlantic, params.numerical.basin);
        assert_eq!(Integration::BottomUp, params.numerical.integration);
        assert_eq!(36, params.numerical.years().count());
        assert_eq!(Physical::default(), params.physical);
    }
}
