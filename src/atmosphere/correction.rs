//! Barotropic mass correction.
//!
//! Reanalysis winds do not close the column mass budget, so the raw energy
//! transport carries a spurious net mass flux across each latitude. The
//! correction adds a depth-independent meridional wind per row which brings
//! the zonally integrated mass flux to what the surface pressure tendency
//! and the freshwater flux require.

use {
    crate::{atmosphere::hybrid::HybridGrid, parameters::Physical},
    anyhow::Result,
    ndarray::{Array1, Array2, ArrayView1, Axis},
};

#[derive(Debug, Clone, Default)]
pub struct MassCorrection {
    /// dps/dt (Pa s-1)
    pub surface_pressure_tendency: Option<Array2<f64>>,
    /// Evaporation minus precipitation (kg m-2 s-1)
    pub evaporation_minus_precipitation: Option<Array2<f64>>,
}

impl MassCorrection {
    /// Northward mass flux (kg s-1) through each row required by the mass
    /// budget of the polar cap to its south.
    pub fn required_mass_flux(&self, grid: &HybridGrid, physical: &Physical) -> Result<Array1<f64>> {
        let (nlat, nlon) = (grid.nlat(), grid.nlon());
        let mut source = Array2::<f64>::zeros((nlat, nlon));

        if let Some(emp) = &self.evaporation_minus_precipitation {
            grid.check_surface("evaporation minus precipitation", &emp.view())?;
            source += emp;
        }
        if let Some(tendency) = &self.surface_pressure_tendency {
            grid.check_surface("surface pressure tendency", &tendency.view())?;
            source.scaled_add(-1.0 / physical.gravity, tendency);
        }

        let area = grid.cell_area(physical.earth_radius);
        let row_source = source.sum_axis(Axis(1)) * &area;

        Ok(cumulate_from_south(grid.latitude(), row_source.view()))
    }
}

/// For each row, the sum of `values` over the rows south of it plus half
/// its own value.
fn cumulate_from_south(latitude: ArrayView1<f64>, values: ArrayView1<f64>) -> Array1<f64> {
    let mut order = (0..latitude.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        latitude[a]
            .partial_cmp(&latitude[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = Array1::zeros(latitude.len());
    let mut acc = 0.0;
    for j in order {
        out[j] = acc + 0.5 * values[j];
        acc += values[j];
    }

    out
}

/// Depth-independent wind (m s-1) per row closing the mass budget
pub fn correction_velocity(
    required: ArrayView1<f64>,
    actual: ArrayView1<f64>,
    column_mass: ArrayView1<f64>,
) -> Array1<f64> {
    let mut vc = Array1::zeros(required.len());
    for j in 0..required.len() {
        if column_mass[j] > 0.0 {
            vc[j] = (required[j] - actual[j]) / column_mass[j];
        }
    }
    vc
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::atmosphere::hybrid::test::grid,
        approx::assert_abs_diff_eq,
        ndarray::array,
    };

    #[test]
    fn half_row_at_cell_centres() {
        let latitude = array![60.0, 0.0, -60.0];
        let values = array![1.0, 2.0, 4.0];

        let out = cumulate_from_south(latitude.view(), values.view());

        assert_eq!(array![6.5, 5.0, 2.0], out);
    }

    #[test]
    fn no_sources_require_no_flux() {
        let grid = grid();
        let required = MassCorrection::default()
            .required_mass_flux(&grid, &Physical::default())
            .unwrap();

        assert_eq!(Array1::<f64>::zeros(3), required);
    }

    #[test]
    fn uniform_evaporation_flows_north_of_cap() {
        let grid = grid();
        let physical = Physical::default();
        let correction = MassCorrection {
            surface_pressure_tendency: None,
            evaporation_minus_precipitation: Some(Array2::from_elem((3, 4), 1.0E-5)),
        };

        let required = correction.required_mass_flux(&grid, &physical).unwrap();

        let area = grid.cell_area(physical.earth_radius) * 4.0;
        // the southern row exports half of its own evaporation
        assert_abs_diff_eq!(required[2], 0.5 * 1.0E-5 * area[2], epsilon = 1.0E-3);
        assert_abs_diff_eq!(
            required[1],
            1.0E-5 * (area[2] + 0.5 * area[1]),
            epsilon = 1.0E-3
        );
    }

    #[test]
    fn velocity_closes_budget() {
        let vc = correction_velocity(
            array![0.0, 10.0].view(),
            array![4.0, 4.0].view(),
            array![2.0, 0.0].view(),
        );

        assert_eq!(array![-2.0, 0.0], vc);
    }
}
