//! Hybrid sigma-pressure model levels on a regular latitude-longitude grid,
//! as used by ERA-Interim, MERRA2 and JRA55.

use {
    crate::{
        grid::{cell_area, latitude_bounds, zonal_cell_width},
        utils::check_shape,
    },
    anyhow::{ensure, Result},
    ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis},
};

#[derive(Debug, Clone)]
pub struct HybridGrid {
    /// Pressure coefficient (Pa) of each half level, top to bottom
    a_half: Array1<f64>,
    /// Surface pressure coefficient of each half level, top to bottom
    b_half: Array1<f64>,
    /// Latitude (degrees north) of each row
    latitude: Array1<f64>,
    /// Surface geopotential (m2 s-2)
    surface_geopotential: Array2<f64>,
}

impl HybridGrid {
    pub fn new(
        a_half: Array1<f64>,
        b_half: Array1<f64>,
        latitude: Array1<f64>,
        surface_geopotential: Array2<f64>,
    ) -> Result<Self> {
        ensure!(
            a_half.len() >= 2,
            "need at least two half levels, got {}",
            a_half.len()
        );
        check_shape("b_half", b_half.shape(), a_half.shape())?;
        check_shape(
            "surface geopotential",
            &[surface_geopotential.nrows()],
            &[latitude.len()],
        )?;
        ensure!(
            (b_half[b_half.len() - 1] - 1.0).abs() < 1.0E-6,
            "the lowest half level must be the surface"
        );

        Ok(HybridGrid {
            a_half,
            b_half,
            latitude,
            surface_geopotential,
        })
    }

    /// Number of full levels
    pub fn levels(&self) -> usize {
        self.a_half.len() - 1
    }

    pub fn nlat(&self) -> usize {
        self.latitude.len()
    }

    pub fn nlon(&self) -> usize {
        self.surface_geopotential.ncols()
    }

    pub fn latitude(&self) -> ArrayView1<f64> {
        self.latitude.view()
    }

    pub fn surface_geopotential(&self) -> ArrayView2<f64> {
        self.surface_geopotential.view()
    }

    pub fn check_surface(&self, name: &str, field: &ArrayView2<f64>) -> Result<()> {
        check_shape(name, field.shape(), &[self.nlat(), self.nlon()])
    }

    /// `p = a + b ps` at every half level, `[nlev + 1, nlat, nlon]`
    pub fn half_level_pressure(&self, ps: ArrayView2<f64>) -> Result<Array3<f64>> {
        self.check_surface("surface pressure", &ps)?;

        let mut p = Array3::zeros((self.levels() + 1, self.nlat(), self.nlon()));
        for (k, mut level) in p.axis_iter_mut(Axis(0)).enumerate() {
            let (a, b) = (self.a_half[k], self.b_half[k]);
            level.assign(&ps.mapv(|ps| a + b * ps));
        }

        Ok(p)
    }

    /// Pressure thickness of every full level, `[nlev, nlat, nlon]`
    pub fn pressure_thickness(&self, ps: ArrayView2<f64>) -> Result<Array3<f64>> {
        let p = self.half_level_pressure(ps)?;
        let nlev = self.levels();

        let mut dp = Array3::zeros((nlev, self.nlat(), self.nlon()));
        for k in 0..nlev {
            dp.index_axis_mut(Axis(0), k)
                .assign(&(&p.index_axis(Axis(0), k + 1) - &p.index_axis(Axis(0), k)));
        }

        ensure!(
            dp.iter().all(|&dp| dp > 0.0),
            "half level pressure must increase downwards"
        );

        Ok(dp)
    }

    /// Zonal width (m) of the cells of each row
    pub fn zonal_width(&self, radius: f64) -> Array1<f64> {
        self.latitude
            .mapv(|lat| zonal_cell_width(lat, self.nlon(), radius))
    }

    /// Area (m2) of one cell of each row
    pub fn cell_area(&self, radius: f64) -> Array1<f64> {
        let bounds = latitude_bounds(self.latitude.view());
        (0..self.nlat())
            .map(|j| {
                let (a, b) = (bounds[j], bounds[j + 1]);
                cell_area(a.min(b), a.max(b), self.nlon(), radius)
            })
            .collect()
    }
}
