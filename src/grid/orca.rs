//! NEMO ORCA C-grid, as used by ORAS4 and GLORYS2V3.
//!
//! V points sit on the northern face of T cells: `v[k, j, i]` lies between
//! `T[k, j, i]` and `T[k, j + 1, i]`.

use {
    crate::{
        grid::{Dimensions, Interpolation, OceanGrid},
        parameters::VerticalScaleFactor,
        partial_cell::{depth_adjustment, effective_thickness},
        utils::check_shape,
    },
    anyhow::Result,
    log::debug,
    ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis, Zip},
    rayon::prelude::*,
};

/// Mesh and mask variables of an ORCA configuration
#[derive(Debug, Clone)]
pub struct OrcaFields {
    pub dimensions: Dimensions,
    /// Zonal width of T cells
    pub e1t: Array2<f64>,
    /// Meridional width of T cells
    pub e2t: Array2<f64>,
    /// Zonal width of V cells
    pub e1v: Array2<f64>,
    /// Latitude of V points
    pub gphiv: Array2<f64>,
    /// Nominal layer thickness
    pub e3t_0: Array1<f64>,
    /// Depth of the top of each layer
    pub gdepw_0: Array1<f64>,
    /// Number of wet levels per column
    pub mbathy: Array2<usize>,
    /// Thickness of the partial bottom cell
    pub e3t_ps: Array2<f64>,
    pub tmask: Array3<f64>,
    pub vmask: Array3<f64>,
}

#[derive(Debug, Clone)]
pub struct OrcaGrid {
    fields: OrcaFields,
    latitude: Array1<f64>,
    e3t_adjust: Array3<f64>,
    e3t: Array3<f64>,
    e3v: Array3<f64>,
    area: Array2<f64>,
}

impl OrcaGrid {
    pub fn new(fields: OrcaFields, scale_factor: VerticalScaleFactor) -> Result<Self> {
        let dims = fields.dimensions;
        let horizontal = [dims.ny, dims.nx];
        let volume = [dims.nz, dims.ny, dims.nx];

        check_shape("e1t", fields.e1t.shape(), &horizontal)?;
        check_shape("e2t", fields.e2t.shape(), &horizontal)?;
        check_shape("e1v", fields.e1v.shape(), &horizontal)?;
        check_shape("gphiv", fields.gphiv.shape(), &horizontal)?;
        check_shape("mbathy", fields.mbathy.shape(), &horizontal)?;
        check_shape("e3t_ps", fields.e3t_ps.shape(), &horizontal)?;
        check_shape("e3t_0", fields.e3t_0.shape(), &[dims.nz])?;
        check_shape("gdepw_0", fields.gdepw_0.shape(), &[dims.nz])?;
        check_shape("tmask", fields.tmask.shape(), &volume)?;
        check_shape("vmask", fields.vmask.shape(), &volume)?;

        debug!("Building ORCA grid {:?}", dims);

        let e3t_adjust = depth_adjustment(
            fields.e3t_0.view(),
            fields.mbathy.view(),
            fields.e3t_ps.view(),
        );
        let e3t = effective_thickness(fields.e3t_0.view(), e3t_adjust.view());

        let e3v = match scale_factor {
            VerticalScaleFactor::TPoint => e3t.clone(),
            VerticalScaleFactor::VPointMin => {
                let mut e3v = e3t.clone();
                let ny = dims.ny;
                for j in 0..ny.saturating_sub(1) {
                    Zip::from(e3v.index_axis_mut(Axis(1), j))
                        .and(e3t.index_axis(Axis(1), j + 1))
                        .apply(|v, &north| *v = v.min(north));
                }
                e3v
            }
        };

        let latitude = fields
            .gphiv
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(dims.ny));

        let area = &fields.e1t * &fields.e2t;

        Ok(OrcaGrid {
            fields,
            latitude,
            e3t_adjust,
            e3t,
            e3v,
            area,
        })
    }

    pub fn fields(&self) -> &OrcaFields {
        &self.fields
    }

    /// Thickness removed from the nominal layer at each partial bottom cell
    pub fn depth_adjustment(&self) -> ArrayView3<f64> {
        self.e3t_adjust.view()
    }
}

impl OceanGrid for OrcaGrid {
    fn dimensions(&self) -> Dimensions {
        self.fields.dimensions
    }

    fn latitude(&self) -> ArrayView1<f64> {
        self.latitude.view()
    }

    fn velocity_mask(&self) -> ArrayView3<f64> {
        self.fields.vmask.view()
    }

    fn tracer_mask(&self) -> ArrayView3<f64> {
        self.fields.tmask.view()
    }

    fn zonal_width(&self) -> ArrayView2<f64> {
        self.fields.e1v.view()
    }

    fn velocity_thickness(&self) -> ArrayView3<f64> {
        self.e3v.view()
    }

    fn tracer_thickness(&self) -> ArrayView3<f64> {
        self.e3t.view()
    }

    fn tracer_area(&self) -> ArrayView2<f64> {
        self.area.view()
    }

    fn layer_tops(&self) -> ArrayView1<f64> {
        self.fields.gdepw_0.view()
    }

    fn scalar_on_velocity(
        &self,
        field: ArrayView3<f64>,
        interpolation: Interpolation,
    ) -> Array3<f64> {
        let mut out = field.to_owned();

        if interpolation == Interpolation::Nearest {
            return out;
        }

        let ny = field.dim().1;
        let tmask = &self.fields.tmask;

        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(k, mut level)| {
                let mask = tmask.index_axis(Axis(0), k);
                let field = field.index_axis(Axis(0), k);

                // the last row has no northern neighbour and keeps its own value
                for j in 0..ny.saturating_sub(1) {
                    for (i, value) in level.index_axis_mut(Axis(0), j).iter_mut().enumerate() {
                        // land values may be fill values
                        *value = match (mask[[j, i]] > 0.0, mask[[j + 1, i]] > 0.0) {
                            (true, true) => 0.5 * (field[[j, i]] + field[[j + 1, i]]),
                            (true, false) => field[[j, i]],
                            (false, true) => field[[j + 1, i]],
                            (false, false) => 0.0,
                        };
                    }
                }
            });

        out
    }
}

#[cfg(test)]
pub(crate) mod test {
    use {super::*, approx::assert_abs_diff_eq, ndarray::array};

    /// A 3x4 box with 3 levels of 10, 20 and 40 m. The western column is
    /// land, the eastern columns have a partial bottom cell.
    pub(crate) fn box_fields() -> OrcaFields {
        let dimensions = Dimensions {
            nx: 3,
            ny: 4,
            nz: 3,
        };

        let mbathy = array![[0, 3, 3], [0, 3, 2], [0, 3, 2], [0, 3, 2]];

        let mut tmask = Array3::zeros(dimensions.volume());
        for ((j, i), &levels) in mbathy.indexed_iter() {
            for k in 0..levels {
                tmask[[k, j, i]] = 1.0;
            }
        }

        let mut vmask = tmask.clone();
        for j in 0..dimensions.ny - 1 {
            for k in 0..dimensions.nz {
                for i in 0..dimensions.nx {
                    vmask[[k, j, i]] = tmask[[k, j, i]] * tmask[[k, j + 1, i]];
                }
            }
        }

        OrcaFields {
            dimensions,
            e1t: Array2::from_elem(dimensions.horizontal(), 1000.0),
            e2t: Array2::from_elem(dimensions.horizontal(), 500.0),
            e1v: Array2::from_elem(dimensions.horizontal(), 1000.0),
            gphiv: array![
                [-10.0, -10.0, -10.0],
                [0.0, 0.0, 0.0],
                [10.0, 10.0, 10.0],
                [20.0, 20.0, 20.0]
            ],
            e3t_0: array![10.0, 20.0, 40.0],
            gdepw_0: array![0.0, 10.0, 30.0],
            mbathy,
            e3t_ps: array![
                [0.0, 40.0, 40.0],
                [0.0, 40.0, 15.0],
                [0.0, 40.0, 15.0],
                [0.0, 30.0, 15.0]
            ],
            tmask,
            vmask,
        }
    }

    #[test]
    fn partial_cells_thin_bottom_layer() {
        let grid = OrcaGrid::new(box_fields(), VerticalScaleFactor::TPoint).unwrap();

        assert_abs_diff_eq!(grid.depth_adjustment()[[1, 1, 2]], 5.0);
        assert_abs_diff_eq!(grid.depth_adjustment()[[2, 3, 1]], 10.0);

        assert_abs_diff_eq!(grid.tracer_thickness()[[1, 1, 2]], 15.0);
        assert_abs_diff_eq!(grid.tracer_thickness()[[2, 3, 1]], 30.0);
        assert_abs_diff_eq!(grid.tracer_thickness()[[0, 0, 0]], 10.0);
    }

    #[test]
    fn v_point_minimum() {
        let grid = OrcaGrid::new(box_fields(), VerticalScaleFactor::VPointMin).unwrap();

        // row 2 takes the thinner bottom cell of row 3
        assert_abs_diff_eq!(grid.velocity_thickness()[[2, 2, 1]], 30.0);
        assert_abs_diff_eq!(grid.velocity_thickness()[[2, 3, 1]], 30.0);
        // row 0 sits south of a full cell
        assert_abs_diff_eq!(grid.velocity_thickness()[[2, 0, 1]], 40.0);
    }

    #[test]
    fn latitude_is_row_mean() {
        let grid = OrcaGrid::new(box_fields(), VerticalScaleFactor::TPoint).unwrap();
        assert_eq!(array![-10.0, 0.0, 10.0, 20.0], grid.latitude());
    }

    #[test]
    fn linear_interpolation_skips_land() {
        let grid = OrcaGrid::new(box_fields(), VerticalScaleFactor::TPoint).unwrap();

        let mut theta = Array3::zeros((3, 4, 3));
        for j in 0..4 {
            theta.index_axis_mut(Axis(1), j).fill(j as f64 + 1.0);
        }
        // below the sea floor at (k = 2, j = 1, i = 2)
        theta[[2, 1, 2]] = 100.0;

        let linear = grid.scalar_on_velocity(theta.view(), Interpolation::Linear);

        assert_abs_diff_eq!(linear[[0, 0, 1]], 1.5);
        assert_abs_diff_eq!(linear[[0, 3, 1]], 4.0);
        // land on both sides
        assert_abs_diff_eq!(linear[[0, 0, 0]], 0.0);
        // only the southern side is wet
        assert_abs_diff_eq!(linear[[2, 0, 2]], 1.0);

        let nearest = grid.scalar_on_velocity(theta.view(), Interpolation::Nearest);
        assert_eq!(theta, nearest);
    }

    #[test]
    fn rejects_bad_shapes() {
        let mut fields = box_fields();
        fields.e3t_0 = array![10.0, 20.0];
        assert!(OrcaGrid::new(fields, VerticalScaleFactor::TPoint).is_err());
    }
}
