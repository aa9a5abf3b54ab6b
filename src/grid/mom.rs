//! MOM5 Arakawa B-grid, as used by SODA3.
//!
//! U and V share the north-east corner of each T cell, so `v[k, j, i]` is
//! surrounded by `T[k, j..=j + 1, i..=i + 1]`. Columns wrap around zonally
//! and the northernmost row of velocity points is closed.

use {
    crate::{
        grid::{Dimensions, Interpolation, OceanGrid},
        partial_cell::{depth_adjustment_from_bathymetry, effective_thickness},
        utils::check_shape,
    },
    anyhow::{ensure, Result},
    log::debug,
    ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis},
    rayon::prelude::*,
};

#[derive(Debug, Clone)]
pub struct MomFields {
    pub dimensions: Dimensions,
    /// Zonal width of T cells
    pub dxt: Array2<f64>,
    /// Meridional width of T cells
    pub dyt: Array2<f64>,
    /// Zonal width of U cells
    pub dxu: Array2<f64>,
    /// Nominal latitude of U rows
    pub yu_ocean: Array1<f64>,
    /// Depth of the bottom of each nominal layer
    pub sw_ocean: Array1<f64>,
    /// Number of wet T levels per column
    pub kmt: Array2<usize>,
    /// Depth of the sea floor at T points
    pub ht: Array2<f64>,
}

#[derive(Debug, Clone)]
pub struct MomGrid {
    fields: MomFields,
    layer_tops: Array1<f64>,
    kmu: Array2<usize>,
    tmask: Array3<f64>,
    umask: Array3<f64>,
    dzt: Array3<f64>,
    dzu: Array3<f64>,
    area: Array2<f64>,
}

impl MomGrid {
    pub fn new(fields: MomFields) -> Result<Self> {
        let dims = fields.dimensions;
        let horizontal = [dims.ny, dims.nx];

        check_shape("dxt", fields.dxt.shape(), &horizontal)?;
        check_shape("dyt", fields.dyt.shape(), &horizontal)?;
        check_shape("dxu", fields.dxu.shape(), &horizontal)?;
        check_shape("kmt", fields.kmt.shape(), &horizontal)?;
        check_shape("ht", fields.ht.shape(), &horizontal)?;
        check_shape("yu_ocean", fields.yu_ocean.shape(), &[dims.ny])?;
        check_shape("sw_ocean", fields.sw_ocean.shape(), &[dims.nz])?;

        ensure!(
            fields
                .sw_ocean
                .iter()
                .zip(fields.sw_ocean.iter().skip(1))
                .all(|(upper, lower)| lower > upper),
            "sw_ocean must increase with depth"
        );

        debug!("Building MOM grid {:?}", dims);

        let mut layer_tops = Array1::zeros(dims.nz);
        for k in 1..dims.nz {
            layer_tops[k] = fields.sw_ocean[k - 1];
        }
        let dz = &fields.sw_ocean - &layer_tops;

        let kmu = corner_min(&fields.kmt, 0);
        let hu = corner_min(&fields.ht, 0.0);

        let tmask = level_mask(&fields.kmt, dims.nz);
        let umask = level_mask(&kmu, dims.nz);

        let t_adjust = depth_adjustment_from_bathymetry(
            fields.sw_ocean.view(),
            fields.kmt.view(),
            fields.ht.view(),
        );
        let u_adjust =
            depth_adjustment_from_bathymetry(fields.sw_ocean.view(), kmu.view(), hu.view());

        let dzt = effective_thickness(dz.view(), t_adjust.view());
        let dzu = effective_thickness(dz.view(), u_adjust.view());

        let area = &fields.dxt * &fields.dyt;

        Ok(MomGrid {
            fields,
            layer_tops,
            kmu,
            tmask,
            umask,
            dzt,
            dzu,
            area,
        })
    }

    /// Number of wet velocity levels per column
    pub fn kmu(&self) -> ArrayView2<usize> {
        self.kmu.view()
    }
}

/// Minimum over the four T cells around each velocity point. The northern
/// row has no cells beyond it and takes `closed`.
fn corner_min<T: Copy + PartialOrd>(t: &Array2<T>, closed: T) -> Array2<T> {
    let (ny, nx) = t.dim();
    let mut out = Array2::from_elem((ny, nx), closed);

    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx {
            let east = (i + 1) % nx;
            out[[j, i]] = [t[[j, east]], t[[j + 1, i]], t[[j + 1, east]]]
                .iter()
                .fold(t[[j, i]], |m, &x| if x < m { x } else { m });
        }
    }

    out
}

fn level_mask(levels: &Array2<usize>, nz: usize) -> Array3<f64> {
    let (ny, nx) = levels.dim();
    Array3::from_shape_fn((nz, ny, nx), |(k, j, i)| {
        if k < levels[[j, i]] {
            1.0
        } else {
            0.0
        }
    })
}

impl OceanGrid for MomGrid {
    fn dimensions(&self) -> Dimensions {
        self.fields.dimensions
    }

    fn latitude(&self) -> ArrayView1<f64> {
        self.fields.yu_ocean.view()
    }

    fn velocity_mask(&self) -> ArrayView3<f64> {
        self.umask.view()
    }

    fn tracer_mask(&self) -> ArrayView3<f64> {
        self.tmask.view()
    }

    fn zonal_width(&self) -> ArrayView2<f64> {
        self.fields.dxu.view()
    }

    fn velocity_thickness(&self) -> ArrayView3<f64> {
        self.dzu.view()
    }

    fn tracer_thickness(&self) -> ArrayView3<f64> {
        self.dzt.view()
    }

    fn tracer_area(&self) -> ArrayView2<f64> {
        self.area.view()
    }

    fn layer_tops(&self) -> ArrayView1<f64> {
        self.layer_tops.view()
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

        let (_, ny, nx) = field.dim();
        let tmask = &self.tmask;

        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(k, mut level)| {
                let mask = tmask.index_axis(Axis(0), k);
                let field = field.index_axis(Axis(0), k);

                for j in 0..ny {
                    for i in 0..nx {
                        let east = (i + 1) % nx;
                        let corners = [(j, i), (j, east), (j + 1, i), (j + 1, east)];
                        let count = if j + 1 < ny { 4 } else { 2 };

                        let (sum, weight) = corners[..count]
                            .iter()
                            .filter(|&&c| mask[c] > 0.0)
                            .fold((0.0, 0.0), |(s, w), &c| (s + field[c], w + 1.0));

                        level[[j, i]] = if weight > 0.0 { sum / weight } else { 0.0 };
                    }
                }
            });

        out
    }
}

#[cfg(test)]
pub(crate) mod test {
    use {super::*, approx::assert_abs_diff_eq, ndarray::array};

    /// Four columns by three rows, layers 10, 20 and 40 m thick. Column 3
    /// is land, column 2 is 50 m deep.
    pub(crate) fn box_fields() -> MomFields {
        let dimensions = Dimensions {
            nx: 4,
            ny: 3,
            nz: 3,
        };

        MomFields {
            dimensions,
            dxt: Array2::from_elem(dimensions.horizontal(), 2000.0),
            dyt: Array2::from_elem(dimensions.horizontal(), 1000.0),
            dxu: Array2::from_elem(dimensions.horizontal(), 2000.0),
            yu_ocean: array![-5.0, 0.0, 5.0],
            sw_ocean: array![10.0, 30.0, 70.0],
            kmt: array![[3, 3, 3, 0], [3, 3, 3, 0], [3, 3, 3, 0]],
            ht: array![
                [70.0, 70.0, 50.0, 0.0],
                [70.0, 70.0, 50.0, 0.0],
                [70.0, 70.0, 50.0, 0.0]
            ],
        }
    }

    #[test]
    fn velocity_levels_follow_shallowest_corner() {
        let grid = MomGrid::new(box_fields()).unwrap();

        insta::assert_debug_snapshot!(grid.kmu().outer_iter().map(|r| r.to_vec()).collect::<Vec<_>>(), @r###"
        [
            [
                3,
                3,
                0,
                0,
            ],
            [
                3,
                3,
                0,
                0,
            ],
            [
                0,
                0,
                0,
                0,
            ],
        ]
        "###);
    }

    #[test]
    fn partial_bottom_cells() {
        let grid = MomGrid::new(box_fields()).unwrap();

        assert_eq!(array![0.0, 10.0, 30.0], grid.layer_tops());
        assert_abs_diff_eq!(grid.tracer_thickness()[[2, 0, 2]], 20.0);
        assert_abs_diff_eq!(grid.tracer_thickness()[[2, 0, 1]], 40.0);
        assert_abs_diff_eq!(grid.velocity_thickness()[[2, 0, 0]], 40.0);
        // shares a corner with the 50 m column
        assert_abs_diff_eq!(grid.velocity_thickness()[[2, 0, 1]], 20.0);
        assert_abs_diff_eq!(grid.velocity_thickness()[[1, 0, 0]], 20.0);
    }

    #[test]
    fn corner_average() {
        let grid = MomGrid::new(box_fields()).unwrap();

        let theta = Array3::from_shape_fn((3, 3, 4), |(_, j, i)| (10 * j + i) as f64);
        let on_u = grid.scalar_on_velocity(theta.view(), Interpolation::Linear);

        // mean of 0, 1, 10, 11
        assert_abs_diff_eq!(on_u[[0, 0, 0]], 5.5);
        // land at column 3 is left out: mean of 2, 12
        assert_abs_diff_eq!(on_u[[0, 0, 2]], 7.0);
        // wraps around to column 0: mean of 0, 10
        assert_abs_diff_eq!(on_u[[0, 0, 3]], 5.0);
        // closed northern row: mean of 20, 21
        assert_abs_diff_eq!(on_u[[0, 2, 0]], 20.5);
    }

    #[test]
    fn nearest_keeps_southwest_tracer() {
        let grid = MomGrid::new(box_fields()).unwrap();

        let theta = Array3::from_shape_fn((3, 3, 4), |(k, j, i)| (100 * k + 10 * j + i) as f64);
        let on_u = grid.scalar_on_velocity(theta.view(), Interpolation::Nearest);

        assert_eq!(theta, on_u);
        assert_abs_diff_eq!(on_u[[1, 1, 2]], 112.0);
    }

    #[test]
    fn layer_bottoms_must_deepen() {
        let mut fields = box_fields();
        fields.sw_ocean = array![10.0, 5.0, 70.0];
        assert!(MomGrid::new(fields).is_err());
    }
}
