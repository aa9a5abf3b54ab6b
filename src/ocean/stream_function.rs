use {
    crate::{
        grid::{Integration, OceanGrid},
        ocean::transport::zonal_volume_transport,
    },
    anyhow::Result,
    ndarray::{s, Array2, ArrayView2, ArrayView3, Axis, Zip},
};

/// Meridional overturning stream function `psi[k, j]` (Sv) at the bottom
/// of each level.
///
/// Top-down, `psi[k]` is the northward transport above the bottom of level
/// `k`. Bottom-up, it is minus the transport below it. Both agree wherever
/// the net transport through the row vanishes. Levels without a single wet
/// velocity cell in the row lie below the sea floor and are zero.
pub fn stream_function<G: OceanGrid>(
    grid: &G,
    v: ArrayView3<f64>,
    basin: ArrayView2<f64>,
    integration: Integration,
) -> Result<Array2<f64>> {
    let transport = zonal_volume_transport(grid, v, basin)?;
    let (nz, ny) = transport.dim();

    let mask = grid.velocity_mask();
    let wet = Array2::from_shape_fn((nz, ny), |(k, j)| {
        (&mask.slice(s![k, j, ..]) * &basin.row(j)).sum()
    });

    let mut psi = Array2::<f64>::zeros((nz, ny));

    for (j, mut column) in psi.axis_iter_mut(Axis(1)).enumerate() {
        let transport = transport.index_axis(Axis(1), j);

        match integration {
            Integration::TopDown => {
                let mut acc = 0.0;
                for k in 0..nz {
                    acc += transport[k];
                    column[k] = acc;
                }
            }
            Integration::BottomUp => {
                let mut acc = 0.0;
                for k in (0..nz).rev() {
                    column[k] = -acc;
                    acc += transport[k];
                }
            }
        }
    }

    Zip::from(&mut psi).and(&wet).apply(|p, &w| {
        if w == 0.0 {
            *p = 0.0
        }
    });

    Ok(psi)
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{
            grid::orca::{test::box_fields, OrcaGrid},
            parameters::VerticalScaleFactor,
        },
        approx::assert_abs_diff_eq,
        ndarray::Array3,
    };

    /// Northward flow at the surface returning southward at depth, with no
    /// net transport through any row.
    fn overturning(grid: &OrcaGrid) -> Array3<f64> {
        let mut v = Array3::zeros((3, 4, 3));
        let dz = grid.velocity_thickness();
        let mask = grid.velocity_mask();

        for j in 0..4 {
            for i in 0..3 {
                let depth: f64 = (0..3).map(|k| dz[[k, j, i]] * mask[[k, j, i]]).sum();
                if depth == 0.0 {
                    continue;
                }
                v[[0, j, i]] = 0.3;
                // lower levels carry the surface flow back south
                let below = depth - dz[[0, j, i]];
                for k in 1..3 {
                    if mask[[k, j, i]] > 0.0 {
                        v[[k, j, i]] = -0.3 * dz[[0, j, i]] / below;
                    }
                }
            }
        }

        v
    }

    #[test]
    fn directions_agree_without_net_transport() {
        let grid = OrcaGrid::new(box_fields(), VerticalScaleFactor::TPoint).unwrap();
        let v = overturning(&grid);
        let basin = Array2::ones((4, 3));

        let top_down =
            stream_function(&grid, v.view(), basin.view(), Integration::TopDown).unwrap();
        let bottom_up =
            stream_function(&grid, v.view(), basin.view(), Integration::BottomUp).unwrap();

        assert_abs_diff_eq!(top_down, bottom_up, epsilon = 1.0E-12);

        // two wet columns, 0.3 m/s over the 10 m surface layer, 1000 m wide
        assert_abs_diff_eq!(
            top_down[[0, 1]],
            2.0 * 0.3 * 10.0 * 1000.0 / 1.0e6,
            epsilon = 1.0E-12
        );
        // the 70 m column still returns 2 m2/s below level 1, the 25 m
        // column has closed
        assert_abs_diff_eq!(top_down[[1, 1]], 2.0 * 1000.0 / 1.0e6, epsilon = 1.0E-12);
        assert_abs_diff_eq!(top_down[[2, 1]], 0.0, epsilon = 1.0E-12);
    }

    #[test]
    fn zero_below_sea_floor() {
        let grid = OrcaGrid::new(box_fields(), VerticalScaleFactor::TPoint).unwrap();
        let v = Array3::from_elem((3, 4, 3), 0.1);
        let mut basin = Array2::ones((4, 3));
        // keep only the shallow eastern column
        basin.index_axis_mut(Axis(1), 1).fill(0.0);

        let psi = stream_function(&grid, v.view(), basin.view(), Integration::TopDown).unwrap();

        // row 1: k = 2 is below the 2-level column
        assert_abs_diff_eq!(psi[[0, 1]], 0.1 * 10.0 * 1000.0 / 1.0e6, epsilon = 1.0E-12);
        assert_abs_diff_eq!(psi[[1, 1]], 0.1 * 25.0 * 1000.0 / 1.0e6, epsilon = 1.0E-12);
        assert_eq!(0.0, psi[[2, 1]]);
    }
}
