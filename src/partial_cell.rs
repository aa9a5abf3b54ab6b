//! Partial bottom cells.
//!
//! Both ocean grids describe the sea floor with a nominal set of layers and
//! a bottom layer that is only partly filled. The adjustment arrays built
//! here hold, at the bottom wet level of each column, how much of the
//! nominal layer lies below the sea floor. Every other level is zero.

use {
    log::warn,
    ndarray::{Array3, ArrayView1, ArrayView2, ArrayView3, Axis},
};

/// Index of the deepest wet level of a column holding `levels` wet levels
pub fn bottom_level(levels: usize) -> Option<usize> {
    levels.checked_sub(1)
}

/// ORCA adjustment from the nominal thickness `e3t_0[k]`, the number of wet
/// levels `mbathy[j, i]` and the bottom cell thickness `e3t_ps[j, i]`.
pub fn depth_adjustment(
    e3t_0: ArrayView1<f64>,
    mbathy: ArrayView2<usize>,
    e3t_ps: ArrayView2<f64>,
) -> Array3<f64> {
    let nz = e3t_0.len();
    let (ny, nx) = mbathy.dim();

    let mut adjust = Array3::<f64>::zeros((nz, ny, nx));

    for ((j, i), &levels) in mbathy.indexed_iter() {
        if let Some(k) = bottom_level(levels.min(nz)) {
            adjust[[k, j, i]] = e3t_0[k] - e3t_ps[[j, i]];
        }
    }

    report_negative(&adjust);

    adjust
}

/// MOM5 adjustment from the depth of each nominal layer bottom, the number
/// of wet levels `kmt[j, i]` and the true depth `ht[j, i]`.
pub fn depth_adjustment_from_bathymetry(
    layer_bottoms: ArrayView1<f64>,
    kmt: ArrayView2<usize>,
    ht: ArrayView2<f64>,
) -> Array3<f64> {
    let nz = layer_bottoms.len();
    let (ny, nx) = kmt.dim();

    let mut adjust = Array3::<f64>::zeros((nz, ny, nx));

    for ((j, i), &levels) in kmt.indexed_iter() {
        if let Some(k) = bottom_level(levels.min(nz)) {
            adjust[[k, j, i]] = layer_bottoms[k] - ht[[j, i]];
        }
    }

    report_negative(&adjust);

    adjust
}

/// Nominal thickness minus the adjustment, per cell
pub fn effective_thickness(nominal: ArrayView1<f64>, adjust: ArrayView3<f64>) -> Array3<f64> {
    let mut thickness = adjust.to_owned();

    for (k, mut level) in thickness.axis_iter_mut(Axis(0)).enumerate() {
        let dz = nominal[k];
        level.mapv_inplace(|a| dz - a);
    }

    thickness
}

fn report_negative(adjust: &Array3<f64>) {
    let count = adjust.iter().filter(|&&a| a < 0.0).count();
    if count > 0 {
        warn!(
            "{} bottom cells are thicker than their nominal layer, keeping them as is",
            count
        );
    }
}
