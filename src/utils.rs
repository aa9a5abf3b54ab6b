use {
    anyhow::{ensure, Result},
    ndarray::{Array1, ArrayView2},
};

pub fn check_shape(name: &str, actual: &[usize], expected: &[usize]) -> Result<()> {
    ensure!(
        actual == expected,
        "{} has shape {:?}, expected {:?}",
        name,
        actual,
        expected
    );
    Ok(())
}

/// Sums a `[j, i]` field along `i`
pub fn zonal_sum(field: ArrayView2<f64>) -> Array1<f64> {
    field.outer_iter().map(|row| row.sum()).collect()
}

#[cfg(test)]
pub(crate) fn assert_approx_eq_slice(a: &[f64], b: &[f64], epsilon: f64) {
    assert_eq!(a.len(), b.len());
    for (i, e) in a.iter().enumerate() {
        approx::assert_abs_diff_eq!(*e, b[i], epsilon = epsilon);
    }
}
