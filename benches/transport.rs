use {
    criterion::{criterion_group, criterion_main, Benchmark, Criterion},
    met::{
        atmosphere::{self, AtmosphereFields, HybridGrid},
        grid::{
            orca::{OrcaFields, OrcaGrid},
            Dimensions, Integration, Interpolation,
        },
        ocean,
        parameters::{Physical, VerticalScaleFactor},
    },
    ndarray::{Array1, Array2, Array3},
};

/// A flat-bottomed ORCA-like mesh with land along the western edge
fn orca(nx: usize, ny: usize, nz: usize) -> OrcaGrid {
    let dimensions = Dimensions { nx, ny, nz };
    let thickness = Array1::from_shape_fn(nz, |k| 10.0 + 5.0 * k as f64);
    let mut tops = Array1::zeros(nz);
    for k in 1..nz {
        tops[k] = tops[k - 1] + thickness[k - 1];
    }

    let mbathy = Array2::from_shape_fn((ny, nx), |(_, i)| if i == 0 { 0 } else { nz });
    let mut tmask = Array3::zeros((nz, ny, nx));
    for ((j, i), &levels) in mbathy.indexed_iter() {
        for k in 0..levels {
            tmask[[k, j, i]] = 1.0;
        }
    }

    let fields = OrcaFields {
        dimensions,
        e1t: Array2::from_elem((ny, nx), 50_000.0),
        e2t: Array2::from_elem((ny, nx), 50_000.0),
        e1v: Array2::from_elem((ny, nx), 50_000.0),
        gphiv: Array2::from_shape_fn((ny, nx), |(j, _)| -80.0 + 160.0 * j as f64 / ny as f64),
        e3t_0: thickness.clone(),
        gdepw_0: tops,
        e3t_ps: Array2::from_elem((ny, nx), thickness[nz - 1] / 2.0),
        mbathy,
        vmask: tmask.clone(),
        tmask,
    };

    OrcaGrid::new(fields, VerticalScaleFactor::TPoint).unwrap()
}

fn hybrid(nlev: usize, nlat: usize, nlon: usize) -> HybridGrid {
    let a = Array1::from_shape_fn(nlev + 1, |k| {
        let s = k as f64 / nlev as f64;
        20_000.0 * s * (1.0 - s)
    });
    let b = Array1::from_shape_fn(nlev + 1, |k| (k as f64 / nlev as f64).powi(2));
    let latitude = Array1::from_shape_fn(nlat, |j| 90.0 - 180.0 * j as f64 / (nlat - 1) as f64);

    HybridGrid::new(a, b, latitude, Array2::zeros((nlat, nlon))).unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench(
        "ocean",
        Benchmark::new("meridional_energy_transport", |b| {
            let grid = orca(180, 150, 30);
            let physical = Physical::default();
            let v = Array3::from_elem((30, 150, 180), 0.05);
            let theta = Array3::from_shape_fn((30, 150, 180), |(k, _, _)| 20.0 - 0.5 * k as f64);
            let basin = Array2::ones((150, 180));

            b.iter(|| {
                ocean::meridional_energy_transport(
                    &grid,
                    v.view(),
                    theta.view(),
                    basin.view(),
                    &physical,
                    Interpolation::Linear,
                )
            })
        })
        .sample_size(10),
    );
    c.bench(
        "ocean",
        Benchmark::new("stream_function", |b| {
            let grid = orca(180, 150, 30);
            let v = Array3::from_shape_fn((30, 150, 180), |(k, _, _)| 0.1 - 0.01 * k as f64);
            let basin = Array2::ones((150, 180));

            b.iter(|| ocean::stream_function(&grid, v.view(), basin.view(), Integration::TopDown))
        })
        .sample_size(10),
    );
    c.bench(
        "atmosphere",
        Benchmark::new("meridional_energy_transport", |b| {
            let grid = hybrid(37, 73, 144);
            let physical = Physical::default();
            let fields = AtmosphereFields {
                ps: Array2::from_elem((73, 144), 100_000.0),
                t: Array3::from_elem((37, 73, 144), 250.0),
                q: Array3::from_elem((37, 73, 144), 0.002),
                u: Array3::from_elem((37, 73, 144), 10.0),
                v: Array3::from_elem((37, 73, 144), 1.0),
            };
            let correction = atmosphere::MassCorrection::default();

            b.iter(|| {
                atmosphere::meridional_energy_transport(
                    &grid,
                    &fields,
                    &physical,
                    Some(&correction),
                )
            })
        })
        .sample_size(10),
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
