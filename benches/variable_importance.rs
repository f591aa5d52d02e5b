use criterion::{criterion_group, criterion_main, Criterion};
use permimp::{
    Features, ImportanceOptions, MeanSquaredError, Predictor, Table,
};
use std::num::NonZeroUsize;

struct InteractionModel;

impl Predictor for InteractionModel {
    fn predict(&self, features: &Features<'_>) -> Vec<f64> {
        (0..features.rows_len())
            .map(|row| {
                let xs = features.row(row).collect::<Vec<_>>();
                xs[0] / 100.0 + (xs[1] - 0.5) * (xs[2] - 0.5)
            })
            .collect()
    }
}

fn synthetic_columns() -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut feature1 = Vec::new();
    let mut feature2 = Vec::new();
    let mut feature3 = Vec::new();
    let mut target = Vec::new();

    for _ in 0..1000 {
        let f1: f64 = rand::random();
        let f2: f64 = rand::random();
        let f3: f64 = rand::random();
        let t = f1 / 100.0 + (f2 - 0.5) * (f3 - 0.5);

        feature1.push(f1);
        feature2.push(f2);
        feature3.push(f3);
        target.push(t);
    }
    (feature1, feature2, feature3, target)
}

fn serial(c: &mut Criterion) {
    let (feature1, feature2, feature3, target) = synthetic_columns();
    let table = Table::new(
        vec![
            ("f1", &feature1[..]),
            ("f2", &feature2[..]),
            ("f3", &feature3[..]),
            ("t", &target[..]),
        ],
        "t",
    )
    .unwrap();

    c.bench_function("features=3, n=1000, repeats=8", |b| {
        b.iter(|| {
            ImportanceOptions::new()
                .seed(0)
                .repeats(NonZeroUsize::new(8).unwrap())
                .compute(&InteractionModel, &table, &MeanSquaredError, &[])
                .unwrap()
        })
    });
}

fn parallel(c: &mut Criterion) {
    let (feature1, feature2, feature3, target) = synthetic_columns();
    let table = Table::new(
        vec![
            ("f1", &feature1[..]),
            ("f2", &feature2[..]),
            ("f3", &feature3[..]),
            ("t", &target[..]),
        ],
        "t",
    )
    .unwrap();

    c.bench_function("features=3, n=1000, repeats=8, parallel", |b| {
        b.iter(|| {
            ImportanceOptions::new()
                .seed(0)
                .repeats(NonZeroUsize::new(8).unwrap())
                .parallel(true)
                .compute(&InteractionModel, &table, &MeanSquaredError, &[])
                .unwrap()
        })
    });
}

criterion_group!(benches, serial, parallel);
criterion_main!(benches);
