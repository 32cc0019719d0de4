//! Benchmarks for the Legendre recurrence engines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use num_complex::Complex64;
use sht_rs::{legendre_values, RecurrenceScheme, ShtConfig, ShtParams};

fn bench_legendre_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("legendre_values");
    for &lmax in &[63usize, 255, 1023] {
        let cfg = ShtConfig::new(ShtParams::new(lmax, lmax, 1, lmax + 2 + (lmax % 2))).unwrap();
        let mut out = vec![0.0; lmax + 1];
        let i = cfg.grid.nlat_2 / 2;
        let (ct, st) = (cfg.grid.ct[i], cfg.grid.st[i]);

        group.bench_with_input(BenchmarkId::new("m0", lmax), &lmax, |b, _| {
            b.iter(|| {
                legendre_values(
                    cfg.alm_block(0),
                    0,
                    lmax,
                    black_box(ct),
                    black_box(st),
                    true,
                    &mut out,
                );
            })
        });

        let m = lmax / 2;
        group.bench_with_input(BenchmarkId::new("m_half", lmax), &lmax, |b, _| {
            b.iter(|| {
                legendre_values(
                    cfg.alm_block(m),
                    m,
                    lmax,
                    black_box(ct),
                    black_box(st),
                    true,
                    &mut out[..lmax - m + 1],
                );
            })
        });
    }
    group.finish();
}

fn bench_synth_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth_step");
    let lmax = 255;
    for scheme in [RecurrenceScheme::Classic, RecurrenceScheme::Ishioka] {
        let mut p = ShtParams::new(lmax, lmax, 1, lmax + 3);
        p.scheme = scheme;
        let cfg = ShtConfig::new(p).unwrap();
        let ql = vec![Complex64::new(0.3, -0.1); lmax + 1];
        let n2 = cfg.grid.nlat_2;
        let mut f_n = vec![Complex64::new(0.0, 0.0); n2];
        let mut f_s = f_n.clone();

        group.bench_function(BenchmarkId::new(format!("{:?}", scheme), lmax), |b| {
            b.iter(|| {
                sht_rs::synth_step(&cfg, 0, lmax, black_box(&ql), &mut f_n, &mut f_s);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_legendre_values, bench_synth_step);
criterion_main!(benches);
