//! Classic three-term recurrence coefficient tables.
//!
//! The associated Legendre functions for fixed order m satisfy
//!
//! y_l(x) = a_lm · x · y_{l-1}(x) + b_lm · y_{l-2}(x)
//!
//! with a_lm = sqrt((4l²-1)/(l²-m²)) and
//! b_lm = -sqrt((2l+1)((l-1)²-m²) / ((2l-3)(l²-m²))), seeded at l = m by
//! y_mm(x) = a_mm (sin θ)^m. The tables store two doubles per (l, m) mode:
//! the pair (a_lm, b_lm), with the seed constant a_mm in the first slot of
//! each order block.
//!
//! A per-degree scale factor `scale[l]` folds the normalization convention
//! into the coefficients (ratios of consecutive scales), so the engine
//! walks the same recurrence for every convention.

use crate::types::LmLayout;
use std::f64::consts::PI;

/// Seed constant a_mm for the orthonormal convention:
/// a_mm = sqrt( (1/4π) · Π_{k=1..m} (2k+1)/(2k) ),
/// optionally carrying the Condon-Shortley phase (-1)^m.
pub fn seed_amm(m: usize, cs_phase: bool) -> f64 {
    let mut prod = 1.0 / (4.0 * PI);
    for k in 1..=m {
        prod *= (2 * k + 1) as f64 / (2 * k) as f64;
    }
    let amm = prod.sqrt();
    if cs_phase && m % 2 == 1 {
        -amm
    } else {
        amm
    }
}

/// Build a recurrence coefficient table for basis functions scaled per
/// degree by `scale[l]`.
///
/// The table covers degrees `m..=layout.lmax()` for every stored order.
/// `scale` must have at least `layout.lmax() + 1` entries. Layout offsets
/// follow [`LmLayout::alm_index`].
pub fn build_alm(layout: &LmLayout, scale: &[f64], cs_phase: bool) -> Vec<f64> {
    let lmax = layout.lmax();
    assert!(scale.len() > lmax, "need a scale factor for every degree");

    let mut alm = vec![0.0; layout.alm_len()];
    for m in layout.orders() {
        let base = layout.alm_index(m);
        alm[base] = seed_amm(m, cs_phase) * scale[m];
        if lmax > m {
            alm[base + 2] = ((2 * m + 3) as f64).sqrt() * scale[m + 1] / scale[m];
        }
        for l in (m + 2)..=lmax {
            let j = l - m;
            let l2 = (l * l) as f64;
            let m2 = (m * m) as f64;
            let lm12 = ((l - 1) * (l - 1)) as f64;
            let a = ((4.0 * l2 - 1.0) / (l2 - m2)).sqrt();
            let b = -(((2 * l + 1) as f64 * (lm12 - m2))
                / ((2 * l - 3) as f64 * (l2 - m2)))
                .sqrt();
            alm[base + 2 * j] = a * scale[l] / scale[l - 1];
            alm[base + 2 * j + 1] = b * scale[l] / scale[l - 2];
        }
    }
    alm
}
