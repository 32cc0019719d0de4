//! Associated Legendre recurrence engine, classic three-term scheme.
//!
//! For a fixed order m the engine walks
//!
//! y_l = a_lm · x · y_{l-1} + b_lm · y_{l-2},   y_mm = a_mm (sin θ)^m
//!
//! over a precomputed coefficient block (see `tables::build_alm`). At high
//! order the seed (sin θ)^m underflows double precision long before the
//! values become significant, so intermediates carry an extended-range
//! exponent: the true value is `y · SHT_SCALE_FACTOR^ny` with `ny <= 0`.
//! While `ny < 0` the stored value of a degree is either exactly zero
//! (polar optimization: the contribution is below `SHT_ACCURACY`) or the
//! explicitly rescaled tiny value when the optimization is disabled.

/// Scale factor for extended-range intermediates in long recurrences.
pub const SHT_SCALE_FACTOR: f64 = 2.9073548971824275622e135;

/// Accuracy floor below which a scaled recurrence value may be treated as
/// negligible (polar optimization).
pub const SHT_ACCURACY: f64 = 1.0e-20;

/// Degree beyond which seeds can underflow the double range and the
/// extended-range walk becomes active in practice.
pub const SHT_L_RESCALE: usize = 1000;

const SCALE_M1: f64 = 1.0 / SHT_SCALE_FACTOR;
const RESCALE_UP: f64 = SHT_ACCURACY * SHT_SCALE_FACTOR;

/// Compute (sin θ)^m as a scaled pair `(y, ny)` with
/// `(sin θ)^m = y · SHT_SCALE_FACTOR^ny` and `ny <= 0`, by
/// square-and-multiply with explicit rescaling.
pub(crate) fn sint_pow(st: f64, m: usize) -> (f64, i64) {
    debug_assert!((0.0..=1.0).contains(&st));
    let mut y = 1.0_f64;
    let mut ny = 0_i64;
    let mut p = st;
    let mut np = 0_i64;
    let mut k = m;
    while k > 0 {
        if k & 1 == 1 {
            y *= p;
            ny += np;
            if y < SCALE_M1 {
                y *= SHT_SCALE_FACTOR;
                ny -= 1;
            }
        }
        k >>= 1;
        if k > 0 {
            p *= p;
            np *= 2;
            if p < SCALE_M1 {
                p *= SHT_SCALE_FACTOR;
                np -= 1;
            }
        }
    }
    (y, ny)
}

/// Value emitted for a degree whose state is `(y, ny)`.
#[inline]
fn emit(y: f64, ny: i64, skip_small: bool) -> f64 {
    if ny == 0 {
        y
    } else if skip_small || ny < -1 {
        // Either the polar optimization discards it, or the true value
        // underflows double precision anyway.
        0.0
    } else {
        y * SCALE_M1
    }
}

/// Fill `out[l - m]` with the associated Legendre function values
/// y_lm(cos θ) for degrees `l = m..=llim` at a single grid point.
///
/// # Arguments
/// * `alm` - Order-m coefficient block (from `tables::build_alm`)
/// * `m`, `llim` - Order and degree truncation, `m <= llim`
/// * `ct`, `st` - cos θ and sin θ at the point
/// * `skip_small` - When true, degrees whose scaled magnitude is below
///   `SHT_ACCURACY` are emitted as exact zeros (polar optimization);
///   when false the full recurrence values are emitted.
/// * `out` - Output, at least `llim - m + 1` entries
pub fn legendre_values(
    alm: &[f64],
    m: usize,
    llim: usize,
    ct: f64,
    st: f64,
    skip_small: bool,
    out: &mut [f64],
) {
    debug_assert!(m <= llim);
    debug_assert!(out.len() > llim - m);
    debug_assert!(llim == m || alm.len() >= 2 * (llim - m) + 2);

    let (mut y0, mut ny) = sint_pow(st, m);
    y0 *= alm[0];
    out[0] = emit(y0, ny, skip_small);
    if llim == m {
        return;
    }

    let mut y1 = alm[2] * ct * y0;
    out[1] = emit(y1, ny, skip_small);

    let mut j = 2;
    // Extended-range walk: recover the exponent before emitting full values.
    while ny < 0 && j <= llim - m {
        let ynew = alm[2 * j] * ct * y1 + alm[2 * j + 1] * y0;
        y0 = y1;
        y1 = ynew;
        if y1.abs() > RESCALE_UP {
            y0 *= SCALE_M1;
            y1 *= SCALE_M1;
            ny += 1;
        }
        out[j] = emit(y1, ny, skip_small);
        j += 1;
    }
    // Plain walk once values are in range.
    while j <= llim - m {
        let ynew = alm[2 * j] * ct * y1 + alm[2 * j + 1] * y0;
        y0 = y1;
        y1 = ynew;
        out[j] = y1;
        j += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::build_alm;
    use crate::types::LmLayout;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn ortho_alm(lmax: usize, mmax: usize) -> (LmLayout, Vec<f64>) {
        let layout = LmLayout::new(lmax, mmax, 1);
        let scale = vec![1.0; lmax + 2];
        let alm = build_alm(&layout, &scale, false);
        (layout, alm)
    }

    #[test]
    fn test_low_degree_values() {
        let (layout, alm) = ortho_alm(3, 3);
        let x: f64 = 0.43;
        let st = (1.0 - x * x).sqrt();

        let mut out = [0.0; 4];
        legendre_values(&alm[layout.alm_index(0)..], 0, 3, x, st, true, &mut out);
        assert_relative_eq!(out[0], (1.0 / (4.0 * PI)).sqrt(), epsilon = 1e-14);
        assert_relative_eq!(out[1], (3.0 / (4.0 * PI)).sqrt() * x, epsilon = 1e-14);
        assert_relative_eq!(
            out[2],
            (5.0 / (4.0 * PI)).sqrt() * (3.0 * x * x - 1.0) / 2.0,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            out[3],
            (7.0 / (4.0 * PI)).sqrt() * (5.0 * x * x * x - 3.0 * x) / 2.0,
            epsilon = 1e-13
        );

        // m = 1: y_11 = sqrt(3/8π) sinθ, y_21 = sqrt(15/8π) x sinθ
        let mut out = [0.0; 3];
        legendre_values(&alm[layout.alm_index(1)..], 1, 3, x, st, true, &mut out);
        assert_relative_eq!(out[0], (3.0 / (8.0 * PI)).sqrt() * st, epsilon = 1e-14);
        assert_relative_eq!(out[1], (15.0 / (8.0 * PI)).sqrt() * x * st, epsilon = 1e-14);
    }

    #[test]
    fn test_pole_point_high_order_is_zero() {
        let (layout, alm) = ortho_alm(8, 8);
        let mut out = [1.0; 6];
        legendre_values(&alm[layout.alm_index(3)..], 3, 8, 1.0, 0.0, true, &mut out);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_sint_pow_moderate() {
        let (y, ny) = sint_pow(0.5, 10);
        assert_eq!(ny, 0);
        assert_relative_eq!(y, 0.5_f64.powi(10), epsilon = 1e-15);
    }

    #[test]
    fn test_sint_pow_extended_range() {
        // 0.01^400 = 1e-800 is far below double range.
        let (y, ny) = sint_pow(0.01, 400);
        assert!(ny < 0);
        // log10 of the true value: ny*log10(SCALE) + log10(y) = -800
        let log10 = ny as f64 * SHT_SCALE_FACTOR.log10() + y.log10();
        assert_relative_eq!(log10, -800.0, epsilon = 1e-9);
    }

    #[test]
    fn test_orthonormality_by_quadrature() {
        // sum_i w_i y_lm(x_i)^2 = 1/(2π) for an exact quadrature.
        use crate::polynomial::{gauss_legendre_nodes, gauss_legendre_weights};
        let lmax = 24;
        let (layout, alm) = ortho_alm(lmax, lmax);
        let n = lmax + 2;
        let nodes = gauss_legendre_nodes(n);
        let weights = gauss_legendre_weights(n, &nodes);

        for m in [0usize, 1, 5, 24] {
            let blk = &alm[layout.alm_index(m)..];
            let mut vals = vec![0.0; lmax - m + 1];
            let mut norms = vec![0.0; lmax - m + 1];
            for (&x, &w) in nodes.iter().zip(weights.iter()) {
                let st = (1.0 - x * x).sqrt();
                legendre_values(blk, m, lmax, x, st, true, &mut vals);
                for (nrm, &v) in norms.iter_mut().zip(vals.iter()) {
                    *nrm += w * v * v;
                }
            }
            for nrm in &norms {
                assert_relative_eq!(*nrm, 1.0 / (2.0 * PI), epsilon = 1e-11, max_relative = 1e-11);
            }
        }
    }

    #[test]
    fn test_high_degree_no_overflow() {
        // Past the rescale threshold the walk must stay finite.
        let lmax = 2 * SHT_L_RESCALE;
        let layout = LmLayout::new(lmax, 0, 1);
        let scale = vec![1.0; lmax + 2];
        let alm = build_alm(&layout, &scale, false);
        let x: f64 = 0.123456;
        let st = (1.0 - x * x).sqrt();
        let mut out = vec![0.0; lmax + 1];
        legendre_values(&alm, 0, lmax, x, st, true, &mut out);
        assert!(out.iter().all(|v| v.is_finite()));
        // Values oscillate with an l^{-1/4}-ish envelope; none should be huge.
        assert!(out.iter().all(|v| v.abs() < 10.0));
    }
}
