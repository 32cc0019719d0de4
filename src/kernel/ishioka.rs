//! Ishioka-basis engine: stable two-term recurrence and the coefficient
//! pre/post processors around it.
//!
//! For fixed order m the auxiliary functions
//!
//! ψ_k(x) = g_k(cos²θ) · (sin θ)^m
//!
//! are walked with the two-term recurrence
//!
//! g_{k+1}(t) = (c_{2k}·t + c_{2k+1})·g_k(t) + g_{k-1}(t),   t = cos²θ,
//!
//! one step per two degrees, which halves the recurrence length compared
//! to the classic scheme and avoids its error accumulation at high degree.
//! Even degrees are bidiagonal combinations of the ψ_k, odd degrees
//! diagonal combinations of x·ψ_k; the `xlm` table stores the three
//! coefficients per pair of degrees that express this basis change:
//!
//! - `xlm[3k]`   couples SH degree m+2k   into chain slot k,
//! - `xlm[3k+1]` couples SH degree m+2k+2 into chain slot k,
//! - `xlm[3k+2]` scales  SH degree m+2k+1 into chain slot k.
//!
//! Three coefficient maps are provided:
//! - `sh_to_ishioka` (pre-processing, direct bidiagonal application);
//! - `ishioka_to_sh` (exact left-inverse of the pre-processing, by
//!   back-substitution over the even chain);
//! - `ishioka_collect_sh` (adjoint form, folding raw chain projections
//!   into SH coefficients: the analysis-side post-processing).
//!
//! All maps have paired variants operating on the interleaved (V, W)
//! buffer, and in-place forms; read-before-write ordering makes the
//! in-place forms safe.

use super::recurrence::{SHT_ACCURACY, SHT_SCALE_FACTOR};
use num_complex::Complex64;

const SCALE_M1: f64 = 1.0 / SHT_SCALE_FACTOR;
const RESCALE_UP: f64 = SHT_ACCURACY * SHT_SCALE_FACTOR;

/// Fill `out[k]` with the auxiliary values ψ_k = g_k(cos²θ)·(sin θ)^m for
/// `k = 0..=kmax` at a single grid point.
///
/// `clm` is the order-m block built by `tables::build_clm`: the seed
/// constant followed by coefficient pairs. Extended-range handling is the
/// same as the classic engine's.
pub fn ishioka_aux_values(
    clm: &[f64],
    m: usize,
    kmax: usize,
    ct: f64,
    st: f64,
    skip_small: bool,
    out: &mut [f64],
) {
    debug_assert!(out.len() > kmax);
    debug_assert!(clm.len() >= 2 * kmax + 1);

    let t = ct * ct;
    let (mut y0, mut ny) = super::recurrence::sint_pow(st, m);
    y0 *= clm[0];

    let store = |y: f64, ny: i64| -> f64 {
        if ny == 0 {
            y
        } else if skip_small || ny < -1 {
            0.0
        } else {
            y * SCALE_M1
        }
    };

    out[0] = store(y0, ny);
    if kmax == 0 {
        return;
    }

    let mut y1 = (clm[1] * t + clm[2]) * y0;
    out[1] = store(y1, ny);

    let mut k = 2;
    while ny < 0 && k <= kmax {
        let ynew = (clm[2 * k - 1] * t + clm[2 * k]) * y1 + y0;
        y0 = y1;
        y1 = ynew;
        if y1.abs() > RESCALE_UP {
            y0 *= SCALE_M1;
            y1 *= SCALE_M1;
            ny += 1;
        }
        out[k] = store(y1, ny);
        k += 1;
    }
    while k <= kmax {
        let ynew = (clm[2 * k - 1] * t + clm[2 * k]) * y1 + y0;
        y0 = y1;
        y1 = ynew;
        out[k] = y1;
        k += 1;
    }
}

// ---------------------------------------------------------------------------
// Pre-processing: SH coefficients -> Ishioka chain coefficients
// ---------------------------------------------------------------------------

/// Map SH coefficients `q_in[0..=llim_m]` (relative degrees for a fixed
/// order) into the Ishioka chain basis.
///
/// Writes `out[0..=llim_m+1]`: the entry one past `llim_m` is the ghost
/// slot of the top pair and is zero-filled when unused. Buffers must hold
/// `llim_m + 2` entries.
pub fn sh_to_ishioka(xlm: &[f64], q_in: &[Complex64], out: &mut [Complex64], llim_m: usize) {
    debug_assert!(q_in.len() > llim_m);
    debug_assert!(out.len() >= llim_m + 2);

    let mut l = 0usize;
    let mut ll = 0usize;
    let mut qq = q_in[0] * xlm[0];
    while l + 1 < llim_m {
        let qq2 = q_in[l + 2];
        out[l] = qq + qq2 * xlm[ll + 1];
        out[l + 1] = q_in[l + 1] * xlm[ll + 2];
        ll += 3;
        l += 2;
        qq = qq2 * xlm[ll];
    }
    out[l] = qq;
    let mut q_top = Complex64::new(0.0, 0.0);
    if l < llim_m {
        q_top = q_in[l + 1] * xlm[ll + 2];
    }
    out[l + 1] = q_top;
}

/// In-place form of [`sh_to_ishioka`]; `q[0..=llim_m]` is replaced by its
/// chain-basis image, and `q[llim_m + 1]` is written (ghost slot).
pub fn sh_to_ishioka_in_place(xlm: &[f64], q: &mut [Complex64], llim_m: usize) {
    debug_assert!(q.len() >= llim_m + 2);

    let mut l = 0usize;
    let mut ll = 0usize;
    let mut qq = q[0] * xlm[0];
    while l + 1 < llim_m {
        let qq2 = q[l + 2];
        q[l] = qq + qq2 * xlm[ll + 1];
        q[l + 1] *= xlm[ll + 2];
        ll += 3;
        l += 2;
        qq = qq2 * xlm[ll];
    }
    q[l] = qq;
    let mut q_top = Complex64::new(0.0, 0.0);
    if l < llim_m {
        q_top = q[l + 1] * xlm[ll + 2];
    }
    q[l + 1] = q_top;
}

/// Same pre-processing applied to the two interleaved sequences of a
/// packed (V, W) buffer, in place. Use `llim_m = llim - m + 1` for vector
/// data that carries the ghost degree `llim + 1`.
pub fn sh2_to_ishioka(xlm: &[f64], vw: &mut [Complex64], llim_m: usize) {
    debug_assert!(vw.len() >= 2 * (llim_m + 2));

    let mut l = 0usize;
    let mut ll = 0usize;
    let mut vv = vw[0] * xlm[0];
    let mut ww = vw[1] * xlm[0];
    while l + 1 < llim_m {
        let vv2 = vw[2 * (l + 2)];
        let ww2 = vw[2 * (l + 2) + 1];
        vw[2 * l] = vv + vv2 * xlm[ll + 1];
        vw[2 * l + 1] = ww + ww2 * xlm[ll + 1];
        vw[2 * l + 2] *= xlm[ll + 2];
        vw[2 * l + 3] *= xlm[ll + 2];
        ll += 3;
        l += 2;
        vv = vv2 * xlm[ll];
        ww = ww2 * xlm[ll];
    }
    vw[2 * l] = vv;
    vw[2 * l + 1] = ww;
    if l < llim_m {
        vw[2 * l + 2] *= xlm[ll + 2];
        vw[2 * l + 3] *= xlm[ll + 2];
    } else {
        vw[2 * l + 2] = Complex64::new(0.0, 0.0);
        vw[2 * l + 3] = Complex64::new(0.0, 0.0);
    }
}

// ---------------------------------------------------------------------------
// Inverse post-processing: exact left-inverse of the pre-processing
// ---------------------------------------------------------------------------

/// Map chain-basis coefficients back to SH coefficients: the exact
/// left-inverse of [`sh_to_ishioka`] under the same `xlm` table.
///
/// The even chain is a bidiagonal system solved by back-substitution from
/// the top degree; the odd chain is diagonal. Reads `q_in[0..=llim_m]`,
/// writes `out[0..=llim_m]`.
pub fn ishioka_to_sh(xlm: &[f64], q_in: &[Complex64], out: &mut [Complex64], llim_m: usize) {
    debug_assert!(q_in.len() > llim_m);
    debug_assert!(out.len() > llim_m);

    // Top even relative degree reached by the pre-processing main loop.
    let lf = if llim_m % 2 == 0 { llim_m } else { llim_m - 1 };

    // Odd chain: out[2k+1] = q[2k+1] / xlm[3k+2].
    let mut l = 1;
    let mut ll = 2;
    while l <= llim_m {
        out[l] = q_in[l] / xlm[ll];
        l += 2;
        ll += 3;
    }

    // Even chain, downward: out[lf] = q[lf]/d, then
    // out[2k] = (q[2k] - u·out[2k+2]) / d.
    let mut k = lf / 2;
    out[lf] = q_in[lf] / xlm[3 * k];
    while k > 0 {
        k -= 1;
        let l = 2 * k;
        out[l] = (q_in[l] - out[l + 2] * xlm[3 * k + 1]) / xlm[3 * k];
    }
}

/// In-place form of [`ishioka_to_sh`].
pub fn ishioka_to_sh_in_place(xlm: &[f64], q: &mut [Complex64], llim_m: usize) {
    debug_assert!(q.len() > llim_m);

    let lf = if llim_m % 2 == 0 { llim_m } else { llim_m - 1 };

    let mut l = 1;
    let mut ll = 2;
    while l <= llim_m {
        q[l] /= xlm[ll];
        l += 2;
        ll += 3;
    }

    let mut k = lf / 2;
    q[lf] /= xlm[3 * k];
    while k > 0 {
        k -= 1;
        let l = 2 * k;
        q[l] = (q[l] - q[l + 2] * xlm[3 * k + 1]) / xlm[3 * k];
    }
}

/// Paired in-place form of [`ishioka_to_sh`] for an interleaved (V, W)
/// buffer. Use `llim_m = llim - m + 1` for vector data.
pub fn ishioka_to_sh2(xlm: &[f64], vw: &mut [Complex64], llim_m: usize) {
    debug_assert!(vw.len() >= 2 * (llim_m + 1));

    let lf = if llim_m % 2 == 0 { llim_m } else { llim_m - 1 };

    let mut l = 1;
    let mut ll = 2;
    while l <= llim_m {
        vw[2 * l] /= xlm[ll];
        vw[2 * l + 1] /= xlm[ll];
        l += 2;
        ll += 3;
    }

    let mut k = lf / 2;
    vw[2 * lf] /= xlm[3 * k];
    vw[2 * lf + 1] /= xlm[3 * k];
    while k > 0 {
        k -= 1;
        let l = 2 * k;
        vw[2 * l] = (vw[2 * l] - vw[2 * l + 4] * xlm[3 * k + 1]) / xlm[3 * k];
        vw[2 * l + 1] = (vw[2 * l + 1] - vw[2 * l + 5] * xlm[3 * k + 1]) / xlm[3 * k];
    }
}

// ---------------------------------------------------------------------------
// Adjoint post-processing: fold raw chain projections into SH coefficients
// ---------------------------------------------------------------------------

/// Fold raw chain projections `c[0..=llim_m(+1)]` (accumulated by the
/// analysis engine against the ψ_k / x·ψ_k functions) into SH
/// coefficients. This is the adjoint of [`sh_to_ishioka`], not its
/// inverse; the analysis pipeline needs exactly this map.
///
/// Can operate in place (`c` and `out` may be the same buffer via the
/// `_in_place` form).
pub fn ishioka_collect_sh(xlm: &[f64], c: &[Complex64], out: &mut [Complex64], llim_m: usize) {
    debug_assert!(c.len() > llim_m);
    debug_assert!(out.len() > llim_m);

    let mut u0 = Complex64::new(0.0, 0.0);
    let mut l = 0usize;
    let mut ll = 0usize;
    while l < llim_m {
        let uu = c[l];
        out[l] = uu * xlm[ll] + u0;
        out[l + 1] = c[l + 1] * xlm[ll + 2];
        u0 = uu * xlm[ll + 1];
        l += 2;
        ll += 3;
    }
    if l == llim_m {
        out[l] = c[l] * xlm[ll] + u0;
    }
}

/// Paired in-place form of [`ishioka_collect_sh`] for an interleaved
/// (V, W) buffer. Use `llim_m = llim - m + 1` for vector data.
pub fn ishioka_collect_sh2(xlm: &[f64], vw: &mut [Complex64], llim_m: usize) {
    debug_assert!(vw.len() >= 2 * (llim_m + 1));

    let mut v0 = Complex64::new(0.0, 0.0);
    let mut w0 = Complex64::new(0.0, 0.0);
    let mut l = 0usize;
    let mut ll = 0usize;
    while l < llim_m {
        let vv = vw[2 * l];
        let ww = vw[2 * l + 1];
        vw[2 * l] = vv * xlm[ll] + v0;
        vw[2 * l + 1] = ww * xlm[ll] + w0;
        vw[2 * l + 2] *= xlm[ll + 2];
        vw[2 * l + 3] *= xlm[ll + 2];
        v0 = vv * xlm[ll + 1];
        w0 = ww * xlm[ll + 1];
        l += 2;
        ll += 3;
    }
    if l == llim_m {
        vw[2 * l] = vw[2 * l] * xlm[ll] + v0;
        vw[2 * l + 1] = vw[2 * l + 1] * xlm[ll] + w0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Deterministic pseudo-random complex data.
    fn random_cvec(n: usize, seed: u64) -> Vec<Complex64> {
        let mut v = Vec::with_capacity(n);
        let mut x = seed;
        let mut next = || {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            (x >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
        };
        for _ in 0..n {
            let re = next();
            let im = next();
            v.push(Complex64::new(re, im));
        }
        v
    }

    /// A plausible xlm table for structural tests: diagonals bounded away
    /// from zero, nonzero off-diagonal couplings.
    fn test_xlm(pairs: usize, seed: u64) -> Vec<f64> {
        let mut v = Vec::with_capacity(3 * pairs);
        let mut x = seed;
        let mut next = || {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            (x >> 11) as f64 / (1u64 << 53) as f64
        };
        for _ in 0..pairs {
            v.push(0.5 + next()); // d_k in [0.5, 1.5]
            v.push(next() - 0.5); // u_{k+1} in [-0.5, 0.5]
            v.push(0.5 + next()); // o_k in [0.5, 1.5]
        }
        v
    }

    #[test]
    fn test_pre_then_inverse_round_trip() {
        for llim_m in [0usize, 1, 2, 3, 7, 8, 31] {
            let xlm = test_xlm(llim_m / 2 + 2, 42);
            let q = random_cvec(llim_m + 2, 7);
            let mut chain = vec![Complex64::new(0.0, 0.0); llim_m + 2];
            sh_to_ishioka(&xlm, &q, &mut chain, llim_m);
            let mut back = vec![Complex64::new(0.0, 0.0); llim_m + 2];
            ishioka_to_sh(&xlm, &chain, &mut back, llim_m);
            for l in 0..=llim_m {
                assert_relative_eq!(back[l].re, q[l].re, epsilon = 1e-13, max_relative = 1e-12);
                assert_relative_eq!(back[l].im, q[l].im, epsilon = 1e-13, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_in_place_matches_out_of_place() {
        let llim_m = 13;
        let xlm = test_xlm(llim_m / 2 + 2, 3);
        let q = random_cvec(llim_m + 2, 11);

        let mut chain = vec![Complex64::new(0.0, 0.0); llim_m + 2];
        sh_to_ishioka(&xlm, &q, &mut chain, llim_m);

        let mut q_ip = q.clone();
        sh_to_ishioka_in_place(&xlm, &mut q_ip, llim_m);
        for l in 0..=llim_m + 1 {
            assert_relative_eq!(q_ip[l].re, chain[l].re, epsilon = 1e-15);
            assert_relative_eq!(q_ip[l].im, chain[l].im, epsilon = 1e-15);
        }

        ishioka_to_sh_in_place(&xlm, &mut q_ip, llim_m);
        for l in 0..=llim_m {
            assert_relative_eq!(q_ip[l].re, q[l].re, epsilon = 1e-12, max_relative = 1e-12);
            assert_relative_eq!(q_ip[l].im, q[l].im, epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_paired_matches_two_singles() {
        let llim_m = 10;
        let xlm = test_xlm(llim_m / 2 + 2, 9);
        let v = random_cvec(llim_m + 2, 21);
        let w = random_cvec(llim_m + 2, 22);

        let mut vw: Vec<Complex64> = Vec::new();
        for l in 0..llim_m + 2 {
            vw.push(v[l]);
            vw.push(w[l]);
        }
        sh2_to_ishioka(&xlm, &mut vw, llim_m);

        let mut v1 = vec![Complex64::new(0.0, 0.0); llim_m + 2];
        let mut w1 = vec![Complex64::new(0.0, 0.0); llim_m + 2];
        sh_to_ishioka(&xlm, &v, &mut v1, llim_m);
        sh_to_ishioka(&xlm, &w, &mut w1, llim_m);

        for l in 0..llim_m + 2 {
            assert_relative_eq!(vw[2 * l].re, v1[l].re, epsilon = 1e-15);
            assert_relative_eq!(vw[2 * l + 1].im, w1[l].im, epsilon = 1e-15);
        }

        ishioka_to_sh2(&xlm, &mut vw, llim_m);
        for l in 0..=llim_m {
            assert_relative_eq!(vw[2 * l].re, v[l].re, epsilon = 1e-12, max_relative = 1e-12);
            assert_relative_eq!(vw[2 * l + 1].re, w[l].re, epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_collect_is_adjoint_of_pre() {
        // <pre(q), c> == <q, collect(c)> for real inner products.
        let llim_m = 9;
        let xlm = test_xlm(llim_m / 2 + 2, 17);
        let q = random_cvec(llim_m + 2, 31);
        let c = random_cvec(llim_m + 2, 32);

        let mut pre_q = vec![Complex64::new(0.0, 0.0); llim_m + 2];
        sh_to_ishioka(&xlm, &q, &mut pre_q, llim_m);
        let mut col_c = vec![Complex64::new(0.0, 0.0); llim_m + 2];
        ishioka_collect_sh(&xlm, &c, &mut col_c, llim_m);

        let mut lhs = 0.0;
        let mut rhs = 0.0;
        for l in 0..=llim_m {
            lhs += pre_q[l].re * c[l].re + pre_q[l].im * c[l].im;
            rhs += q[l].re * col_c[l].re + q[l].im * col_c[l].im;
        }
        assert_relative_eq!(lhs, rhs, epsilon = 1e-12, max_relative = 1e-12);
    }
}
