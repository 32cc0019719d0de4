//! Scalar ↔ vector coefficient reorganization.
//!
//! A tangential vector field with spheroidal/toroidal coefficients (S, T)
//! is transformed through a pair of scalar sequences (V, W), stored
//! interleaved per degree in the packed buffer `vw`
//! (`vw[2j] = V_{m+j}`, `vw[2j+1] = W_{m+j}`):
//!
//! V_l =  i·em·T_l + mx-couplings of S_{l±1}
//! W_l =  i·em·S_l − mx-couplings of T_{l±1}
//!
//! and back, dividing by l(l+1):
//!
//! S_l = -(i·em·W_l + mx·V_l) / (l(l+1))
//! T_l = -(i·em·V_l − mx·W_l) / (l(l+1))
//!
//! `mx` is an order block of the sparse coupling table (`mx_stdt` when
//! converting (S, T) for synthesis, `mx_van` when reducing analysis
//! projections; which table is the caller's policy). `em` is the signed
//! order. All indexing is relative to the order block: `sl[0] = S_m`.
//!
//! The forward conversion writes one ghost degree (llim+1) that the
//! reduction consumes as padding; inputs must be zero past `llim`.
//!
//! `vect_to_2scal_alt` is the lane-friendly variant: no loop-carried
//! state, so the middle iterations are independent and vectorize. Its
//! scalar twin is the correctness oracle; with the `simd` feature the
//! main entry dispatches through `pulp` so the loop compiles for the best
//! available vector ISA.

use num_complex::Complex64;

#[cfg(feature = "simd")]
use pulp::{Arch, WithSimd};

/// i·em·z for real em.
#[inline]
fn i_em(em: f64, z: Complex64) -> Complex64 {
    Complex64::new(-em * z.im, em * z.re)
}

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Convert a vector coefficient pair (S, T) to the interleaved scalar
/// pair (V, W), degrees `m..=llim+1` (the last being the ghost degree).
///
/// # Arguments
/// * `mx` - order block of the coupling table (at least `2*(llim-m+1)` entries)
/// * `llim` - degree truncation, `|m| <= llim`
/// * `m` - signed order
/// * `sl`, `tl` - input coefficients, `sl[j] = S_{|m|+j}`, at least `llim-|m|+1` entries
/// * `vw` - output, at least `2*(llim-|m|+2)` entries
pub fn vect_to_2scal(
    mx: &[f64],
    llim: usize,
    m: i32,
    sl: &[Complex64],
    tl: &[Complex64],
    vw: &mut [Complex64],
) {
    let em = m as f64;
    let mu = m.unsigned_abs() as usize;
    debug_assert!(mu <= llim);
    let n = llim - mu;
    debug_assert!(sl.len() > n && tl.len() > n);
    debug_assert!(vw.len() >= 2 * (n + 2));
    debug_assert!(mx.len() >= 2 * (n + 1));

    let mut sl0 = sl[0];
    let mut tl0 = tl[0];
    let mut vs = i_em(em, tl0);
    let mut wt = i_em(em, sl0);
    for j in 0..n {
        let sl1 = sl[j + 1]; // kept for next iteration
        let tl1 = tl[j + 1];
        let mxu = mx[2 * j];
        let mxl = mx[2 * j + 1]; // mxl for next iteration
        vw[2 * j] = vs + sl1 * mxu;
        vw[2 * j + 1] = wt - tl1 * mxu;
        vs = i_em(em, tl1) + sl0 * mxl;
        wt = i_em(em, sl1) - tl0 * mxl;
        sl0 = sl1;
        tl0 = tl1;
    }
    // j = n (l = llim): no upper coupling, spill into the ghost degree.
    let mxl = mx[2 * n + 1];
    vw[2 * n] = vs;
    vw[2 * n + 1] = wt;
    vw[2 * n + 2] = sl0 * mxl;
    vw[2 * n + 3] = -(tl0 * mxl);
}

/// Carry-free twin of [`vect_to_2scal`]: every degree reads its own
/// couplings (`mx[2j-1]`, `mx[2j]`), so iterations are independent.
/// Scalar reference path; must agree with [`vect_to_2scal`] to rounding.
pub fn vect_to_2scal_alt_scalar(
    mx: &[f64],
    llim: usize,
    m: i32,
    sl: &[Complex64],
    tl: &[Complex64],
    vw: &mut [Complex64],
) {
    let em = m as f64;
    let mu = m.unsigned_abs() as usize;
    debug_assert!(mu <= llim);
    let n = llim - mu;
    debug_assert!(sl.len() > n && tl.len() > n);
    debug_assert!(vw.len() >= 2 * (n + 2));
    debug_assert!(mx.len() >= 2 * (n + 1));

    // l = m: no lower coupling.
    {
        let mut s = i_em(em, tl[0]);
        let mut t = i_em(em, sl[0]);
        if n > 0 {
            let mxu = mx[0];
            s += sl[1] * mxu;
            t -= tl[1] * mxu;
        }
        vw[0] = s;
        vw[1] = t;
    }
    // General case: V[j] = i·em·T[j] + mx[2j-1]·S[j-1] + mx[2j]·S[j+1].
    for j in 1..n {
        let mxl = mx[2 * j - 1];
        let mxu = mx[2 * j];
        vw[2 * j] = i_em(em, tl[j]) + sl[j - 1] * mxl + sl[j + 1] * mxu;
        vw[2 * j + 1] = i_em(em, sl[j]) - tl[j - 1] * mxl - tl[j + 1] * mxu;
    }
    // l = llim (only when llim > m): no upper coupling.
    if n > 0 {
        let mxl = mx[2 * n - 1];
        vw[2 * n] = i_em(em, tl[n]) + sl[n - 1] * mxl;
        vw[2 * n + 1] = i_em(em, sl[n]) - tl[n - 1] * mxl;
    }
    // Ghost degree llim+1.
    let mxl = mx[2 * n + 1];
    vw[2 * n + 2] = sl[n] * mxl;
    vw[2 * n + 3] = -(tl[n] * mxl);
}

/// Lane-friendly entry point for [`vect_to_2scal_alt_scalar`].
///
/// With the `simd` feature the independent-iteration loop is dispatched
/// through `pulp`, compiling it for the best vector ISA available at
/// runtime; the result matches the scalar path up to floating-point
/// reassociation.
#[cfg(feature = "simd")]
pub fn vect_to_2scal_alt(
    mx: &[f64],
    llim: usize,
    m: i32,
    sl: &[Complex64],
    tl: &[Complex64],
    vw: &mut [Complex64],
) {
    struct Impl<'a> {
        mx: &'a [f64],
        llim: usize,
        m: i32,
        sl: &'a [Complex64],
        tl: &'a [Complex64],
        vw: &'a mut [Complex64],
    }

    impl WithSimd for Impl<'_> {
        type Output = ();

        #[inline(always)]
        fn with_simd<S: pulp::Simd>(self, _simd: S) -> Self::Output {
            vect_to_2scal_alt_scalar(self.mx, self.llim, self.m, self.sl, self.tl, self.vw);
        }
    }

    Arch::new().dispatch(Impl {
        mx,
        llim,
        m,
        sl,
        tl,
        vw,
    });
}

/// Lane-friendly entry point for [`vect_to_2scal_alt_scalar`].
#[cfg(not(feature = "simd"))]
pub fn vect_to_2scal_alt(
    mx: &[f64],
    llim: usize,
    m: i32,
    sl: &[Complex64],
    tl: &[Complex64],
    vw: &mut [Complex64],
) {
    vect_to_2scal_alt_scalar(mx, llim, m, sl, tl, vw);
}

/// Reduce the interleaved scalar pair (V, W) back to the vector pair
/// (S, T), dividing by l(l+1) via the precomputed `l_2` table
/// (`l_2[0] = 0`, so degree zero is exactly zero with no division).
///
/// # Arguments
/// * `mx` - order block of the coupling table (`mx_van` for analysis)
/// * `l_2` - full `1/(l(l+1))` table, indexed by absolute degree
/// * `vw` - input, degrees `m..=llim+1` (ghost consumed as padding)
/// * `sl`, `tl` - outputs, `llim-|m|+1` entries
pub fn two_scal_to_vect(
    mx: &[f64],
    l_2: &[f64],
    llim: usize,
    m: i32,
    vw: &[Complex64],
    sl: &mut [Complex64],
    tl: &mut [Complex64],
) {
    let em = m as f64;
    let mu = m.unsigned_abs() as usize;
    debug_assert!(mu <= llim);
    let n = llim - mu;
    debug_assert!(vw.len() >= 2 * (n + 2));
    debug_assert!(sl.len() > n && tl.len() > n);
    debug_assert!(l_2.len() > llim);

    let mut vl = vw[0];
    let mut wl = vw[1];
    let mut sl1 = ZERO;
    let mut tl1 = ZERO;
    for j in 0..=n {
        let mxu = mx[2 * j];
        let mxl = mx[2 * j + 1]; // mxl for next iteration
        let mut s = sl1 + i_em(em, wl);
        let mut t = tl1 - i_em(em, vl);
        sl1 = vl * mxl; // lower coupling for next iter
        tl1 = wl * mxl;
        vl = vw[2 * j + 2]; // kept for next iteration
        wl = vw[2 * j + 3];
        s += vl * mxu;
        t += wl * mxu;
        sl[j] = -(s * l_2[mu + j]);
        tl[j] = t * l_2[mu + j];
    }
}

/// Spheroidal-only fast path: convert S alone (T = 0) to (V, W).
pub fn sph_to_2scal(mx: &[f64], llim: usize, m: i32, sl: &[Complex64], vw: &mut [Complex64]) {
    let em = m as f64;
    let mu = m.unsigned_abs() as usize;
    debug_assert!(mu <= llim);
    let n = llim - mu;
    debug_assert!(sl.len() > n);
    debug_assert!(vw.len() >= 2 * (n + 2));

    let mut sl0 = sl[0];
    let mut vs = ZERO;
    let mut wt = i_em(em, sl0);
    for j in 0..n {
        let sl1 = sl[j + 1];
        let mxu = mx[2 * j];
        let mxl = mx[2 * j + 1]; // mxl for next iteration
        vw[2 * j] = vs + sl1 * mxu;
        vw[2 * j + 1] = wt;
        vs = sl0 * mxl; // vs for next iter
        wt = i_em(em, sl1);
        sl0 = sl1;
    }
    let mxl = mx[2 * n + 1];
    vw[2 * n] = vs;
    vw[2 * n + 1] = wt;
    vw[2 * n + 2] = sl0 * mxl;
    vw[2 * n + 3] = ZERO;
}

/// Toroidal-only fast path: convert T alone (S = 0) to (V, W).
pub fn tor_to_2scal(mx: &[f64], llim: usize, m: i32, tl: &[Complex64], vw: &mut [Complex64]) {
    let em = -(m as f64);
    let mu = m.unsigned_abs() as usize;
    debug_assert!(mu <= llim);
    let n = llim - mu;
    debug_assert!(tl.len() > n);
    debug_assert!(vw.len() >= 2 * (n + 2));

    let mut tl0 = -tl[0];
    let mut vs = i_em(em, tl0);
    let mut wt = ZERO;
    for j in 0..n {
        let tl1 = -tl[j + 1];
        let mxu = mx[2 * j];
        let mxl = mx[2 * j + 1]; // mxl for next iteration
        vw[2 * j] = vs;
        vw[2 * j + 1] = wt + tl1 * mxu;
        wt = tl0 * mxl; // wt for next iter
        vs = i_em(em, tl1);
        tl0 = tl1;
    }
    let mxl = mx[2 * n + 1];
    vw[2 * n] = vs;
    vw[2 * n + 1] = wt;
    vw[2 * n + 2] = ZERO;
    vw[2 * n + 3] = tl0 * mxl;
}
