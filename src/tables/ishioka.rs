//! Ishioka recurrence coefficient tables.
//!
//! For fixed order m the auxiliary chain is
//!
//! ψ_k(x) = y_{m+2k+1}(x) / (x·α_k),
//!
//! the odd-degree associated Legendre chain with the x factor removed, a
//! polynomial in t = cos²θ times (sin θ)^m. Folding the classic three-term
//! recurrence over two degrees gives a two-term recurrence in t,
//!
//! ψ_{k+1} = (c_{2k}·t + c_{2k+1})·ψ_k + ψ_{k-1},
//!
//! walked by `kernel::ishioka_aux_values` with one step per two degrees:
//! half the recurrence length of the classic scheme, with no odd/even
//! cross-coupling to accumulate error at high degree. The alternating
//! rescale factors α_k normalize the trailing coefficient to one.
//!
//! The `xlm` basis-change triplets (3 entries per 2 degrees) relate the
//! Legendre chains back to the auxiliary chain:
//!
//! y_{m+2k}   = xlm[3k]·ψ_k + xlm[3(k-1)+1]·ψ_{k-1}
//! y_{m+2k+1} = xlm[3k+2]·x·ψ_k
//!
//! The even relation has exactly two terms because the x·ψ_k are mutually
//! orthogonal under the sphere quadrature (they are the orthonormal odd
//! chain, up to the α_k). The triplets are built by exact Gauss-quadrature
//! projection, which keeps every sign and normalization self-consistent:
//! projecting the synthesis chain (`alm`) gives `xlm`, projecting the
//! analysis chain (`blm`) gives `x2lm`.
//!
//! The tables are built over the internal layout, which extends two
//! degrees past the user truncation; every degree a transform can touch
//! (up to the vector ghost degree) therefore has full chain support.

use crate::kernel::{ishioka_aux_values, legendre_values};
use crate::polynomial::{gauss_legendre_nodes, gauss_legendre_weights};
use crate::types::LmLayout;

/// Build the `clm` table for the auxiliary two-term recurrence by folding
/// the classic recurrence coefficients of `alm`.
///
/// Per order block: `clm[0]` is the chain seed constant (the coefficient
/// of (sin θ)^m in y_{m+1}(x)/x), then pairs `(c_{2k}, c_{2k+1})`. Layout
/// offsets follow [`LmLayout::clm_index`].
pub fn build_clm(layout: &LmLayout, alm: &[f64]) -> Vec<f64> {
    let lmax = layout.lmax();
    let mut clm = vec![0.0; layout.clm_len()];

    for m in layout.orders() {
        let base = layout.clm_index(m);
        let abase = layout.alm_index(m);
        // a_l and b_l for this order (scaled); a valid from l = m+1,
        // b from l = m+2.
        let a = |l: usize| alm[abase + 2 * (l - m)];
        let b = |l: usize| alm[abase + 2 * (l - m) + 1];

        if lmax == m {
            // Degenerate top order: no odd chain to walk.
            clm[base] = alm[abase];
            continue;
        }

        // ψ_0 = y_{m+1}/x = a_{m+1}·a_mm·(sin θ)^m.
        clm[base] = a(m + 1) * alm[abase];

        // Chain member k is degree m+2k+1; the step producing member j+1
        // needs classic coefficients up to degree m+2j+3.
        let pairs = (lmax - m).saturating_sub(1) / 2;
        let mut alpha_prev = 1.0; // α_{j-1}
        let mut alpha = 1.0; // α_j
        for j in 0..pairs {
            let l = m + 2 * j + 1;
            let big_a = a(l + 2) * a(l + 1);
            let big_b = b(l + 2) + a(l + 2) * b(l + 1) / a(l);
            let alpha_next = if j == 0 {
                1.0
            } else {
                // Trailing coefficient C_j normalized to +1.
                let big_c = -a(l + 2) * b(l + 1) * b(l) / a(l);
                big_c * alpha_prev
            };
            clm[base + 1 + 2 * j] = big_a * alpha / alpha_next;
            clm[base + 2 + 2 * j] = big_b * alpha / alpha_next;
            alpha_prev = alpha;
            alpha = alpha_next;
        }
    }
    clm
}

/// Number of auxiliary chain members stored for order `m` in a table
/// built over `layout`: member k has odd degree m+2k+1 <= lmax.
#[inline]
pub fn chain_len(layout: &LmLayout, m: usize) -> usize {
    (layout.lmax() - m).saturating_sub(1) / 2 + 1
}

/// Build an `xlm`-shaped basis-change table by projecting the Legendre
/// chain generated by `alm` onto the auxiliary chain generated by `clm`.
///
/// Passing the synthesis table gives `xlm`; passing the analysis table
/// (`blm`) gives `x2lm`. Layout offsets follow [`LmLayout::xlm_index`].
/// Triplet k of an order block covers degrees (m+2k, m+2k+1); triplets
/// exist for every stored chain member.
pub fn build_xlm(layout: &LmLayout, alm: &[f64], clm: &[f64]) -> Vec<f64> {
    let lmax = layout.lmax();
    let n_quad = lmax + 6;
    let nodes = gauss_legendre_nodes(n_quad);
    let weights = gauss_legendre_weights(n_quad, &nodes);

    let mut xlm = vec![0.0; layout.xlm_len()];
    let mut pbar = vec![0.0; lmax + 1];
    let mut psi = vec![0.0; lmax / 2 + 2];

    for m in layout.orders() {
        let nl = lmax - m; // largest relative degree
        let kmax = chain_len(layout, m) - 1;

        let abase = layout.alm_index(m);
        let cbase = layout.clm_index(m);
        let xbase = layout.xlm_index(m);

        let mut nphi = vec![0.0; kmax + 1];
        let mut dnum = vec![0.0; kmax + 1];
        let mut onum = vec![0.0; kmax + 1];
        let mut unum = vec![0.0; kmax + 1];

        for (&x, &w) in nodes.iter().zip(weights.iter()) {
            let st = (1.0 - x * x).sqrt();
            legendre_values(&alm[abase..], m, lmax, x, st, true, &mut pbar[..nl + 1]);
            ishioka_aux_values(&clm[cbase..], m, kmax, x, st, true, &mut psi[..kmax + 1]);

            for k in 0..=kmax {
                let phi = x * psi[k];
                nphi[k] += w * phi * phi;
                dnum[k] += w * pbar[2 * k] * x * phi;
                onum[k] += w * pbar[2 * k + 1] * phi;
                if k > 0 {
                    unum[k] += w * pbar[2 * k] * x * (x * psi[k - 1]);
                }
            }
        }

        for k in 0..=kmax {
            xlm[xbase + 3 * k] = dnum[k] / nphi[k];
            xlm[xbase + 3 * k + 1] = if k < kmax { unum[k + 1] / nphi[k] } else { 0.0 };
            xlm[xbase + 3 * k + 2] = onum[k] / nphi[k];
        }
    }
    xlm
}
