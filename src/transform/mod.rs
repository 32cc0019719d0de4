//! Dispatch-facing transform steps.
//!
//! Every step works on one order `m` at a time, the unit an external
//! dispatch layer (FFT + thread loop) hands out. Steps are pure functions
//! over the shared configuration and caller buffers; whole-field drivers
//! below loop the steps over all orders (with a rayon version behind the
//! `parallel` feature writing disjoint per-order blocks).
//!
//! Spatial layout: rings are stored as hemisphere pairs. For each order
//! block the northern rings come first (ring 0 at the pole side), then
//! the southern rings (ring i pairing with colatitude π - θ_i). Packed
//! whole-field buffers are raw doubles (re, im interleaved per ring) with
//! hemisphere stride `hemi_stride` and, for vector fields, field stride
//! `2 * hemi_stride`, zero-padded to the padded ring count.

use crate::config::{RecurrenceScheme, ShtConfig};
use crate::grid::{zero_poles2, zero_poles4, GridKind};
use crate::kernel::{
    ishioka_aux_values, ishioka_collect_sh, ishioka_collect_sh2, legendre_values, sh2_to_ishioka,
    sh_to_ishioka, sph_to_2scal, tor_to_2scal, two_scal_to_vect, vect_to_2scal,
};
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Synthesis for one order: coefficients `ql[j] = Q_{m+j}` to ring values
/// (northern and southern hemisphere).
pub fn synth_step(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    ql: &[Complex64],
    out_n: &mut [Complex64],
    out_s: &mut [Complex64],
) {
    match cfg.scheme() {
        RecurrenceScheme::Classic => synth_step_classic(cfg, m, llim, ql, out_n, out_s),
        RecurrenceScheme::Ishioka => synth_step_ishioka(cfg, m, llim, ql, out_n, out_s),
    }
}

fn synth_step_classic(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    ql: &[Complex64],
    out_n: &mut [Complex64],
    out_s: &mut [Complex64],
) {
    debug_assert!(m <= llim && llim <= cfg.lmax());
    let nl = llim - m;
    debug_assert!(ql.len() > nl);
    let n2 = cfg.grid.nlat_2;
    debug_assert!(out_n.len() >= n2 && out_s.len() >= n2);

    let alm = cfg.alm_block(m);
    let tm = cfg.tm[m / cfg.mres()];
    let skip = cfg.skip_small();
    let mut y = vec![0.0; nl + 1];

    for i in 0..n2 {
        if i < tm {
            out_n[i] = ZERO;
            out_s[i] = ZERO;
            continue;
        }
        legendre_values(alm, m, llim, cfg.grid.ct[i], cfg.grid.st[i], skip, &mut y);
        let mut fe = ZERO;
        let mut fo = ZERO;
        for j in (0..=nl).step_by(2) {
            fe += ql[j] * y[j];
        }
        for j in (1..=nl).step_by(2) {
            fo += ql[j] * y[j];
        }
        out_n[i] = fe + fo;
        out_s[i] = fe - fo;
    }
}

fn synth_step_ishioka(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    ql: &[Complex64],
    out_n: &mut [Complex64],
    out_s: &mut [Complex64],
) {
    debug_assert!(m <= llim && llim <= cfg.lmax());
    let nl = llim - m;
    let n2 = cfg.grid.nlat_2;

    let mut q = vec![ZERO; nl + 2];
    sh_to_ishioka(cfg.xlm_block(m), ql, &mut q, nl);

    let clm = cfg.clm_block(m);
    let tm = cfg.tm[m / cfg.mres()];
    let skip = cfg.skip_small();
    let kmax = (nl + 1) / 2;
    let mut psi = vec![0.0; kmax + 1];

    for i in 0..n2 {
        if i < tm {
            out_n[i] = ZERO;
            out_s[i] = ZERO;
            continue;
        }
        let x = cfg.grid.ct[i];
        ishioka_aux_values(clm, m, kmax, x, cfg.grid.st[i], skip, &mut psi);
        let mut fe = ZERO;
        let mut fo = ZERO;
        for k in 0..=kmax {
            if 2 * k <= nl + 1 {
                fe += q[2 * k] * psi[k];
            }
            if 2 * k + 1 <= nl + 1 {
                fo += q[2 * k + 1] * (x * psi[k]);
            }
        }
        out_n[i] = fe + fo;
        out_s[i] = fe - fo;
    }
}

/// Analysis for one order: ring values to coefficients
/// `ql[j] = Q_{m+j}`, using the quadrature weights of the grid.
pub fn anal_step(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    f_n: &[Complex64],
    f_s: &[Complex64],
    ql: &mut [Complex64],
) {
    match cfg.scheme() {
        RecurrenceScheme::Classic => anal_step_classic(cfg, m, llim, f_n, f_s, ql),
        RecurrenceScheme::Ishioka => anal_step_ishioka(cfg, m, llim, f_n, f_s, ql),
    }
}

fn anal_step_classic(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    f_n: &[Complex64],
    f_s: &[Complex64],
    ql: &mut [Complex64],
) {
    debug_assert!(m <= llim && llim <= cfg.lmax());
    let nl = llim - m;
    let n2 = cfg.grid.nlat_2;
    debug_assert!(f_n.len() >= n2 && f_s.len() >= n2);

    for v in &mut ql[..=nl] {
        *v = ZERO;
    }
    let blm = cfg.blm_block(m);
    let tm = cfg.tm[m / cfg.mres()];
    let skip = cfg.skip_small();
    let mut y = vec![0.0; nl + 1];

    for i in tm..n2 {
        legendre_values(blm, m, llim, cfg.grid.ct[i], cfg.grid.st[i], skip, &mut y);
        let w = cfg.grid.wg[i];
        let (ce, co) = if cfg.grid.is_self_paired(i) {
            (f_n[i] * w, ZERO)
        } else {
            ((f_n[i] + f_s[i]) * w, (f_n[i] - f_s[i]) * w)
        };
        for j in (0..=nl).step_by(2) {
            ql[j] += ce * y[j];
        }
        for j in (1..=nl).step_by(2) {
            ql[j] += co * y[j];
        }
    }
}

fn anal_step_ishioka(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    f_n: &[Complex64],
    f_s: &[Complex64],
    ql: &mut [Complex64],
) {
    debug_assert!(m <= llim && llim <= cfg.lmax());
    let nl = llim - m;
    let n2 = cfg.grid.nlat_2;

    let clm = cfg.clm_block(m);
    let tm = cfg.tm[m / cfg.mres()];
    let skip = cfg.skip_small();
    let kmax = nl / 2;
    let mut psi = vec![0.0; kmax + 1];
    let mut c = vec![ZERO; nl + 2];

    for i in tm..n2 {
        let x = cfg.grid.ct[i];
        ishioka_aux_values(clm, m, kmax, x, cfg.grid.st[i], skip, &mut psi);
        let w = cfg.grid.wg[i];
        let (ce, co) = if cfg.grid.is_self_paired(i) {
            (f_n[i] * w, ZERO)
        } else {
            ((f_n[i] + f_s[i]) * w, (f_n[i] - f_s[i]) * w)
        };
        for k in 0..=kmax {
            c[2 * k] += ce * psi[k];
            if 2 * k + 1 <= nl {
                c[2 * k + 1] += co * (x * psi[k]);
            }
        }
    }
    ishioka_collect_sh(cfg.x2lm_block(m), &c, ql, nl);
}

/// Ring contraction shared by the vector synthesis paths: synthesize the
/// interleaved (V, W) buffer and divide by sin θ.
fn synth_vw_rings(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    vw: &mut [Complex64],
    ut_n: &mut [Complex64],
    ut_s: &mut [Complex64],
    up_n: &mut [Complex64],
    up_s: &mut [Complex64],
) {
    let nl = llim - m;
    let n2 = cfg.grid.nlat_2;
    let tm = cfg.tm[m / cfg.mres()];
    let skip = cfg.skip_small();

    match cfg.scheme() {
        RecurrenceScheme::Classic => {
            let alm = cfg.alm_block(m);
            let mut y = vec![0.0; nl + 2];
            for i in 0..n2 {
                if i < tm {
                    ut_n[i] = ZERO;
                    ut_s[i] = ZERO;
                    up_n[i] = ZERO;
                    up_s[i] = ZERO;
                    continue;
                }
                legendre_values(alm, m, llim + 1, cfg.grid.ct[i], cfg.grid.st[i], skip, &mut y);
                let mut ve = ZERO;
                let mut vo = ZERO;
                let mut we = ZERO;
                let mut wo = ZERO;
                for j in (0..=nl + 1).step_by(2) {
                    ve += vw[2 * j] * y[j];
                    we += vw[2 * j + 1] * y[j];
                }
                for j in (1..=nl + 1).step_by(2) {
                    vo += vw[2 * j] * y[j];
                    wo += vw[2 * j + 1] * y[j];
                }
                let s1 = cfg.grid.st_1[i];
                ut_n[i] = (ve + vo) * s1;
                ut_s[i] = (ve - vo) * s1;
                up_n[i] = (we + wo) * s1;
                up_s[i] = (we - wo) * s1;
            }
        }
        RecurrenceScheme::Ishioka => {
            sh2_to_ishioka(cfg.xlm_block(m), vw, nl + 1);
            let clm = cfg.clm_block(m);
            let kmax = (nl + 1) / 2;
            let mut psi = vec![0.0; kmax + 1];
            for i in 0..n2 {
                if i < tm {
                    ut_n[i] = ZERO;
                    ut_s[i] = ZERO;
                    up_n[i] = ZERO;
                    up_s[i] = ZERO;
                    continue;
                }
                let x = cfg.grid.ct[i];
                ishioka_aux_values(clm, m, kmax, x, cfg.grid.st[i], skip, &mut psi);
                let mut ve = ZERO;
                let mut vo = ZERO;
                let mut we = ZERO;
                let mut wo = ZERO;
                for k in 0..=kmax {
                    if 2 * k <= nl + 1 {
                        ve += vw[2 * (2 * k)] * psi[k];
                        we += vw[2 * (2 * k) + 1] * psi[k];
                    }
                    if 2 * k + 1 <= nl + 1 {
                        let xp = x * psi[k];
                        vo += vw[2 * (2 * k + 1)] * xp;
                        wo += vw[2 * (2 * k + 1) + 1] * xp;
                    }
                }
                let s1 = cfg.grid.st_1[i];
                ut_n[i] = (ve + vo) * s1;
                ut_s[i] = (ve - vo) * s1;
                up_n[i] = (we + wo) * s1;
                up_s[i] = (we - wo) * s1;
            }
        }
    }
}

/// Vector synthesis for one order: spheroidal/toroidal coefficients to
/// the tangential components (u_θ, u_φ) on hemisphere ring pairs.
pub fn synth_vect_step(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    sl: &[Complex64],
    tl: &[Complex64],
    ut_n: &mut [Complex64],
    ut_s: &mut [Complex64],
    up_n: &mut [Complex64],
    up_s: &mut [Complex64],
) {
    let nl = llim - m;
    let mut vw = vec![ZERO; 2 * (nl + 3)];
    vect_to_2scal(cfg.mx_stdt_block(m), llim, m as i32, sl, tl, &mut vw);
    synth_vw_rings(cfg, m, llim, &mut vw, ut_n, ut_s, up_n, up_s);
}

/// Gradient-only synthesis (toroidal part zero).
pub fn synth_sph_step(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    sl: &[Complex64],
    ut_n: &mut [Complex64],
    ut_s: &mut [Complex64],
    up_n: &mut [Complex64],
    up_s: &mut [Complex64],
) {
    let nl = llim - m;
    let mut vw = vec![ZERO; 2 * (nl + 3)];
    sph_to_2scal(cfg.mx_stdt_block(m), llim, m as i32, sl, &mut vw);
    synth_vw_rings(cfg, m, llim, &mut vw, ut_n, ut_s, up_n, up_s);
}

/// Toroidal-only synthesis (spheroidal part zero).
pub fn synth_tor_step(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    tl: &[Complex64],
    ut_n: &mut [Complex64],
    ut_s: &mut [Complex64],
    up_n: &mut [Complex64],
    up_s: &mut [Complex64],
) {
    let nl = llim - m;
    let mut vw = vec![ZERO; 2 * (nl + 3)];
    tor_to_2scal(cfg.mx_stdt_block(m), llim, m as i32, tl, &mut vw);
    synth_vw_rings(cfg, m, llim, &mut vw, ut_n, ut_s, up_n, up_s);
}

/// Vector analysis for one order: tangential components back to
/// spheroidal/toroidal coefficients.
///
/// The components are scaled by 1/sin θ and the quadrature weight,
/// projected onto the scalar basis up to the ghost degree `llim+1`, and
/// reduced with the `mx_van` coupling. On a Gauss grid this is the exact
/// inverse of `synth_vect_step`.
pub fn anal_vect_step(
    cfg: &ShtConfig,
    m: usize,
    llim: usize,
    ut_n: &[Complex64],
    ut_s: &[Complex64],
    up_n: &[Complex64],
    up_s: &[Complex64],
    sl: &mut [Complex64],
    tl: &mut [Complex64],
) {
    debug_assert!(m <= llim && llim <= cfg.lmax());
    let nl = llim - m;
    let n2 = cfg.grid.nlat_2;
    let tm = cfg.tm[m / cfg.mres()];
    let skip = cfg.skip_small();

    let mut vw = vec![ZERO; 2 * (nl + 3)];

    match cfg.scheme() {
        RecurrenceScheme::Classic => {
            let blm = cfg.blm_block(m);
            let mut y = vec![0.0; nl + 2];
            for i in tm..n2 {
                let ws = cfg.grid.wg[i] * cfg.grid.st_1[i];
                if ws == 0.0 {
                    continue; // exact pole ring
                }
                legendre_values(blm, m, llim + 1, cfg.grid.ct[i], cfg.grid.st[i], skip, &mut y);
                let (ae, ao, be, bo) = ring_pair_weights(cfg, i, ws, ut_n, ut_s, up_n, up_s);
                for j in (0..=nl + 1).step_by(2) {
                    vw[2 * j] += ae * y[j];
                    vw[2 * j + 1] += be * y[j];
                }
                for j in (1..=nl + 1).step_by(2) {
                    vw[2 * j] += ao * y[j];
                    vw[2 * j + 1] += bo * y[j];
                }
            }
        }
        RecurrenceScheme::Ishioka => {
            let clm = cfg.clm_block(m);
            let kmax = (nl + 1) / 2;
            let mut psi = vec![0.0; kmax + 1];
            for i in tm..n2 {
                let ws = cfg.grid.wg[i] * cfg.grid.st_1[i];
                if ws == 0.0 {
                    continue;
                }
                let x = cfg.grid.ct[i];
                ishioka_aux_values(clm, m, kmax, x, cfg.grid.st[i], skip, &mut psi);
                let (ae, ao, be, bo) = ring_pair_weights(cfg, i, ws, ut_n, ut_s, up_n, up_s);
                for k in 0..=kmax {
                    if 2 * k <= nl + 1 {
                        vw[2 * (2 * k)] += ae * psi[k];
                        vw[2 * (2 * k) + 1] += be * psi[k];
                    }
                    if 2 * k + 1 <= nl + 1 {
                        let xp = x * psi[k];
                        vw[2 * (2 * k + 1)] += ao * xp;
                        vw[2 * (2 * k + 1) + 1] += bo * xp;
                    }
                }
            }
            ishioka_collect_sh2(cfg.x2lm_block(m), &mut vw, nl + 1);
        }
    }

    two_scal_to_vect(cfg.mx_van_block(m), cfg.l_2(), llim, m as i32, &vw, sl, tl);
}

/// Weighted even/odd ring-pair combinations for the two components.
#[inline]
#[allow(clippy::too_many_arguments)]
fn ring_pair_weights(
    cfg: &ShtConfig,
    i: usize,
    ws: f64,
    ut_n: &[Complex64],
    ut_s: &[Complex64],
    up_n: &[Complex64],
    up_s: &[Complex64],
) -> (Complex64, Complex64, Complex64, Complex64) {
    if cfg.grid.is_self_paired(i) {
        (ut_n[i] * ws, ZERO, up_n[i] * ws, ZERO)
    } else {
        (
            (ut_n[i] + ut_s[i]) * ws,
            (ut_n[i] - ut_s[i]) * ws,
            (up_n[i] + up_s[i]) * ws,
            (up_n[i] - up_s[i]) * ws,
        )
    }
}

/// Evaluate a packed coefficient set at one point (cos θ, φ) of a real
/// field.
pub fn sh_to_point(cfg: &ShtConfig, qlm: &[Complex64], cost: f64, phi: f64) -> f64 {
    debug_assert!(qlm.len() >= cfg.nlm());
    let lmax = cfg.lmax();
    let st = (1.0 - cost * cost).max(0.0).sqrt();
    let skip = cfg.skip_small();
    let mut y = vec![0.0; lmax + 1];

    let mut f = 0.0;
    for m in cfg.layout().orders() {
        let nl = lmax - m;
        legendre_values(cfg.alm_block(m), m, lmax, cost, st, skip, &mut y[..nl + 1]);
        let block = &qlm[cfg.layout().block_start(m)..];
        let mut acc = ZERO;
        for j in 0..=nl {
            acc += block[j] * y[j];
        }
        if m == 0 {
            f += acc.re;
        } else {
            let e = Complex64::from_polar(1.0, m as f64 * phi);
            f += 2.0 * (acc * e).re;
        }
    }
    f
}

// ---------------------------------------------------------------------------
// Whole-field drivers over packed spatial buffers
// ---------------------------------------------------------------------------

/// Doubles per hemisphere in packed spatial storage (complex rings,
/// padded).
#[inline]
pub fn hemi_stride(cfg: &ShtConfig) -> usize {
    cfg.grid.nlat_padded
}

/// Doubles per order block of a packed scalar spatial field.
#[inline]
pub fn scalar_block_len(cfg: &ShtConfig) -> usize {
    2 * hemi_stride(cfg)
}

/// Doubles per order block of a packed vector spatial field
/// (two components, hemisphere-paired each).
#[inline]
pub fn vector_block_len(cfg: &ShtConfig) -> usize {
    4 * hemi_stride(cfg)
}

fn write_rings(dst: &mut [f64], src: &[Complex64]) {
    for (i, v) in src.iter().enumerate() {
        dst[2 * i] = v.re;
        dst[2 * i + 1] = v.im;
    }
}

fn read_rings(src: &[f64], dst: &mut [Complex64]) {
    for (i, v) in dst.iter_mut().enumerate() {
        *v = Complex64::new(src[2 * i], src[2 * i + 1]);
    }
}

fn synthesize_block(cfg: &ShtConfig, m: usize, qlm: &[Complex64], block: &mut [f64]) {
    let n2 = cfg.grid.nlat_2;
    let hs = hemi_stride(cfg);
    let mut f_n = vec![ZERO; n2];
    let mut f_s = vec![ZERO; n2];
    synth_step(
        cfg,
        m,
        cfg.lmax(),
        &qlm[cfg.layout().block_start(m)..],
        &mut f_n,
        &mut f_s,
    );
    write_rings(&mut block[..], &f_n);
    write_rings(&mut block[hs..], &f_s);
    // Exact pole samples of non-axisymmetric modes must be zero.
    if cfg.grid.kind == GridKind::RegularPoles && m > 0 {
        zero_poles2(block, hs, 2);
    }
}

/// Synthesize a full scalar field into a packed spatial buffer: one
/// [`scalar_block_len`] block of doubles per order, hemispheres at
/// [`hemi_stride`].
pub fn synthesize(cfg: &ShtConfig, qlm: &[Complex64]) -> Vec<f64> {
    debug_assert!(qlm.len() >= cfg.nlm());
    let bl = scalar_block_len(cfg);
    let mut out = vec![0.0; (cfg.mmax() + 1) * bl];
    for (im, block) in out.chunks_mut(bl).enumerate() {
        synthesize_block(cfg, im * cfg.mres(), qlm, block);
    }
    out
}

/// Parallel version of [`synthesize`]: orders are distributed with rayon,
/// each writing its own disjoint block.
#[cfg(feature = "parallel")]
pub fn synthesize_parallel(cfg: &ShtConfig, qlm: &[Complex64]) -> Vec<f64> {
    use rayon::prelude::*;

    debug_assert!(qlm.len() >= cfg.nlm());
    let bl = scalar_block_len(cfg);
    let mut out = vec![0.0; (cfg.mmax() + 1) * bl];
    out.par_chunks_mut(bl).enumerate().for_each(|(im, block)| {
        synthesize_block(cfg, im * cfg.mres(), qlm, block);
    });
    out
}

/// Analyze a packed scalar spatial buffer back into coefficients.
pub fn analyze(cfg: &ShtConfig, spat: &[f64]) -> Vec<Complex64> {
    let bl = scalar_block_len(cfg);
    let hs = hemi_stride(cfg);
    let n2 = cfg.grid.nlat_2;
    debug_assert!(spat.len() >= (cfg.mmax() + 1) * bl);

    let mut qlm = vec![ZERO; cfg.nlm()];
    let mut f_n = vec![ZERO; n2];
    let mut f_s = vec![ZERO; n2];
    for im in 0..=cfg.mmax() {
        let m = im * cfg.mres();
        let block = &spat[im * bl..];
        read_rings(&block[..hs], &mut f_n);
        read_rings(&block[hs..], &mut f_s);
        anal_step(
            cfg,
            m,
            cfg.lmax(),
            &f_n,
            &f_s,
            &mut qlm[cfg.layout().block_start(m)..],
        );
    }
    qlm
}

fn synthesize_vector_block(
    cfg: &ShtConfig,
    m: usize,
    slm: &[Complex64],
    tlm: &[Complex64],
    block: &mut [f64],
) {
    let n2 = cfg.grid.nlat_2;
    let hs = hemi_stride(cfg);
    let start = cfg.layout().block_start(m);
    let mut ut_n = vec![ZERO; n2];
    let mut ut_s = vec![ZERO; n2];
    let mut up_n = vec![ZERO; n2];
    let mut up_s = vec![ZERO; n2];
    synth_vect_step(
        cfg,
        m,
        cfg.lmax(),
        &slm[start..],
        &tlm[start..],
        &mut ut_n,
        &mut ut_s,
        &mut up_n,
        &mut up_s,
    );
    write_rings(&mut block[..], &ut_n);
    write_rings(&mut block[hs..], &ut_s);
    write_rings(&mut block[2 * hs..], &up_n);
    write_rings(&mut block[3 * hs..], &up_s);
    // Tangential components are undefined at exact poles.
    if cfg.grid.kind == GridKind::RegularPoles {
        zero_poles4(block, 2 * hs, hs, 2);
    }
}

/// Synthesize a tangential vector field into a packed spatial buffer: one
/// [`vector_block_len`] block per order holding u_θ then u_φ, each as a
/// hemisphere pair.
pub fn synthesize_vector(cfg: &ShtConfig, slm: &[Complex64], tlm: &[Complex64]) -> Vec<f64> {
    debug_assert!(slm.len() >= cfg.nlm() && tlm.len() >= cfg.nlm());
    let bl = vector_block_len(cfg);
    let mut out = vec![0.0; (cfg.mmax() + 1) * bl];
    for (im, block) in out.chunks_mut(bl).enumerate() {
        synthesize_vector_block(cfg, im * cfg.mres(), slm, tlm, block);
    }
    out
}

/// Parallel version of [`synthesize_vector`].
#[cfg(feature = "parallel")]
pub fn synthesize_vector_parallel(
    cfg: &ShtConfig,
    slm: &[Complex64],
    tlm: &[Complex64],
) -> Vec<f64> {
    use rayon::prelude::*;

    debug_assert!(slm.len() >= cfg.nlm() && tlm.len() >= cfg.nlm());
    let bl = vector_block_len(cfg);
    let mut out = vec![0.0; (cfg.mmax() + 1) * bl];
    out.par_chunks_mut(bl).enumerate().for_each(|(im, block)| {
        synthesize_vector_block(cfg, im * cfg.mres(), slm, tlm, block);
    });
    out
}

/// Analyze a packed vector spatial buffer back into spheroidal/toroidal
/// coefficients.
pub fn analyze_vector(cfg: &ShtConfig, spat: &[f64]) -> (Vec<Complex64>, Vec<Complex64>) {
    let bl = vector_block_len(cfg);
    let hs = hemi_stride(cfg);
    let n2 = cfg.grid.nlat_2;
    debug_assert!(spat.len() >= (cfg.mmax() + 1) * bl);

    let mut slm = vec![ZERO; cfg.nlm()];
    let mut tlm = vec![ZERO; cfg.nlm()];
    let mut ut_n = vec![ZERO; n2];
    let mut ut_s = vec![ZERO; n2];
    let mut up_n = vec![ZERO; n2];
    let mut up_s = vec![ZERO; n2];
    for im in 0..=cfg.mmax() {
        let m = im * cfg.mres();
        let block = &spat[im * bl..];
        read_rings(&block[..hs], &mut ut_n);
        read_rings(&block[hs..], &mut ut_s);
        read_rings(&block[2 * hs..], &mut up_n);
        read_rings(&block[3 * hs..], &mut up_s);
        let start = cfg.layout().block_start(m);
        anal_vect_step(
            cfg,
            m,
            cfg.lmax(),
            &ut_n,
            &ut_s,
            &up_n,
            &up_s,
            &mut slm[start..],
            &mut tlm[start..],
        );
    }
    (slm, tlm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShtParams;
    use approx::assert_relative_eq;

    fn random_coeffs(cfg: &ShtConfig, seed: u64) -> Vec<Complex64> {
        let mut v = Vec::with_capacity(cfg.nlm());
        let mut x = seed;
        let mut next = || {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            (x >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
        };
        for lm in 0..cfg.nlm() {
            // m = 0 coefficients of a real field are real.
            let re = next();
            let im = if cfg.mi()[lm] == 0 { 0.0 } else { next() };
            v.push(Complex64::new(re, im));
        }
        v
    }

    #[test]
    fn test_scalar_round_trip_small() {
        let cfg = ShtConfig::new(ShtParams::new(15, 15, 1, 18)).unwrap();
        let qlm = random_coeffs(&cfg, 42);
        let spat = synthesize(&cfg, &qlm);
        let back = analyze(&cfg, &spat);
        for lm in 0..cfg.nlm() {
            assert_relative_eq!(back[lm].re, qlm[lm].re, epsilon = 1e-10, max_relative = 1e-9);
            assert_relative_eq!(back[lm].im, qlm[lm].im, epsilon = 1e-10, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_point_evaluation_matches_ring() {
        // sh_to_point at a grid ring with phi = 0 must agree with the
        // reconstruction from synthesized order modes.
        let cfg = ShtConfig::new(ShtParams::new(10, 10, 1, 12)).unwrap();
        let qlm = random_coeffs(&cfg, 7);
        let spat = synthesize(&cfg, &qlm);

        let i = 2; // some northern ring
        let mut from_modes = 0.0;
        for im in 0..=cfg.mmax() {
            let block = &spat[im * scalar_block_len(&cfg)..];
            let v = Complex64::new(block[2 * i], block[2 * i + 1]);
            from_modes += if im == 0 { v.re } else { 2.0 * v.re };
        }
        let direct = sh_to_point(&cfg, &qlm, cfg.grid.ct[i], 0.0);
        assert_relative_eq!(direct, from_modes, epsilon = 1e-10, max_relative = 1e-9);
    }
}
