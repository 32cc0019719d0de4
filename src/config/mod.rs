//! Transform configuration: validated parameters, precomputed tables.
//!
//! `ShtConfig::new` validates the requested truncation and grid, then
//! builds every coefficient table once. The configuration is immutable
//! afterwards and is shared read-only by all transform calls (`&self`
//! everywhere); engine routines never allocate or mutate shared state, so
//! any number of threads may transform concurrently with one config.

use crate::grid::{Grid, GridKind};
use crate::kernel::SHT_ACCURACY;
use crate::tables::{
    build_alm, build_clm, build_l2, build_mx_stdt, build_mx_van, build_xlm, seed_amm,
};
use crate::types::LmLayout;
use std::f64::consts::PI;
use thiserror::Error;

/// The default polar optimization threshold (0 disables, 1e-6 is
/// aggressive, 1e-10 is safe, 1e-14 is very safe).
pub const SHT_DEFAULT_POLAR_OPT: f64 = 1.0e-10;

/// Spherical harmonic normalization convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// Orthonormal: ∫ |Y_lm|² dΩ = 1.
    Orthonormal,
    /// 4π-normalized (geodesy): ∫ |Y_lm|² dΩ = 4π.
    FourPi,
    /// Schmidt semi-normalized: ∫ |Y_lm|² dΩ = 4π/(2l+1).
    Schmidt,
}

/// Legendre recurrence scheme, selected at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecurrenceScheme {
    /// Classic three-term recurrence over `alm`/`blm`.
    Classic,
    /// Ishioka two-term recurrence over `clm` with the `xlm`/`x2lm`
    /// basis change: stabler and shorter at high degree.
    Ishioka,
}

/// Configuration-construction errors.
#[derive(Debug, Error)]
pub enum ShtError {
    /// Truncation degree too small to be useful.
    #[error("lmax must be at least 2, got {0}")]
    DegreeTooSmall(usize),

    /// The order periodicity must be positive.
    #[error("mres must be at least 1")]
    InvalidMres,

    /// Orders must not exceed the degree truncation.
    #[error("largest order {order} exceeds lmax {lmax}")]
    OrderExceedsDegree { order: usize, lmax: usize },

    /// Not enough latitude rings for the requested truncation.
    #[error("nlat = {nlat} is too small for lmax = {lmax}: need at least lmax + 2")]
    GridTooSmall { nlat: usize, lmax: usize },

    /// Gauss grids pair every ring with its mirror.
    #[error("Gauss grid needs an even number of rings, got {0}")]
    OddGaussGrid(usize),

    /// Pole-inclusive grids need both poles and at least one interior ring.
    #[error("pole-inclusive grid needs at least 3 rings, got {0}")]
    PoleGridTooSmall(usize),

    /// Nonsensical polar optimization threshold.
    #[error("polar threshold must be in [0, 1e-3], got {0}")]
    InvalidPolarThreshold(f64),
}

/// Requested transform parameters.
#[derive(Clone, Copy, Debug)]
pub struct ShtParams {
    /// Maximum degree.
    pub lmax: usize,
    /// Number of non-zero orders (largest order is `mmax * mres`).
    pub mmax: usize,
    /// Order periodicity.
    pub mres: usize,
    /// Number of latitude rings.
    pub nlat: usize,
    /// Colatitude grid family.
    pub grid: GridKind,
    /// Normalization convention.
    pub norm: Normalization,
    /// Include the Condon-Shortley phase (-1)^m in the basis.
    pub condon_shortley: bool,
    /// Polar optimization threshold; 0 disables the optimization and the
    /// engine walks the full recurrence everywhere.
    pub polar_opt: f64,
    /// Recurrence scheme.
    pub scheme: RecurrenceScheme,
}

impl ShtParams {
    /// Parameters with the default grid (Gauss), orthonormal basis, no
    /// Condon-Shortley phase, the default polar threshold and the classic
    /// recurrence.
    pub fn new(lmax: usize, mmax: usize, mres: usize, nlat: usize) -> Self {
        Self {
            lmax,
            mmax,
            mres,
            nlat,
            grid: GridKind::Gauss,
            norm: Normalization::Orthonormal,
            condon_shortley: false,
            polar_opt: SHT_DEFAULT_POLAR_OPT,
            scheme: RecurrenceScheme::Classic,
        }
    }
}

/// A validated transform configuration owning all precomputed tables.
pub struct ShtConfig {
    params: ShtParams,
    /// User-facing coefficient layout (degrees up to `lmax`).
    layout: LmLayout,
    /// Internal table layout, two degrees past the truncation so vector
    /// transforms can reach the ghost degree `lmax + 1`.
    tbl: LmLayout,
    /// Grid arrays.
    pub grid: Grid,
    /// Polar truncation: rings `0..tm[im]` (from the pole) carry no
    /// significant contribution for order block `im`.
    pub tm: Vec<usize>,
    alm: Vec<f64>,
    blm: Vec<f64>,
    mx_stdt: Vec<f64>,
    mx_van: Vec<f64>,
    l_2: Vec<f64>,
    clm: Vec<f64>,
    xlm: Vec<f64>,
    x2lm: Vec<f64>,
    li: Vec<u32>,
    mi: Vec<u32>,
    /// 1/Y_00: converts the mean value to the degree-zero coefficient.
    pub y00_1: f64,
    /// Coefficient of cos θ in Y_10.
    pub y10_ct: f64,
    /// Coefficient of sin θ in Y_11.
    pub y11_st: f64,
}

/// Per-degree scale of the basis relative to orthonormal.
fn norm_scale(norm: Normalization, l: usize) -> f64 {
    match norm {
        Normalization::Orthonormal => 1.0,
        Normalization::FourPi => (4.0 * PI).sqrt(),
        Normalization::Schmidt => (4.0 * PI / (2 * l + 1) as f64).sqrt(),
    }
}

impl ShtConfig {
    /// Validate the parameters and build all tables.
    pub fn new(params: ShtParams) -> Result<Self, ShtError> {
        if params.lmax < 2 {
            return Err(ShtError::DegreeTooSmall(params.lmax));
        }
        if params.mres < 1 {
            return Err(ShtError::InvalidMres);
        }
        if params.mmax * params.mres > params.lmax {
            return Err(ShtError::OrderExceedsDegree {
                order: params.mmax * params.mres,
                lmax: params.lmax,
            });
        }
        if params.nlat < params.lmax + 2 {
            return Err(ShtError::GridTooSmall {
                nlat: params.nlat,
                lmax: params.lmax,
            });
        }
        match params.grid {
            GridKind::Gauss => {
                if params.nlat % 2 != 0 {
                    return Err(ShtError::OddGaussGrid(params.nlat));
                }
            }
            GridKind::RegularPoles => {
                if params.nlat < 3 {
                    return Err(ShtError::PoleGridTooSmall(params.nlat));
                }
            }
        }
        if !(0.0..=1.0e-3).contains(&params.polar_opt) {
            return Err(ShtError::InvalidPolarThreshold(params.polar_opt));
        }

        let layout = LmLayout::new(params.lmax, params.mmax, params.mres);
        let tbl = LmLayout::new(params.lmax + 2, params.mmax, params.mres);
        let grid = Grid::build(params.grid, params.nlat);

        // Per-degree scales: synthesis uses s_l, analysis its inverse, so
        // that analysis∘synthesis is the identity in any convention.
        let ns = tbl.lmax() + 2;
        let s: Vec<f64> = (0..ns).map(|l| norm_scale(params.norm, l)).collect();
        let z: Vec<f64> = s.iter().map(|v| 1.0 / v).collect();

        let alm = build_alm(&tbl, &s, params.condon_shortley);
        let blm = match params.norm {
            Normalization::Orthonormal => alm.clone(),
            _ => build_alm(&tbl, &z, params.condon_shortley),
        };
        let mx_stdt = build_mx_stdt(&tbl, &s);
        let mx_van = build_mx_van(&tbl, &z);
        let l_2 = build_l2(tbl.lmax());

        let (clm, xlm, x2lm) = match params.scheme {
            RecurrenceScheme::Classic => (Vec::new(), Vec::new(), Vec::new()),
            RecurrenceScheme::Ishioka => {
                let clm = build_clm(&tbl, &alm);
                let xlm = build_xlm(&tbl, &alm, &clm);
                let x2lm = match params.norm {
                    Normalization::Orthonormal => xlm.clone(),
                    _ => build_xlm(&tbl, &blm, &clm),
                };
                (clm, xlm, x2lm)
            }
        };

        let tm = compute_tm(&layout, &tbl, &alm, &grid, params.polar_opt);

        let mut li = Vec::with_capacity(layout.nlm());
        let mut mi = Vec::with_capacity(layout.nlm());
        for (l, m, _) in layout.modes() {
            li.push(l as u32);
            mi.push(m as u32);
        }

        let y00 = seed_amm(0, params.condon_shortley) * s[0];
        let y10_ct = 3.0_f64.sqrt() * seed_amm(0, params.condon_shortley) * s[1];
        let y11_st = seed_amm(1, params.condon_shortley) * s[1];

        Ok(Self {
            params,
            layout,
            tbl,
            grid,
            tm,
            alm,
            blm,
            mx_stdt,
            mx_van,
            l_2,
            clm,
            xlm,
            x2lm,
            li,
            mi,
            y00_1: 1.0 / y00,
            y10_ct,
            y11_st,
        })
    }

    /// Maximum degree.
    #[inline]
    pub fn lmax(&self) -> usize {
        self.params.lmax
    }

    /// Number of non-zero orders.
    #[inline]
    pub fn mmax(&self) -> usize {
        self.params.mmax
    }

    /// Order periodicity.
    #[inline]
    pub fn mres(&self) -> usize {
        self.params.mres
    }

    /// Number of latitude rings.
    #[inline]
    pub fn nlat(&self) -> usize {
        self.params.nlat
    }

    /// Total number of (l, m) modes.
    #[inline]
    pub fn nlm(&self) -> usize {
        self.layout.nlm()
    }

    /// Normalization convention.
    #[inline]
    pub fn norm(&self) -> Normalization {
        self.params.norm
    }

    /// Recurrence scheme.
    #[inline]
    pub fn scheme(&self) -> RecurrenceScheme {
        self.params.scheme
    }

    /// Polar optimization threshold.
    #[inline]
    pub fn polar_opt(&self) -> f64 {
        self.params.polar_opt
    }

    /// Whether the engine may skip sub-threshold near-pole contributions.
    #[inline]
    pub fn skip_small(&self) -> bool {
        self.params.polar_opt > 0.0
    }

    /// User-facing coefficient layout.
    #[inline]
    pub fn layout(&self) -> &LmLayout {
        &self.layout
    }

    /// Degree of each packed mode.
    #[inline]
    pub fn li(&self) -> &[u32] {
        &self.li
    }

    /// Order of each packed mode.
    #[inline]
    pub fn mi(&self) -> &[u32] {
        &self.mi
    }

    /// Precomputed 1/(l(l+1)) (index by absolute degree; entry 0 is 0).
    #[inline]
    pub fn l_2(&self) -> &[f64] {
        &self.l_2
    }

    /// Synthesis recurrence block for order `m`.
    #[inline]
    pub fn alm_block(&self, m: usize) -> &[f64] {
        &self.alm[self.tbl.alm_index(m)..]
    }

    /// Analysis recurrence block for order `m`.
    #[inline]
    pub fn blm_block(&self, m: usize) -> &[f64] {
        &self.blm[self.tbl.alm_index(m)..]
    }

    /// sin θ·d/dθ coupling block for order `m` (synthesis direction).
    #[inline]
    pub fn mx_stdt_block(&self, m: usize) -> &[f64] {
        &self.mx_stdt[self.tbl.alm_index(m)..]
    }

    /// sin θ·d/dθ + 2cos θ coupling block for order `m` (analysis
    /// reduction).
    #[inline]
    pub fn mx_van_block(&self, m: usize) -> &[f64] {
        &self.mx_van[self.tbl.alm_index(m)..]
    }

    /// Auxiliary recurrence block for order `m` (Ishioka scheme only).
    #[inline]
    pub fn clm_block(&self, m: usize) -> &[f64] {
        &self.clm[self.tbl.clm_index(m)..]
    }

    /// Synthesis basis-change block for order `m` (Ishioka scheme only).
    #[inline]
    pub fn xlm_block(&self, m: usize) -> &[f64] {
        &self.xlm[self.tbl.xlm_index(m)..]
    }

    /// Analysis basis-change block for order `m` (Ishioka scheme only).
    #[inline]
    pub fn x2lm_block(&self, m: usize) -> &[f64] {
        &self.x2lm[self.tbl.xlm_index(m)..]
    }
}

/// Polar truncation start per order block: the first ring (from the pole)
/// where any degree of the order rises above the threshold. The criterion
/// scans the actual recurrence values, not just the seed: for lmax >> m
/// high degrees become significant well before y_mm does. With the
/// optimization disabled every ring participates.
fn compute_tm(
    layout: &LmLayout,
    tbl: &LmLayout,
    alm: &[f64],
    grid: &Grid,
    polar_opt: f64,
) -> Vec<usize> {
    let mut tm = vec![0usize; layout.mmax() + 1];
    if polar_opt <= 0.0 {
        return tm;
    }
    let llim = layout.lmax() + 1; // include the vector ghost degree
    let mut y = vec![0.0; llim + 1];
    for (im, m) in layout.orders().enumerate() {
        let blk = &alm[tbl.alm_index(m)..];
        let mut t = 0;
        for i in 0..grid.nlat_2 {
            crate::kernel::legendre_values(
                blk,
                m,
                llim,
                grid.ct[i],
                grid.st[i],
                true,
                &mut y[..llim - m + 1],
            );
            let maxv = y[..llim - m + 1]
                .iter()
                .fold(0.0_f64, |acc, v| acc.max(v.abs()));
            if maxv >= polar_opt {
                break;
            }
            t = i + 1;
        }
        tm[im] = t;
    }
    tm
}

/// Re-export of the engine accuracy floor, part of the documented
/// configuration policy.
pub const POLAR_ACCURACY_FLOOR: f64 = SHT_ACCURACY;
