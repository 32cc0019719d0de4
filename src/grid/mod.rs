//! Colatitude grids and per-latitude arrays.
//!
//! A grid owns the per-ring sample data shared read-only by all transform
//! calls: cos θ, sin θ, 1/sin θ and the quadrature weights (which carry
//! the 2π azimuthal factor, so a scalar analysis step is the exact inverse
//! of synthesis on a Gauss grid). Rings are indexed from the north pole;
//! ring `i` pairs with its mirror `nlat-1-i` and only the northern half is
//! stored; the southern hemisphere is reached through the parity of the
//! basis functions, never through duplicated arrays.

mod poles;

pub use poles::{
    zero_mem, zero_mem_scalar, zero_poles2, zero_poles2_scalar, zero_poles4, zero_poles4_scalar,
};

use crate::polynomial::{gauss_legendre_nodes, gauss_legendre_weights};
use std::f64::consts::PI;

/// Colatitude grid family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridKind {
    /// Gauss-Legendre rings: no pole points, exact quadrature up to
    /// polynomial degree 2·nlat-1. The grid for analysis work.
    Gauss,
    /// Equiangular rings including both poles (θ = 0 and θ = π), with
    /// Clenshaw-Curtis weights. Synthesis-oriented; analysis is exact
    /// only up to degree nlat-2.
    RegularPoles,
}

/// Per-latitude grid arrays, immutable after construction.
#[derive(Clone, Debug)]
pub struct Grid {
    /// Grid family.
    pub kind: GridKind,
    /// Number of rings.
    pub nlat: usize,
    /// Rings per hemisphere: (nlat+1)/2 (odd nlat puts a ring on the
    /// equator, which is its own mirror).
    pub nlat_2: usize,
    /// Ring count padded for vector-friendly spatial storage.
    pub nlat_padded: usize,
    /// cos θ per northern ring, decreasing from the pole.
    pub ct: Vec<f64>,
    /// sin θ per northern ring.
    pub st: Vec<f64>,
    /// 1/sin θ per northern ring; exactly 0.0 at a pole point so that
    /// undefined pole values never propagate (pole samples are zeroed
    /// explicitly, see `zero_poles2`/`zero_poles4`).
    pub st_1: Vec<f64>,
    /// Quadrature weight per northern ring, including the 2π azimuthal
    /// factor. The mirror ring carries the same weight.
    pub wg: Vec<f64>,
}

impl Grid {
    /// Build the grid arrays. `nlat` must be even for `Gauss` and at
    /// least 3 for `RegularPoles` (validated by the configuration layer).
    pub fn build(kind: GridKind, nlat: usize) -> Self {
        match kind {
            GridKind::Gauss => Self::build_gauss(nlat),
            GridKind::RegularPoles => Self::build_regular_poles(nlat),
        }
    }

    fn build_gauss(nlat: usize) -> Self {
        assert!(nlat >= 2 && nlat % 2 == 0, "Gauss grid needs an even nlat");
        let nodes = gauss_legendre_nodes(nlat);
        let weights = gauss_legendre_weights(nlat, &nodes);
        let nlat_2 = nlat / 2;

        let mut ct = Vec::with_capacity(nlat_2);
        let mut st = Vec::with_capacity(nlat_2);
        let mut st_1 = Vec::with_capacity(nlat_2);
        let mut wg = Vec::with_capacity(nlat_2);
        for i in 0..nlat_2 {
            // Ring i from the north pole has the i-th largest node.
            let x = nodes[nlat - 1 - i];
            let s = (1.0 - x * x).sqrt();
            ct.push(x);
            st.push(s);
            st_1.push(1.0 / s);
            wg.push(weights[nlat - 1 - i] * 2.0 * PI);
        }

        Self {
            kind: GridKind::Gauss,
            nlat,
            nlat_2,
            nlat_padded: nlat.next_multiple_of(4),
            ct,
            st,
            st_1,
            wg,
        }
    }

    fn build_regular_poles(nlat: usize) -> Self {
        assert!(nlat >= 3, "pole-inclusive grid needs at least 3 rings");
        let nlat_2 = nlat.div_ceil(2);
        let n1 = nlat - 1;

        let mut ct = Vec::with_capacity(nlat_2);
        let mut st = Vec::with_capacity(nlat_2);
        let mut st_1 = Vec::with_capacity(nlat_2);
        let mut wg = Vec::with_capacity(nlat_2);
        for j in 0..nlat_2 {
            let theta = PI * j as f64 / n1 as f64;
            let (s, x) = theta.sin_cos();
            ct.push(x);
            st.push(s);
            st_1.push(if j == 0 { 0.0 } else { 1.0 / s });
            wg.push(clenshaw_curtis_weight(nlat, j) * 2.0 * PI);
        }

        Self {
            kind: GridKind::RegularPoles,
            nlat,
            nlat_2,
            nlat_padded: nlat.next_multiple_of(4),
            ct,
            st,
            st_1,
            wg,
        }
    }

    /// Whether ring `i` of the northern half is an exact pole point.
    #[inline]
    pub fn is_pole(&self, i: usize) -> bool {
        self.kind == GridKind::RegularPoles && i == 0
    }

    /// Whether ring `i` is its own mirror (equator ring of an odd grid).
    #[inline]
    pub fn is_self_paired(&self, i: usize) -> bool {
        self.nlat % 2 == 1 && i == self.nlat_2 - 1
    }
}

/// Clenshaw-Curtis weight for node j of an nlat-point rule on [-1, 1]
/// with x_j = cos(π j/(nlat-1)).
fn clenshaw_curtis_weight(nlat: usize, j: usize) -> f64 {
    let n1 = nlat - 1;
    let c = if j == 0 || j == n1 { 1.0 } else { 2.0 };
    let theta = PI * j as f64 / n1 as f64;
    let mut sum = 1.0;
    for k in 1..=n1 / 2 {
        let e = if 2 * k == n1 { 0.5 } else { 1.0 };
        sum -= 2.0 * e / ((4 * k * k - 1) as f64) * (2.0 * k as f64 * theta).cos();
    }
    c / n1 as f64 * sum
}
