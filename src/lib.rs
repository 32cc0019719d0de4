//! # sht-rs
//!
//! Spherical Harmonic Transform kernels for numerical simulation codes
//! (geodynamo, fluid dynamics, geophysics).
//!
//! This crate is the Legendre-transform core of an SHT pipeline:
//! - Recurrence-based evaluation of associated Legendre functions, both
//!   the classic three-term scheme and the stable two-term Ishioka
//!   scheme, with extended-range rescaling at high degree
//! - Scalar ↔ vector coefficient reorganization (spheroidal/toroidal
//!   pairs through the sparse sin θ·d/dθ couplings)
//! - Ishioka-basis pre/post processing of coefficient sequences
//! - Colatitude grids (Gauss, pole-inclusive regular), polar truncation
//!   and pole zeroing
//! - Per-order transform steps and whole-field drivers
//!
//! Fourier integration along longitude, GPU offload and thread
//! orchestration belong to the surrounding pipeline; the kernels here are
//! pure functions over caller buffers and shared read-only tables, safe
//! to call from any number of threads on disjoint outputs.
//!
//! # Example
//!
//! ```
//! use sht_rs::{ShtConfig, ShtParams};
//! use num_complex::Complex64;
//!
//! let cfg = ShtConfig::new(ShtParams::new(15, 15, 1, 18)).unwrap();
//! let mut qlm = vec![Complex64::new(0.0, 0.0); cfg.nlm()];
//! qlm[cfg.layout().lm_index(2, 0).get()] = Complex64::new(1.0, 0.0);
//!
//! let spat = sht_rs::transform::synthesize(&cfg, &qlm);
//! let back = sht_rs::transform::analyze(&cfg, &spat);
//! assert!((back[cfg.layout().lm_index(2, 0).get()].re - 1.0).abs() < 1e-12);
//! ```

pub mod config;
pub mod grid;
pub mod kernel;
pub mod polynomial;
pub mod tables;
pub mod transform;
pub mod types;

// Re-export main types for convenience
pub use config::{
    Normalization, RecurrenceScheme, ShtConfig, ShtError, ShtParams, SHT_DEFAULT_POLAR_OPT,
};
pub use grid::{zero_mem, zero_poles2, zero_poles4, Grid, GridKind};
pub use kernel::{
    ishioka_aux_values, ishioka_collect_sh, ishioka_collect_sh2, ishioka_to_sh, ishioka_to_sh2,
    ishioka_to_sh_in_place, legendre_values, sh2_to_ishioka, sh_to_ishioka,
    sh_to_ishioka_in_place, sph_to_2scal, tor_to_2scal, two_scal_to_vect, vect_to_2scal,
    vect_to_2scal_alt, vect_to_2scal_alt_scalar, SHT_ACCURACY, SHT_L_RESCALE, SHT_SCALE_FACTOR,
};
pub use transform::{
    anal_step, anal_vect_step, analyze, analyze_vector, sh_to_point, synth_sph_step, synth_step,
    synth_tor_step, synth_vect_step, synthesize, synthesize_vector,
};
#[cfg(feature = "parallel")]
pub use transform::{synthesize_parallel, synthesize_vector_parallel};
pub use types::{LatIndex, LmIndex, LmLayout};
