//! Recurrence coefficient table construction.
//!
//! All tables are built once per configuration and shared read-only by
//! every transform call:
//! - `alm`/`blm`: classic three-term recurrence coefficients (synthesis /
//!   analysis normalization)
//! - `clm`: two-term auxiliary recurrence coefficients (Ishioka scheme)
//! - `xlm`/`x2lm`: basis-change triplets between the Legendre and
//!   auxiliary chains
//! - `mx_stdt`/`mx_van`: sparse sin θ·d/dθ couplings for vector transforms
//! - `l_2`: precomputed 1/(l(l+1))

mod coupling;
mod ishioka;
mod recurrence;

pub use coupling::{build_l2, build_mx_stdt, build_mx_van};
pub use ishioka::{build_clm, build_xlm};
pub use recurrence::{build_alm, seed_amm};
