//! Strongly-typed indices and spectral storage layout.
//!
//! - Index newtypes keep latitude ring indices and packed mode indices
//!   from being mixed up.
//! - [`LmLayout`] computes every block offset used by the coefficient
//!   tables from explicit parameters, replacing ad-hoc index arithmetic.

mod indices;
mod layout;

pub use indices::{LatIndex, LmIndex};
pub use layout::LmLayout;
