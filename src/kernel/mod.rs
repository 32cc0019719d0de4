//! Transform kernels: recurrence engines and coefficient reorganization.
//!
//! Everything here is a pure function over caller-supplied buffers and
//! read-only coefficient table slices: no allocation, no hidden state, no
//! synchronization. Multiple threads may call any kernel concurrently on
//! disjoint output ranges sharing the same tables. Preconditions (degree
//! ranges, buffer sizes) are the caller's responsibility and are checked
//! with `debug_assert!` only.

mod ishioka;
mod recurrence;
mod reorg;

pub use ishioka::{
    ishioka_aux_values, ishioka_collect_sh, ishioka_collect_sh2, ishioka_to_sh,
    ishioka_to_sh2, ishioka_to_sh_in_place, sh2_to_ishioka, sh_to_ishioka,
    sh_to_ishioka_in_place,
};
pub use recurrence::{legendre_values, SHT_ACCURACY, SHT_L_RESCALE, SHT_SCALE_FACTOR};
pub use reorg::{
    sph_to_2scal, tor_to_2scal, two_scal_to_vect, vect_to_2scal, vect_to_2scal_alt,
    vect_to_2scal_alt_scalar,
};
