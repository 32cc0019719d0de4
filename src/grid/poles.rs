//! Pole zeroing and buffer clearing kernels.
//!
//! Vector spatial fields are divided by sin θ, which is undefined exactly
//! at the poles; grids that include pole points (`GridKind::RegularPoles`)
//! must have those samples zeroed before the values can propagate into
//! spectral coefficients. The kernels operate on raw double buffers at
//! caller-computed offsets: `ofs1` is the hemisphere stride, `ofsm` the
//! field stride.
//!
//! Scalar implementations are always available; with the `simd` feature
//! the zeroing is dispatched through `pulp`.

#[cfg(feature = "simd")]
use pulp::{Arch, Simd, WithSimd};

/// Zero the first `n` doubles of `f0` (scalar reference).
pub fn zero_mem_scalar(f0: &mut [f64], n: usize) {
    debug_assert!(f0.len() >= n);
    for v in &mut f0[..n] {
        *v = 0.0;
    }
}

/// Zero `n` doubles at offset 0 and at offset `ofsm` (scalar reference).
pub fn zero_poles2_scalar(f0: &mut [f64], ofsm: usize, n: usize) {
    debug_assert!(ofsm >= n && f0.len() >= ofsm + n);
    let (a, b) = f0.split_at_mut(ofsm);
    zero_mem_scalar(a, n);
    zero_mem_scalar(b, n);
}

/// Zero `n` doubles at offsets 0, `ofs1`, `ofsm` and `ofsm + ofs1`
/// (scalar reference). Used for two fields with hemisphere-paired
/// storage: `ofs1` separates the hemispheres, `ofsm` the fields.
pub fn zero_poles4_scalar(f0: &mut [f64], ofsm: usize, ofs1: usize, n: usize) {
    debug_assert!(ofs1 >= n && ofsm >= ofs1 + n);
    debug_assert!(f0.len() >= ofsm + ofs1 + n);
    let (a, b) = f0.split_at_mut(ofsm);
    zero_poles2_scalar(a, ofs1, n);
    zero_poles2_scalar(b, ofs1, n);
}

#[cfg(feature = "simd")]
mod simd_impl {
    use super::*;

    #[inline]
    pub fn zero_simd_inner<S: Simd>(simd: S, buf: &mut [f64]) {
        let zero = simd.f64s_splat(0.0);
        let (head, tail) = S::f64s_as_mut_simd(buf);
        for v in head.iter_mut() {
            *v = zero;
        }
        for v in tail.iter_mut() {
            *v = 0.0;
        }
    }
}

#[cfg(feature = "simd")]
struct ZeroImpl<'a> {
    buf: &'a mut [f64],
}

#[cfg(feature = "simd")]
impl WithSimd for ZeroImpl<'_> {
    type Output = ();

    #[inline(always)]
    fn with_simd<S: Simd>(self, simd: S) -> Self::Output {
        simd_impl::zero_simd_inner(simd, self.buf);
    }
}

/// Zero the first `n` doubles of `f0`.
#[cfg(feature = "simd")]
pub fn zero_mem(f0: &mut [f64], n: usize) {
    debug_assert!(f0.len() >= n);
    Arch::new().dispatch(ZeroImpl { buf: &mut f0[..n] });
}

/// Zero the first `n` doubles of `f0`.
#[cfg(not(feature = "simd"))]
pub fn zero_mem(f0: &mut [f64], n: usize) {
    zero_mem_scalar(f0, n);
}

/// Zero `n` doubles at offset 0 and at offset `ofsm`.
pub fn zero_poles2(f0: &mut [f64], ofsm: usize, n: usize) {
    debug_assert!(ofsm >= n && f0.len() >= ofsm + n);
    let (a, b) = f0.split_at_mut(ofsm);
    zero_mem(a, n);
    zero_mem(b, n);
}

/// Zero `n` doubles at offsets 0, `ofs1`, `ofsm` and `ofsm + ofs1`.
pub fn zero_poles4(f0: &mut [f64], ofsm: usize, ofs1: usize, n: usize) {
    debug_assert!(ofs1 >= n && ofsm >= ofs1 + n);
    debug_assert!(f0.len() >= ofsm + ofs1 + n);
    let (a, b) = f0.split_at_mut(ofsm);
    zero_poles2(a, ofs1, n);
    zero_poles2(b, ofs1, n);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_poles2_offsets() {
        let mut buf = vec![1.0; 200];
        zero_poles2(&mut buf, 100, 4);
        for i in 0..200 {
            let expected = if i < 4 || (100..104).contains(&i) {
                0.0
            } else {
                1.0
            };
            assert_eq!(buf[i], expected, "offset {}", i);
        }
    }

    #[test]
    fn test_zero_poles4_offsets() {
        let mut buf = vec![1.0; 64];
        zero_poles4(&mut buf, 32, 16, 3);
        for i in 0..64 {
            let zeroed = i < 3
                || (16..19).contains(&i)
                || (32..35).contains(&i)
                || (48..51).contains(&i);
            assert_eq!(buf[i], if zeroed { 0.0 } else { 1.0 }, "offset {}", i);
        }
    }

    #[test]
    fn test_zero_mem_partial() {
        let mut buf = vec![2.0; 13];
        zero_mem(&mut buf, 11);
        assert!(buf[..11].iter().all(|&v| v == 0.0));
        assert!(buf[11..].iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_simd_matches_scalar() {
        let mut a = vec![3.0; 37];
        let mut b = vec![3.0; 37];
        zero_mem(&mut a, 29);
        zero_mem_scalar(&mut b, 29);
        assert_eq!(a, b);
    }
}
