//! Packed spectral storage layout.
//!
//! Spherical harmonic coefficients are stored as a flat sequence indexed by
//! a packed mode index `lm`: the order `m` varies slowest (in steps of
//! `mres`), and within a fixed-`m` block the degree `l` runs from `m` to
//! `lmax`. All coefficient tables (`alm`, `blm`, `clm`, `xlm`, `mx`) use
//! block offsets derived from the same layout, computed here by small pure
//! functions instead of index macros.

use super::LmIndex;

/// Index layout for packed (degree, order) spectral storage.
///
/// # Example
///
/// ```
/// use sht_rs::types::LmLayout;
///
/// let layout = LmLayout::new(15, 15, 1);
/// assert_eq!(layout.nlm(), 136); // (lmax+1)(lmax+2)/2 for mmax = lmax
/// assert_eq!(layout.lm_index(3, 2).get(), layout.block_start(2) + 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LmLayout {
    lmax: usize,
    mmax: usize,
    mres: usize,
}

impl LmLayout {
    /// Create a layout for degrees `0..=lmax` and orders `0, mres, ..., mmax*mres`.
    ///
    /// `mmax` counts the number of non-zero orders, so the largest order is
    /// `mmax * mres`.
    pub fn new(lmax: usize, mmax: usize, mres: usize) -> Self {
        assert!(mres >= 1, "mres must be at least 1");
        assert!(mmax * mres <= lmax, "largest order must not exceed lmax");
        Self { lmax, mmax, mres }
    }

    /// Maximum degree.
    #[inline]
    pub const fn lmax(&self) -> usize {
        self.lmax
    }

    /// Number of non-zero orders.
    #[inline]
    pub const fn mmax(&self) -> usize {
        self.mmax
    }

    /// Order periodicity.
    #[inline]
    pub const fn mres(&self) -> usize {
        self.mres
    }

    /// Block number for order `m` (which must be a multiple of `mres`).
    #[inline]
    pub fn im(&self, m: usize) -> usize {
        debug_assert!(m % self.mres == 0, "order must be a multiple of mres");
        m / self.mres
    }

    /// First packed index of the fixed-`m` block containing order `m`.
    #[inline]
    pub fn block_start(&self, m: usize) -> usize {
        let im = self.im(m);
        im * (self.lmax + 1) - self.mres * (im * im.saturating_sub(1)) / 2
    }

    /// Number of degrees stored in the block of order `m` (`lmax - m + 1`).
    #[inline]
    pub fn block_len(&self, m: usize) -> usize {
        self.lmax - m + 1
    }

    /// Total number of (l, m) modes.
    #[inline]
    pub fn nlm(&self) -> usize {
        let im = self.mmax + 1;
        im * (self.lmax + 1) - self.mres * (im * (im - 1)) / 2
    }

    /// Packed index of mode (l, m). Requires `m <= l <= lmax`.
    #[inline]
    pub fn lm_index(&self, l: usize, m: usize) -> LmIndex {
        debug_assert!(m <= l && l <= self.lmax);
        LmIndex::new(self.block_start(m) + (l - m))
    }

    /// Offset of the order-`m` block in the `alm`/`blm`/`mx` tables
    /// (two doubles per mode): `im*(2*(lmax+1) - (im-1)*mres)`.
    #[inline]
    pub fn alm_index(&self, m: usize) -> usize {
        let im = self.im(m);
        im * (2 * (self.lmax + 1) - im.saturating_sub(1) * self.mres)
    }

    /// Total length of an `alm`-shaped table.
    #[inline]
    pub fn alm_len(&self) -> usize {
        2 * self.nlm()
    }

    /// Offset of the order-`m` block in the `xlm`/`x2lm` tables
    /// (three doubles per two degrees): `3*im*(2*(lmax+4) - m + mres)/4`.
    #[inline]
    pub fn xlm_index(&self, m: usize) -> usize {
        let im = self.im(m);
        3 * im * (2 * (self.lmax + 4) - m + self.mres) / 4
    }

    /// Total length of an `xlm`-shaped table.
    #[inline]
    pub fn xlm_len(&self) -> usize {
        // One block past the last order.
        let im = self.mmax + 1;
        let m = im * self.mres;
        3 * im * (2 * (self.lmax + 4) + self.mres - m) / 4
    }

    /// Offset of the order-`m` block in the `clm` table (per-order seed
    /// value followed by coefficient pairs for the auxiliary recurrence).
    #[inline]
    pub fn clm_index(&self, m: usize) -> usize {
        let im = self.im(m);
        im * (self.lmax + 6) - self.mres * (im * im.saturating_sub(1)) / 2
    }

    /// Total length of a `clm`-shaped table.
    #[inline]
    pub fn clm_len(&self) -> usize {
        let im = self.mmax + 1;
        im * (self.lmax + 6) - self.mres * (im * (im - 1)) / 2
    }

    /// Iterate over all stored orders `0, mres, ..., mmax*mres`.
    pub fn orders(&self) -> impl Iterator<Item = usize> + '_ {
        (0..=self.mmax).map(move |im| im * self.mres)
    }

    /// Iterate over all modes as `(l, m, lm)` in packed storage order.
    pub fn modes(&self) -> impl Iterator<Item = (usize, usize, LmIndex)> + '_ {
        let this = *self;
        (0..=this.mmax).map(move |im| im * this.mres).flat_map(move |m| {
            let start = this.block_start(m);
            (m..=this.lmax).map(move |l| (l, m, LmIndex::new(start + (l - m))))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nlm_triangular() {
        // mres = 1, mmax = lmax: full triangle.
        let layout = LmLayout::new(15, 15, 1);
        assert_eq!(layout.nlm(), 16 * 17 / 2);
    }

    #[test]
    fn test_block_starts_are_cumulative() {
        let layout = LmLayout::new(21, 10, 2);
        let mut expected = 0;
        for m in layout.orders() {
            assert_eq!(layout.block_start(m), expected);
            expected += layout.block_len(m);
        }
        assert_eq!(layout.nlm(), expected);
    }

    #[test]
    fn test_lm_index_monotone_in_l() {
        let layout = LmLayout::new(12, 12, 1);
        for m in layout.orders() {
            let mut prev = layout.lm_index(m, m).get();
            for l in (m + 1)..=12 {
                let lm = layout.lm_index(l, m).get();
                assert_eq!(lm, prev + 1, "degrees must be contiguous within a block");
                prev = lm;
            }
        }
    }

    #[test]
    fn test_alm_index_matches_block_start() {
        let layout = LmLayout::new(31, 15, 2);
        for m in layout.orders() {
            assert_eq!(layout.alm_index(m), 2 * layout.block_start(m));
        }
    }

    #[test]
    fn test_xlm_blocks_do_not_overlap() {
        // Each block needs 3 entries per 2 degrees, degrees m..=lmax+1.
        let layout = LmLayout::new(20, 20, 1);
        for im in 0..20 {
            let m = im;
            let need = 3 * (layout.lmax() + 2 - m).div_ceil(2);
            let next = layout.xlm_index(m + 1);
            assert!(
                layout.xlm_index(m) + need <= next,
                "xlm block for m={} too small",
                m
            );
        }
    }

    #[test]
    fn test_clm_blocks_do_not_overlap() {
        let layout = LmLayout::new(20, 10, 2);
        for im in 0..10 {
            let m = im * 2;
            // seed + one pair per recurrence step up to degree lmax+1
            let need = 1 + 2 * (layout.lmax() + 3 - m).div_ceil(2);
            let next = layout.clm_index(m + 2);
            assert!(
                layout.clm_index(m) + need <= next,
                "clm block for m={} too small",
                m
            );
        }
    }

    #[test]
    fn test_modes_iteration_order() {
        let layout = LmLayout::new(4, 2, 2);
        let modes: Vec<_> = layout.modes().map(|(l, m, _)| (l, m)).collect();
        assert_eq!(
            modes,
            vec![
                (0, 0),
                (1, 0),
                (2, 0),
                (3, 0),
                (4, 0),
                (2, 2),
                (3, 2),
                (4, 2),
                (4, 4)
            ]
        );
        for (i, (_, _, lm)) in layout.modes().enumerate() {
            assert_eq!(lm.get(), i);
        }
    }
}
