//! Data-cache maintenance implementations.

use super::platform::DataCache;
use crate::internal::constants::CACHE_LINE_SIZE;

/// Cache-line aligned `[start, end)` covering `len` bytes at `addr`
#[inline]
#[cfg_attr(not(target_arch = "arm"), allow(dead_code))]
pub(crate) const fn line_span(addr: usize, len: usize) -> (usize, usize) {
    let start = addr & !(CACHE_LINE_SIZE - 1);
    let end = addr.saturating_add(len).saturating_add(CACHE_LINE_SIZE - 1) & !(CACHE_LINE_SIZE - 1);
    (start, end)
}

/// No-op maintenance for coherent platforms and uncached memory
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCacheMaintenance;

impl DataCache for NoCacheMaintenance {
    #[inline(always)]
    fn clean_invalidate(&mut self, _addr: usize, _len: usize) {}

    #[inline(always)]
    fn invalidate(&mut self, _addr: usize, _len: usize) {}
}

/// ARMv7-A L1 data-cache maintenance by MVA to the point of coherency
///
/// Uses the CP15 `DCCIMVAC` and `DCIMVAC` operations followed by a `DSB`.
/// Outer caches (the PL310 on Zynq-7000) are not touched; platforms that
/// enable the L2 must provide their own [`DataCache`].
#[cfg(target_arch = "arm")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmV7DataCache;

#[cfg(target_arch = "arm")]
impl DataCache for ArmV7DataCache {
    fn clean_invalidate(&mut self, addr: usize, len: usize) {
        let (start, end) = line_span(addr, len);

        // SAFETY: Clean+invalidate by MVA never discards data, so it is
        // sound for any mapped address range.
        unsafe {
            let mut line = start;
            while line < end {
                core::arch::asm!(
                    "mcr p15, 0, {line}, c7, c14, 1",
                    line = in(reg) line,
                    options(nostack, preserves_flags)
                );
                line += CACHE_LINE_SIZE;
            }
            core::arch::asm!("dsb", options(nostack, preserves_flags));
        }
    }

    fn invalidate(&mut self, addr: usize, len: usize) {
        let (start, end) = line_span(addr, len);

        // SAFETY: The caller hands us a region the DMA engine just wrote;
        // dirty CPU lines in it would be stale anyway.
        unsafe {
            core::arch::asm!("dsb", options(nostack, preserves_flags));
            let mut line = start;
            while line < end {
                core::arch::asm!(
                    "mcr p15, 0, {line}, c7, c6, 1",
                    line = in(reg) line,
                    options(nostack, preserves_flags)
                );
                line += CACHE_LINE_SIZE;
            }
            core::arch::asm!("dsb", options(nostack, preserves_flags));
        }
    }
}
