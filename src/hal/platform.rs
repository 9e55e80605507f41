//! Platform services
//!
//! The rings need three things from the platform they run on: physically
//! contiguous DMA-addressable memory, the DMA (bus) address of that memory,
//! and data-cache maintenance over CPU-local addresses. On a microkernel
//! these are provided by the platform and RM sessions; on bare metal by a
//! static region and the CPU's cache instructions.

/// Physical address as seen by the GEM DMA engine
///
/// The GEM on Zynq-7000 is a 32-bit bus master.
pub type DmaAddr = u32;

/// Cache attribute requested for a DMA allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CachePolicy {
    /// Normal cacheable memory; users must maintain coherency explicitly
    Cached,
    /// Uncached memory; CPU and DMA always observe the same bytes
    #[default]
    Uncached,
}

/// A physically contiguous memory region reachable by the DMA engine
///
/// # Safety
///
/// Implementors must guarantee that:
/// - the bytes stay at the same CPU-local address for the lifetime of the
///   handle, including when the handle itself is moved;
/// - [`as_mut_slice`](Self::as_mut_slice) always returns the same region;
/// - [`dma_addr`](Self::dma_addr) is the bus address of the first byte.
///
/// Descriptor rings keep a pointer into the region while they own it.
pub unsafe trait DmaBuffer {
    /// DMA address of the first byte, `0` if the platform could not provide one
    fn dma_addr(&self) -> DmaAddr;

    /// CPU-local view of the region
    fn as_slice(&self) -> &[u8];

    /// Mutable CPU-local view of the region
    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Size of the region in bytes
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the region is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// CPU-local address of the first byte
    fn local_addr(&self) -> usize {
        self.as_slice().as_ptr() as usize
    }
}

/// Allocator for DMA-capable memory
pub trait DmaAllocator {
    /// Buffer type handed out by this allocator
    type Buffer: DmaBuffer;

    /// Allocate `size` bytes of DMA memory, `None` if the platform refuses
    fn alloc_dma_buffer(&mut self, size: usize, policy: CachePolicy) -> Option<Self::Buffer>;
}

/// Data-cache maintenance by CPU-local address range
///
/// Ranges need not be cache-line aligned; implementations widen them to
/// whole lines.
pub trait DataCache {
    /// Write back and invalidate `len` bytes at `addr`
    ///
    /// Required before the DMA engine reads memory the CPU has written.
    fn clean_invalidate(&mut self, addr: usize, len: usize);

    /// Invalidate `len` bytes at `addr` without writing back
    ///
    /// Required before the CPU reads memory the DMA engine has written.
    fn invalidate(&mut self, addr: usize, len: usize);
}

impl<T: DataCache + ?Sized> DataCache for &mut T {
    fn clean_invalidate(&mut self, addr: usize, len: usize) {
        (**self).clean_invalidate(addr, len);
    }

    fn invalidate(&mut self, addr: usize, len: usize) {
        (**self).invalidate(addr, len);
    }
}
