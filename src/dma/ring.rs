//! Generic circular ring of DMA descriptors.
//!
//! Slot addressing and occupancy only: the ring knows nothing about what a
//! descriptor's bits mean. The transmit and receive controllers layer that
//! on top.
//!
//! The descriptor table lives in a [`DmaBuffer`] owned by the ring, so the
//! CPU reaches it through the region's local address while the DMA engine
//! is programmed with its bus address.

use core::ptr::NonNull;

use crate::driver::error::{ConfigError, ConfigResult};
use crate::hal::platform::{CachePolicy, DmaAddr, DmaAllocator, DmaBuffer};

/// Circular descriptor ring with producer (`head`) and consumer (`tail`)
/// indices.
///
/// `head` is the next slot handed to hardware, `tail` the next slot expected
/// back. Both wrap modulo `N`, so `queued()` can report at most `N - 1`
/// in-flight slots.
pub struct DescriptorRing<D, M: DmaBuffer, const N: usize> {
    /// Region holding the descriptor table
    memory: M,
    /// First descriptor, inside `memory`
    table: NonNull<[D; N]>,
    /// Next slot to hand to hardware
    head: usize,
    /// Next slot expected back from hardware
    tail: usize,
}

// SAFETY: `table` points into `memory`, which moves with the ring and whose
// bytes stay put (a `DmaBuffer` guarantee). No other handle to the table exists.
unsafe impl<D: Send, M: DmaBuffer + Send, const N: usize> Send for DescriptorRing<D, M, N> {}

impl<D: Default, M: DmaBuffer, const N: usize> DescriptorRing<D, M, N> {
    /// Size of the descriptor table in bytes
    pub const TABLE_SIZE: usize = N * size_of::<D>();

    /// Allocate an uncached table of `N` descriptors from `allocator`
    ///
    /// # Errors
    ///
    /// - [`ConfigError::AllocationFailed`] if the allocator refuses
    /// - see [`DescriptorRing::new`]
    pub fn allocate<A>(allocator: &mut A) -> ConfigResult<Self>
    where
        A: DmaAllocator<Buffer = M>,
    {
        let memory = allocator
            .alloc_dma_buffer(Self::TABLE_SIZE, CachePolicy::Uncached)
            .ok_or(ConfigError::AllocationFailed)?;
        Self::new(memory)
    }

    /// Place a table of `N` default descriptors at the start of `memory`
    ///
    /// `memory` must be uncached, or coherent with the DMA engine; the ring
    /// performs no cache maintenance on descriptors.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DmaUnavailable`] if the region has no bus address
    /// - [`ConfigError::DescriptorMemory`] if the region is smaller than
    ///   [`Self::TABLE_SIZE`] or either address is misaligned
    pub fn new(mut memory: M) -> ConfigResult<Self> {
        const { assert!(N >= 2, "a descriptor ring needs at least two slots") };

        let dma_addr = memory.dma_addr();
        if dma_addr == 0 {
            gem_warn!("descriptor memory has no bus address");
            return Err(ConfigError::DmaUnavailable);
        }
        if memory.len() < Self::TABLE_SIZE {
            gem_warn!(
                "descriptor memory of {} bytes cannot hold {} bytes",
                memory.len(),
                Self::TABLE_SIZE
            );
            return Err(ConfigError::DescriptorMemory);
        }

        let first = memory.as_mut_slice().as_mut_ptr().cast::<D>();
        if !first.is_aligned() || dma_addr as usize % align_of::<D>() != 0 {
            gem_warn!("descriptor memory at {:#010x} is misaligned", dma_addr);
            return Err(ConfigError::DescriptorMemory);
        }

        for i in 0..N {
            // SAFETY: `first` is aligned and the region holds `N` descriptors.
            unsafe { first.add(i).write(D::default()) };
        }
        let table = NonNull::new(first.cast::<[D; N]>()).ok_or(ConfigError::DescriptorMemory)?;

        Ok(Self {
            memory,
            table,
            head: 0,
            tail: 0,
        })
    }
}

impl<D, M: DmaBuffer, const N: usize> DescriptorRing<D, M, N> {
    #[inline(always)]
    fn descriptors(&self) -> &[D; N] {
        // SAFETY: `table` was initialized in `new` and lives as long as `memory`.
        unsafe { self.table.as_ref() }
    }

    #[inline(always)]
    fn descriptors_mut(&mut self) -> &mut [D; N] {
        // SAFETY: As above; `&mut self` makes the access exclusive.
        unsafe { self.table.as_mut() }
    }

    /// Get the number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether no slot is in flight
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.queued() == 0
    }

    /// Index of the last slot, the one carrying the wrap bit
    #[inline(always)]
    #[must_use]
    pub const fn max_index(&self) -> usize {
        N - 1
    }

    /// Get the head index
    #[inline(always)]
    #[must_use]
    pub const fn head_index(&self) -> usize {
        self.head
    }

    /// Get the tail index
    #[inline(always)]
    #[must_use]
    pub const fn tail_index(&self) -> usize {
        self.tail
    }

    /// Slots between tail and head, i.e. owned by hardware or not yet reclaimed
    #[inline(always)]
    #[must_use]
    pub const fn queued(&self) -> usize {
        (self.head + N - self.tail) % N
    }

    /// Advance the head index by one, wrapping around
    #[inline(always)]
    pub fn advance_head(&mut self) {
        self.head = (self.head + 1) % N;
    }

    /// Advance the tail index by one, wrapping around
    #[inline(always)]
    pub fn advance_tail(&mut self) {
        self.tail = (self.tail + 1) % N;
    }

    /// Reset both indices to 0
    #[inline(always)]
    pub fn reset_indices(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Get a reference to the descriptor at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[inline(always)]
    pub fn slot(&self, index: usize) -> &D {
        &self.descriptors()[index]
    }

    /// Get a mutable reference to the descriptor at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[inline(always)]
    pub fn slot_mut(&mut self, index: usize) -> &mut D {
        &mut self.descriptors_mut()[index]
    }

    /// Descriptor at the head index
    #[inline(always)]
    pub fn head(&self) -> &D {
        self.slot(self.head)
    }

    /// Descriptor at the tail index
    #[inline(always)]
    pub fn tail(&self) -> &D {
        self.slot(self.tail)
    }

    /// Bus address of the table, for the queue base register
    #[inline(always)]
    pub fn dma_addr(&self) -> DmaAddr {
        self.memory.dma_addr()
    }

    /// CPU-local address of the table
    #[inline(always)]
    pub fn local_addr(&self) -> usize {
        self.table.as_ptr() as usize
    }

    /// Iterate over all descriptors with their index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &D)> {
        self.descriptors().iter().enumerate()
    }

    /// Give back the descriptor memory
    pub fn into_memory(self) -> M {
        self.memory
    }
}

// =============================================================================
// Tests
// =============================================================================
