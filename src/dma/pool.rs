//! DMA address translation pools.
//!
//! A pool maps packet-buffer offsets to the bus addresses the GEM reads and
//! writes, and back. Its layout mirrors the packet buffer byte for byte, so a
//! packet at offset `o` always lives at `dma_base + o`.
//!
//! - [`ZeroCopyDmaPool`]: the packet buffer itself is DMA-reachable; the pool
//!   only records its addresses.
//! - [`BufferedDmaPool`]: the packet buffer is not DMA-reachable; the pool
//!   owns a same-sized uncached region and copies frames across.

use crate::driver::error::{ConfigError, ConfigResult, DmaError, DmaResult};
use crate::hal::platform::{CachePolicy, DmaAddr, DmaAllocator, DmaBuffer};
use crate::session::{Dataspace, PacketBuffer, PacketDescriptor};

/// Bidirectional translation between packet descriptors and DMA addresses
pub trait DmaPool {
    /// Bus address of the first byte of the region
    fn dma_base(&self) -> DmaAddr;

    /// Size of the region in bytes
    fn size(&self) -> usize;

    /// CPU-local address of the first byte the DMA engine accesses
    fn local_base(&self) -> usize;

    /// Bus address of `packet`, without validation
    #[inline]
    fn dma_addr(&self, packet: &PacketDescriptor) -> DmaAddr {
        self.dma_base().wrapping_add(packet.offset() as DmaAddr)
    }

    /// Whether `dma_addr` lies inside `[base, base + size)`
    #[inline]
    fn contains(&self, dma_addr: DmaAddr) -> bool {
        (dma_addr.wrapping_sub(self.dma_base()) as usize) < self.size()
    }

    /// Packet at `dma_addr` of `len` bytes
    ///
    /// Returns [`PacketDescriptor::INVALID`] if the address is outside the
    /// region. This is the only check applied to an address reported back by
    /// the hardware.
    #[inline]
    fn packet_descriptor(&self, dma_addr: DmaAddr, len: usize) -> PacketDescriptor {
        if !self.contains(dma_addr) {
            return PacketDescriptor::INVALID;
        }
        PacketDescriptor::new(dma_addr.wrapping_sub(self.dma_base()) as usize, len)
    }

    /// CPU-local address of `packet`'s bytes as the DMA engine sees them
    #[inline]
    fn local_addr(&self, packet: &PacketDescriptor) -> usize {
        self.local_base().wrapping_add(packet.offset())
    }

    /// Make `packet`'s content visible to the DMA engine and return its address
    fn dma_addr_with_content<B: PacketBuffer + ?Sized>(
        &mut self,
        buffer: &B,
        packet: &PacketDescriptor,
    ) -> DmaResult<DmaAddr>;

    /// Translate `dma_addr` back and make its content visible in `buffer`
    ///
    /// Addresses outside the region yield `Ok(PacketDescriptor::INVALID)`.
    fn packet_descriptor_with_content<B: PacketBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        dma_addr: DmaAddr,
        len: usize,
    ) -> DmaResult<PacketDescriptor>;
}

// =============================================================================
// Zero-copy pool
// =============================================================================

/// Pool over a packet buffer the DMA engine can reach directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroCopyDmaPool {
    dma_base: DmaAddr,
    local_base: usize,
    size: usize,
}

impl ZeroCopyDmaPool {
    /// Create a pool over `dataspace`
    ///
    /// # Errors
    ///
    /// [`ConfigError::DmaUnavailable`] if the dataspace has no physical
    /// address.
    pub fn new(dataspace: Dataspace) -> ConfigResult<Self> {
        let Some(dma_base) = dataspace.phys_addr.filter(|&addr| addr != 0) else {
            gem_warn!("packet buffer has no physical address");
            return Err(ConfigError::DmaUnavailable);
        };

        Ok(Self {
            dma_base,
            local_base: dataspace.local_addr,
            size: dataspace.size,
        })
    }

    /// Create a pool over a session's packet buffer
    pub fn from_buffer<B: PacketBuffer + ?Sized>(buffer: &B) -> ConfigResult<Self> {
        Self::new(buffer.dataspace())
    }
}

impl DmaPool for ZeroCopyDmaPool {
    fn dma_base(&self) -> DmaAddr {
        self.dma_base
    }

    fn size(&self) -> usize {
        self.size
    }

    fn local_base(&self) -> usize {
        self.local_base
    }

    fn dma_addr_with_content<B: PacketBuffer + ?Sized>(
        &mut self,
        _buffer: &B,
        packet: &PacketDescriptor,
    ) -> DmaResult<DmaAddr> {
        Ok(self.dma_addr(packet))
    }

    fn packet_descriptor_with_content<B: PacketBuffer + ?Sized>(
        &mut self,
        _buffer: &mut B,
        dma_addr: DmaAddr,
        len: usize,
    ) -> DmaResult<PacketDescriptor> {
        Ok(self.packet_descriptor(dma_addr, len))
    }
}

// =============================================================================
// Buffered pool
// =============================================================================

/// Pool owning a separate DMA region that frames are copied through
pub struct BufferedDmaPool<M: DmaBuffer> {
    memory: M,
}

impl<M: DmaBuffer> BufferedDmaPool<M> {
    /// Allocate an uncached region the size of `buffer`'s dataspace
    ///
    /// # Errors
    ///
    /// - [`ConfigError::AllocationFailed`] if the allocator refuses
    /// - [`ConfigError::DmaUnavailable`] if the region has no DMA address
    pub fn new<A, B>(allocator: &mut A, buffer: &B) -> ConfigResult<Self>
    where
        A: DmaAllocator<Buffer = M>,
        B: PacketBuffer + ?Sized,
    {
        let size = buffer.dataspace().size;
        let memory = allocator
            .alloc_dma_buffer(size, CachePolicy::Uncached)
            .ok_or(ConfigError::AllocationFailed)?;
        Self::from_memory(memory)
    }

    /// Wrap an already allocated region
    pub fn from_memory(memory: M) -> ConfigResult<Self> {
        if memory.dma_addr() == 0 {
            gem_warn!("DMA region has no bus address");
            return Err(ConfigError::DmaUnavailable);
        }
        gem_info!(
            "buffered DMA pool at {:#010x}, {} bytes",
            memory.dma_addr(),
            memory.len()
        );
        Ok(Self { memory })
    }

    /// The owned DMA region
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// The owned DMA region, mutably
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Give back the owned DMA region
    pub fn into_memory(self) -> M {
        self.memory
    }
}

impl<M: DmaBuffer> DmaPool for BufferedDmaPool<M> {
    fn dma_base(&self) -> DmaAddr {
        self.memory.dma_addr()
    }

    fn size(&self) -> usize {
        self.memory.len()
    }

    fn local_base(&self) -> usize {
        self.memory.local_addr()
    }

    fn dma_addr_with_content<B: PacketBuffer + ?Sized>(
        &mut self,
        buffer: &B,
        packet: &PacketDescriptor,
    ) -> DmaResult<DmaAddr> {
        let src = buffer
            .packet_content(packet)
            .ok_or(DmaError::ContentUnavailable)?;
        let dst = self
            .memory
            .as_mut_slice()
            .get_mut(packet.offset()..packet.end())
            .ok_or(DmaError::OutOfRange)?;
        dst.copy_from_slice(src);
        Ok(self.dma_addr(packet))
    }

    fn packet_descriptor_with_content<B: PacketBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        dma_addr: DmaAddr,
        len: usize,
    ) -> DmaResult<PacketDescriptor> {
        let packet = self.packet_descriptor(dma_addr, len);
        if packet.is_invalid() {
            return Ok(packet);
        }

        let src = self
            .memory
            .as_slice()
            .get(packet.offset()..packet.end())
            .ok_or(DmaError::OutOfRange)?;
        let dst = buffer
            .packet_content_mut(&packet)
            .ok_or(DmaError::ContentUnavailable)?;
        if dst.len() != src.len() {
            return Err(DmaError::OutOfRange);
        }
        dst.copy_from_slice(src);
        Ok(packet)
    }
}
