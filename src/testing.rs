//! Testing utilities and mock implementations
//!
//! Mock collaborators for exercising the descriptor rings on the host
//! without hardware access: a session packet buffer, a DMA allocator, a
//! data cache and a delay.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::vec;
use std::vec::Vec;

use crate::hal::platform::{CachePolicy, DataCache, DmaAddr, DmaAllocator, DmaBuffer};
use crate::session::{Dataspace, PacketBuffer, PacketDescriptor, RxSource, TxSink};

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay that records requested time instead of sleeping
///
/// # Example
///
/// ```ignore
/// let mut delay = MockDelay::new();
/// delay.delay_us(1000);
/// assert_eq!(delay.total_us(), 1000);
/// assert_eq!(delay.calls(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
    /// Number of delay calls
    calls: RefCell<u32>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    /// Get total milliseconds that were "delayed"
    pub fn total_ms(&self) -> u64 {
        self.total_ns() / 1_000_000
    }

    /// Number of sleeps performed
    pub fn calls(&self) -> u32 {
        *self.calls.borrow()
    }

    /// Reset the counters
    pub fn reset(&self) {
        *self.total_ns.borrow_mut() = 0;
        *self.calls.borrow_mut() = 0;
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
        *self.calls.borrow_mut() += 1;
    }
}

// =============================================================================
// Mock Packet Buffer (session)
// =============================================================================

/// Vec-backed packet buffer playing both the TX and RX session roles
///
/// Records every acknowledgment, submission and release so tests can assert
/// on ordering. Descriptors listed in `invalid` are reported as not valid.
#[derive(Debug)]
pub struct MockPacketBuffer {
    /// Backing bytes
    pub data: Vec<u8>,
    /// Physical address reported in the dataspace
    pub phys_addr: Option<u32>,
    /// Descriptors the session refuses as invalid
    pub invalid: Vec<PacketDescriptor>,
    /// Acknowledged TX packets, in order
    pub acked: Vec<PacketDescriptor>,
    /// Submitted RX packets, in order
    pub submitted: Vec<PacketDescriptor>,
    /// Released RX packets, in order
    pub released: Vec<PacketDescriptor>,
    /// Remaining successful allocations, `None` for unlimited
    pub alloc_budget: Option<usize>,
    next_alloc: usize,
}

impl MockPacketBuffer {
    /// Create a buffer of `size` zero bytes that is not DMA-reachable
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            phys_addr: None,
            invalid: Vec::new(),
            acked: Vec::new(),
            submitted: Vec::new(),
            released: Vec::new(),
            alloc_budget: None,
            next_alloc: 0,
        }
    }

    /// Create a buffer reporting `phys_addr` as its physical base
    pub fn with_phys_addr(size: usize, phys_addr: u32) -> Self {
        Self {
            phys_addr: Some(phys_addr),
            ..Self::new(size)
        }
    }

    /// Limit the number of successful `alloc_packet` calls
    pub fn with_alloc_budget(mut self, budget: usize) -> Self {
        self.alloc_budget = Some(budget);
        self
    }

    /// Mark `packet` as invalid from the session's point of view
    pub fn invalidate(&mut self, packet: PacketDescriptor) {
        self.invalid.push(packet);
    }

    /// Fill `packet`'s bytes with `byte`
    pub fn fill(&mut self, packet: &PacketDescriptor, byte: u8) {
        self.data[packet.offset()..packet.end()].fill(byte);
    }

    /// Bytes of `packet`, panicking if out of range
    pub fn bytes(&self, packet: &PacketDescriptor) -> &[u8] {
        &self.data[packet.offset()..packet.end()]
    }
}

impl PacketBuffer for MockPacketBuffer {
    fn packet_valid(&self, packet: &PacketDescriptor) -> bool {
        !packet.is_invalid() && packet.end() <= self.data.len() && !self.invalid.contains(packet)
    }

    fn packet_content(&self, packet: &PacketDescriptor) -> Option<&[u8]> {
        self.data.get(packet.offset()..packet.end())
    }

    fn packet_content_mut(&mut self, packet: &PacketDescriptor) -> Option<&mut [u8]> {
        self.data.get_mut(packet.offset()..packet.end())
    }

    fn dataspace(&self) -> Dataspace {
        Dataspace {
            size: self.data.len(),
            local_addr: self.data.as_ptr() as usize,
            phys_addr: self.phys_addr,
        }
    }
}

impl TxSink for MockPacketBuffer {
    fn acknowledge_packet(&mut self, packet: PacketDescriptor) {
        self.acked.push(packet);
    }
}

impl RxSource for MockPacketBuffer {
    fn alloc_packet(&mut self, size: usize) -> Option<PacketDescriptor> {
        if self.next_alloc + size > self.data.len() {
            return None;
        }
        if let Some(budget) = self.alloc_budget.as_mut() {
            if *budget == 0 {
                return None;
            }
            *budget -= 1;
        }
        let packet = PacketDescriptor::new(self.next_alloc, size);
        self.next_alloc += size;
        Some(packet)
    }

    fn submit_packet(&mut self, packet: PacketDescriptor) {
        self.submitted.push(packet);
    }

    fn release_packet(&mut self, packet: PacketDescriptor) {
        self.released.push(packet);
    }
}

// =============================================================================
// Mock DMA Allocator
// =============================================================================

/// Heap-backed DMA region with a fixed DMA address
///
/// Backed by `u64` words so descriptor tables placed in it are aligned.
#[derive(Debug)]
pub struct MockDmaBuffer {
    words: Vec<u64>,
    len: usize,
    pub dma_addr: DmaAddr,
}

impl MockDmaBuffer {
    /// Create a zeroed region of `len` bytes reporting `dma_addr`
    pub fn new(len: usize, dma_addr: DmaAddr) -> Self {
        Self {
            words: vec![0; len.div_ceil(8)],
            len,
            dma_addr,
        }
    }
}

// SAFETY: The bytes live in a heap allocation owned by `words` that is never
// resized, so they do not move with the handle.
unsafe impl DmaBuffer for MockDmaBuffer {
    fn dma_addr(&self) -> DmaAddr {
        self.dma_addr
    }

    fn as_slice(&self) -> &[u8] {
        // SAFETY: `words` holds at least `len` initialized bytes.
        unsafe { core::slice::from_raw_parts(self.words.as_ptr().cast::<u8>(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: As above, and `&mut self` guarantees exclusive access.
        unsafe { core::slice::from_raw_parts_mut(self.words.as_mut_ptr().cast::<u8>(), self.len) }
    }
}

/// Allocator handing out [`MockDmaBuffer`]s at a configurable DMA address
#[derive(Debug, Default)]
pub struct MockDmaAllocator {
    /// DMA address reported by the next buffer
    pub dma_addr: DmaAddr,
    /// Refuse every allocation
    pub fail: bool,
    /// Record of requests: (size, policy)
    pub requests: Vec<(usize, CachePolicy)>,
}

impl MockDmaAllocator {
    /// Create an allocator reporting `dma_addr` for its buffers
    pub fn new(dma_addr: DmaAddr) -> Self {
        Self {
            dma_addr,
            ..Self::default()
        }
    }

    /// Create an allocator that refuses every request
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl DmaAllocator for MockDmaAllocator {
    type Buffer = MockDmaBuffer;

    fn alloc_dma_buffer(&mut self, size: usize, policy: CachePolicy) -> Option<MockDmaBuffer> {
        self.requests.push((size, policy));
        if self.fail {
            return None;
        }
        Some(MockDmaBuffer::new(size, self.dma_addr))
    }
}

// =============================================================================
// Mock Data Cache
// =============================================================================

/// Cache maintenance operation recorded by [`MockCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    CleanInvalidate { addr: usize, len: usize },
    Invalidate { addr: usize, len: usize },
}

/// Data cache that records maintenance calls
#[derive(Debug, Default)]
pub struct MockCache {
    pub ops: Vec<CacheOp>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataCache for MockCache {
    fn clean_invalidate(&mut self, addr: usize, len: usize) {
        self.ops.push(CacheOp::CleanInvalidate { addr, len });
    }

    fn invalidate(&mut self, addr: usize, len: usize) {
        self.ops.push(CacheOp::Invalidate { addr, len });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn mock_delay_accumulates() {
        let mut delay = MockDelay::new();

        delay.delay_ns(1000);
        delay.delay_ns(2000);
        assert_eq!(delay.total_ns(), 3000);
        assert_eq!(delay.total_ms(), 0);

        delay.delay_us(1000);
        assert_eq!(delay.total_us(), 1003);
        assert_eq!(delay.calls(), 3);

        delay.reset();
        assert_eq!(delay.total_ns(), 0);
        assert_eq!(delay.calls(), 0);
    }

    #[test]
    fn mock_packet_buffer_validity() {
        let mut buffer = MockPacketBuffer::new(256);
        let p = PacketDescriptor::new(0, 64);

        assert!(buffer.packet_valid(&p));
        assert!(!buffer.packet_valid(&PacketDescriptor::INVALID));
        assert!(!buffer.packet_valid(&PacketDescriptor::new(200, 100)));

        buffer.invalidate(p);
        assert!(!buffer.packet_valid(&p));
    }

    #[test]
    fn mock_packet_buffer_allocates_sequentially() {
        let mut buffer = MockPacketBuffer::new(256).with_alloc_budget(3);

        assert_eq!(buffer.alloc_packet(100), Some(PacketDescriptor::new(0, 100)));
        assert_eq!(buffer.alloc_packet(100), Some(PacketDescriptor::new(100, 100)));
        // Out of space
        assert_eq!(buffer.alloc_packet(100), None);
        assert_eq!(buffer.alloc_packet(10), Some(PacketDescriptor::new(200, 10)));
        // Out of budget
        assert_eq!(buffer.alloc_packet(10), None);
    }

    #[test]
    fn mock_allocator_records_requests() {
        let mut alloc = MockDmaAllocator::new(0x1000_0000);
        let buf = alloc.alloc_dma_buffer(512, CachePolicy::Uncached);
        assert!(buf.is_some_and(|b| b.len() == 512 && b.dma_addr() == 0x1000_0000));
        assert_eq!(alloc.requests, vec![(512, CachePolicy::Uncached)]);

        let mut failing = MockDmaAllocator::failing();
        assert!(failing.alloc_dma_buffer(512, CachePolicy::Cached).is_none());
    }
}
