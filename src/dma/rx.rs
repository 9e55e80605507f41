//! Receive ring controller.
//!
//! The mirror image of the transmit ring: the driver allocates packets from
//! the session, points descriptors at them and hands them to the GEM. The
//! hardware writes a frame and sets `used`; [`RxRing::receive`] then
//! delivers or drops the frame and the slot waits for the next
//! [`RxRing::refill`].

use core::sync::atomic::{Ordering, fence};

use super::descriptor::RxDescriptor;
use super::pool::DmaPool;
use super::ring::DescriptorRing;
use crate::driver::config::RxRingConfig;
use crate::driver::error::ConfigResult;
use crate::hal::platform::{DataCache, DmaAddr, DmaAllocator, DmaBuffer};
use crate::internal::constants::DEFAULT_RX_DESCRIPTORS;
use crate::internal::descriptor_bits::rx_addr;
use crate::session::{PacketDescriptor, RxSource};

/// Result of examining the tail slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// Hardware still owns the tail slot, or nothing is configured
    Empty,
    /// A frame was received but released back to the session
    Dropped,
    /// A frame was submitted to the session
    Delivered(PacketDescriptor),
}

/// Running receive counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStats {
    /// Frames submitted to the session
    pub delivered: u32,
    /// Frames released without delivery
    pub dropped: u32,
    /// Frames spread over more than one buffer
    pub fragmented: u32,
    /// Frames with a bad FCS
    pub bad_fcs: u32,
    /// Frames whose address or content the DMA pool could not resolve
    pub unmapped: u32,
    /// Frames longer than the slot buffer
    pub oversized: u32,
}

/// Receive descriptor ring.
///
/// Unlike [`TxRing`](super::TxRing) the session is borrowed per call, since
/// receive traffic is driven by whoever polls.
///
/// # Type Parameters
/// * `P` - DMA pool translating packets to bus addresses
/// * `C` - Data-cache maintenance
/// * `M` - Uncached memory holding the descriptor table
/// * `N` - Number of descriptors (at least 2)
pub struct RxRing<P, C, M, const N: usize = DEFAULT_RX_DESCRIPTORS>
where
    P: DmaPool,
    C: DataCache,
    M: DmaBuffer,
{
    ring: DescriptorRing<RxDescriptor, M, N>,
    /// Packet allocated for each slot, `INVALID` when unconfigured
    packets: [PacketDescriptor; N],
    pool: P,
    cache: C,
    config: RxRingConfig,
    stats: RxStats,
}

impl<P, C, M, const N: usize> RxRing<P, C, M, N>
where
    P: DmaPool,
    C: DataCache,
    M: DmaBuffer,
{
    /// Create a ring with every slot unconfigured and software-owned.
    ///
    /// The descriptor table is allocated uncached from `allocator`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidConfig`](crate::ConfigError::InvalidConfig) if
    ///   `config` fails [`RxRingConfig::validate`]
    /// - any error of [`DescriptorRing::allocate`]
    pub fn new<A>(allocator: &mut A, pool: P, cache: C, config: RxRingConfig) -> ConfigResult<Self>
    where
        A: DmaAllocator<Buffer = M>,
    {
        config.validate()?;

        let ring = Self {
            ring: DescriptorRing::allocate(allocator)?,
            packets: [PacketDescriptor::INVALID; N],
            pool,
            cache,
            config,
            stats: RxStats::default(),
        };
        ring.reset_descriptors();
        Ok(ring)
    }

    fn reset_descriptors(&self) {
        let last = self.ring.max_index();
        for (i, desc) in self.ring.iter() {
            desc.reset(i == last);
        }
    }

    /// Attach fresh packets to unconfigured slots from head on and hand
    /// them to hardware.
    ///
    /// Stops at the first configured slot or when the session runs out of
    /// packets. Returns the number of slots handed over.
    pub fn refill<S: RxSource + ?Sized>(&mut self, session: &mut S) -> usize {
        let mut handed = 0;

        while handed < N {
            let index = self.ring.head_index();
            let desc = self.ring.slot(index);
            if !desc.is_used() || desc.is_configured() {
                break;
            }

            let Some(packet) = session.alloc_packet(self.config.max_frame_size) else {
                break;
            };

            let phys = self.pool.dma_addr(&packet);
            if phys == 0 || phys & !rx_addr::ADDRESS_MASK != 0 {
                gem_warn!("rx buffer at {:#010x} is not usable by the DMA engine", phys);
                session.release_packet(packet);
                break;
            }

            self.cache
                .invalidate(self.pool.local_addr(&packet), packet.size());
            self.packets[index] = packet;
            desc.set_raw_status(0);

            // Status must be clear before the slot changes hands
            fence(Ordering::Release);
            desc.give_to_hardware(phys, index == self.ring.max_index());

            self.ring.advance_head();
            handed += 1;
        }

        handed
    }

    /// Process the tail slot.
    pub fn receive<S: RxSource + ?Sized>(&mut self, session: &mut S) -> RxOutcome {
        let index = self.ring.tail_index();
        let desc = self.ring.slot(index);
        if !desc.is_used() || !desc.is_configured() {
            return RxOutcome::Empty;
        }
        // Status written by the DMA engine is read only after `used`
        fence(Ordering::Acquire);

        let allocated = self.packets[index];
        let addr = desc.buffer_addr();
        let len = desc.length();

        let outcome = if !desc.is_complete_frame() {
            gem_warn!("rx slot {}: frame spans several buffers", index);
            self.stats.fragmented += 1;
            None
        } else if desc.is_bad_fcs() && !self.config.accept_bad_fcs {
            gem_warn!("rx slot {}: bad FCS", index);
            self.stats.bad_fcs += 1;
            None
        } else if len > allocated.size() {
            gem_warn!("rx slot {}: {} byte frame exceeds buffer", index, len);
            self.stats.oversized += 1;
            None
        } else {
            self.cache.invalidate(self.pool.local_addr(&allocated), len);
            match self.pool.packet_descriptor_with_content(session, addr, len) {
                Ok(packet) if !packet.is_invalid() => Some(packet),
                Ok(_) => {
                    gem_warn!("rx slot {}: address {:#010x} outside DMA pool", index, addr);
                    self.stats.unmapped += 1;
                    None
                }
                Err(e) => {
                    gem_warn!("rx slot {}: {}", index, e.as_str());
                    self.stats.unmapped += 1;
                    None
                }
            }
        };

        desc.reset(index == self.ring.max_index());
        self.packets[index] = PacketDescriptor::INVALID;
        self.ring.advance_tail();

        match outcome {
            Some(packet) => {
                session.submit_packet(packet);
                self.stats.delivered += 1;
                RxOutcome::Delivered(packet)
            }
            None => {
                session.release_packet(allocated);
                self.stats.dropped += 1;
                RxOutcome::Dropped
            }
        }
    }

    /// Release every attached packet and return the ring to its initial
    /// state. Stop the receiver first.
    pub fn reset<S: RxSource + ?Sized>(&mut self, session: &mut S) -> usize {
        let mut released = 0;
        for packet in self.packets.iter_mut() {
            if !packet.is_invalid() {
                session.release_packet(*packet);
                *packet = PacketDescriptor::INVALID;
                released += 1;
            }
        }
        self.reset_descriptors();
        self.ring.reset_indices();
        gem_debug!("rx ring reset, {} packets released", released);
        released
    }

    /// Running counters
    #[inline(always)]
    pub fn stats(&self) -> &RxStats {
        &self.stats
    }

    /// Slots with a packet attached, whether still owned by hardware or
    /// holding a frame not yet processed
    ///
    /// Counted from the slots rather than the indices, since a fully
    /// refilled ring has `head == tail`.
    pub fn queued(&self) -> usize {
        self.packets.iter().filter(|p| !p.is_invalid()).count()
    }

    /// Next slot to refill
    #[inline(always)]
    pub fn head_index(&self) -> usize {
        self.ring.head_index()
    }

    /// Next slot to process
    #[inline(always)]
    pub fn tail_index(&self) -> usize {
        self.ring.tail_index()
    }

    /// Descriptor at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[inline(always)]
    pub fn descriptor(&self, index: usize) -> &RxDescriptor {
        self.ring.slot(index)
    }

    /// Active configuration
    #[inline(always)]
    pub fn config(&self) -> &RxRingConfig {
        &self.config
    }

    /// Bus address of the descriptor table, for the receive queue base register
    #[inline(always)]
    pub fn descriptor_table_addr(&self) -> DmaAddr {
        self.ring.dma_addr()
    }

    /// The DMA pool
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Give back the collaborators and the descriptor memory. Attached
    /// packets are not released.
    pub fn release(self) -> (P, C, M) {
        (self.pool, self.cache, self.ring.into_memory())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::dma::pool::{BufferedDmaPool, ZeroCopyDmaPool};
    use crate::driver::error::ConfigError;
    use crate::hal::platform::CachePolicy;
    use crate::internal::descriptor_bits::rx_status;
    use crate::testing::{CacheOp, MockCache, MockDmaAllocator, MockDmaBuffer, MockPacketBuffer};

    const PHYS: u32 = 0x1000_0000;
    const SLOT: usize = 256;
    const TABLE: DmaAddr = 0x0010_0000;

    fn config() -> RxRingConfig {
        RxRingConfig::new().with_max_frame_size(SLOT)
    }

    type ZeroCopyRing<const N: usize> = RxRing<ZeroCopyDmaPool, MockCache, MockDmaBuffer, N>;

    fn table() -> MockDmaAllocator {
        MockDmaAllocator::new(TABLE)
    }

    fn zero_copy_ring<const N: usize>() -> (MockPacketBuffer, ZeroCopyRing<N>) {
        zero_copy_ring_with(config())
    }

    fn zero_copy_ring_with<const N: usize>(config: RxRingConfig) -> (MockPacketBuffer, ZeroCopyRing<N>) {
        let session = MockPacketBuffer::with_phys_addr(4096, PHYS);
        let pool = ZeroCopyDmaPool::from_buffer(&session).unwrap();
        let ring = RxRing::new(&mut table(), pool, MockCache::new(), config).unwrap();
        (session, ring)
    }

    fn buffered_ring<const N: usize>()
    -> (MockPacketBuffer, RxRing<BufferedDmaPool<MockDmaBuffer>, MockCache, MockDmaBuffer, N>) {
        let session = MockPacketBuffer::new(4096);
        let mut alloc = MockDmaAllocator::new(PHYS);
        let pool = BufferedDmaPool::new(&mut alloc, &session).unwrap();
        let ring = RxRing::new(&mut table(), pool, MockCache::new(), config()).unwrap();
        (session, ring)
    }

    /// Simulate the DMA engine writing a frame of `len` bytes into `index`
    fn deliver<P: DmaPool, C: DataCache, M: DmaBuffer, const N: usize>(
        ring: &RxRing<P, C, M, N>,
        index: usize,
        len: u32,
        extra: u32,
    ) {
        let desc = ring.descriptor(index);
        desc.set_raw_status(rx_status::START_OF_FRAME | rx_status::END_OF_FRAME | extra | len);
        desc.set_used();
    }

    #[test]
    fn new_ring_is_unconfigured_with_single_wrap() {
        let (_session, ring) = zero_copy_ring::<4>();
        let wraps: Vec<_> = (0..4).filter(|&i| ring.descriptor(i).is_wrap()).collect();
        assert_eq!(wraps, vec![3]);
        for i in 0..4 {
            assert!(ring.descriptor(i).is_used());
            assert!(!ring.descriptor(i).is_configured());
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let session = MockPacketBuffer::with_phys_addr(4096, PHYS);
        let pool = ZeroCopyDmaPool::from_buffer(&session).unwrap();
        let mut alloc = table();
        let result = RxRing::<_, _, _, 4>::new(
            &mut alloc,
            pool,
            MockCache::new(),
            RxRingConfig::new().with_max_frame_size(0),
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig)));
        assert!(alloc.requests.is_empty());
    }

    #[test]
    fn new_fails_without_descriptor_memory() {
        let session = MockPacketBuffer::with_phys_addr(4096, PHYS);
        let pool = ZeroCopyDmaPool::from_buffer(&session).unwrap();
        let result = RxRing::<_, _, _, 4>::new(
            &mut MockDmaAllocator::failing(),
            pool,
            MockCache::new(),
            config(),
        );
        assert!(matches!(result, Err(ConfigError::AllocationFailed)));
    }

    #[test]
    fn descriptor_table_lives_in_uncached_dma_memory() {
        let session = MockPacketBuffer::with_phys_addr(4096, PHYS);
        let pool = ZeroCopyDmaPool::from_buffer(&session).unwrap();
        let mut alloc = MockDmaAllocator::new(0x3000_0000);
        let ring: ZeroCopyRing<4> = RxRing::new(&mut alloc, pool, MockCache::new(), config()).unwrap();

        assert_eq!(ring.descriptor_table_addr(), 0x3000_0000);
        assert_eq!(alloc.requests, vec![(4 * RxDescriptor::SIZE, CachePolicy::Uncached)]);

        let slot0 = ring.descriptor(0) as *const RxDescriptor as usize;
        let (_, _, memory) = ring.release();
        assert_eq!(memory.local_addr(), slot0);
    }

    #[test]
    fn refill_hands_every_slot_to_hardware() {
        let (mut session, mut ring) = zero_copy_ring::<4>();

        assert_eq!(ring.refill(&mut session), 4);

        for i in 0..4 {
            let desc = ring.descriptor(i);
            assert!(!desc.is_used());
            assert_eq!(desc.buffer_addr(), PHYS + (i * SLOT) as u32);
        }
        assert!(ring.descriptor(3).is_wrap());
        assert_eq!(ring.head_index(), 0);
        assert_eq!(ring.queued(), 4);

        // Nothing left to refill
        assert_eq!(ring.refill(&mut session), 0);
    }

    #[test]
    fn refill_writes_whole_address_word_and_clears_status() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        // Leftovers from a frame the slot held before
        for i in 0..4 {
            ring.descriptor(i).set_raw_status(rx_status::START_OF_FRAME | 1514);
        }

        ring.refill(&mut session);

        for i in 0..4 {
            let desc = ring.descriptor(i);
            let wrap = if i == 3 { rx_addr::WRAP } else { 0 };
            assert_eq!(desc.raw_address(), (PHYS + (i * SLOT) as u32) | wrap);
            assert_eq!(desc.raw_status(), 0);
        }
    }

    #[test]
    fn refill_invalidates_cache_over_buffers() {
        let (mut session, mut ring) = zero_copy_ring::<2>();
        let base = session.data.as_ptr() as usize;

        ring.refill(&mut session);

        let (_, cache, _) = ring.release();
        assert_eq!(
            cache.ops,
            vec![
                CacheOp::Invalidate { addr: base, len: SLOT },
                CacheOp::Invalidate { addr: base + SLOT, len: SLOT },
            ]
        );
    }

    #[test]
    fn refill_stops_when_session_is_exhausted() {
        let mut session = MockPacketBuffer::with_phys_addr(4096, PHYS).with_alloc_budget(2);
        let pool = ZeroCopyDmaPool::from_buffer(&session).unwrap();
        let mut ring: ZeroCopyRing<4> =
            RxRing::new(&mut table(), pool, MockCache::new(), config()).unwrap();

        assert_eq!(ring.refill(&mut session), 2);
        assert!(ring.descriptor(2).is_used());
        assert_eq!(ring.head_index(), 2);
    }

    #[test]
    fn receive_on_idle_ring_is_empty() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        assert_eq!(ring.receive(&mut session), RxOutcome::Empty);

        ring.refill(&mut session);
        assert_eq!(ring.receive(&mut session), RxOutcome::Empty);
        assert!(session.submitted.is_empty());
    }

    #[test]
    fn receive_delivers_frame_and_slot_is_refilled() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        ring.refill(&mut session);

        deliver(&ring, 0, 60, rx_status::BROADCAST);
        let outcome = ring.receive(&mut session);

        let expected = PacketDescriptor::new(0, 60);
        assert_eq!(outcome, RxOutcome::Delivered(expected));
        assert_eq!(session.submitted, vec![expected]);
        assert_eq!(ring.tail_index(), 1);
        assert!(ring.descriptor(0).is_used());
        assert!(!ring.descriptor(0).is_configured());
        assert_eq!(ring.stats().delivered, 1);

        assert_eq!(ring.refill(&mut session), 1);
        assert!(!ring.descriptor(0).is_used());
    }

    #[test]
    fn receive_copies_content_through_buffered_pool() {
        let (mut session, mut ring) = buffered_ring::<4>();
        ring.refill(&mut session);

        // DMA engine writes into slot 1's region of the pool
        ring.pool.memory_mut().as_mut_slice()[SLOT..SLOT + 64].fill(0x77);
        deliver(&ring, 0, 60, 0);
        deliver(&ring, 1, 64, 0);

        assert!(matches!(ring.receive(&mut session), RxOutcome::Delivered(_)));
        let outcome = ring.receive(&mut session);

        let expected = PacketDescriptor::new(SLOT, 64);
        assert_eq!(outcome, RxOutcome::Delivered(expected));
        assert!(session.bytes(&expected).iter().all(|&b| b == 0x77));
        assert_eq!(session.data[SLOT + 64], 0);
    }

    #[test]
    fn fragmented_frame_is_released() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        ring.refill(&mut session);

        let desc = ring.descriptor(0);
        desc.set_raw_status(rx_status::START_OF_FRAME | 128);
        desc.set_used();

        assert_eq!(ring.receive(&mut session), RxOutcome::Dropped);
        assert_eq!(session.released, vec![PacketDescriptor::new(0, SLOT)]);
        assert!(session.submitted.is_empty());
        assert_eq!(ring.stats().fragmented, 1);
        assert_eq!(ring.stats().dropped, 1);
        assert_eq!(ring.tail_index(), 1);
    }

    #[test]
    fn bad_fcs_frame_is_released_unless_accepted() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        ring.refill(&mut session);
        deliver(&ring, 0, 60, rx_status::BAD_FCS);
        assert_eq!(ring.receive(&mut session), RxOutcome::Dropped);
        assert_eq!(ring.stats().bad_fcs, 1);

        let (mut session, mut ring) = zero_copy_ring_with::<4>(config().with_accept_bad_fcs(true));
        ring.refill(&mut session);
        deliver(&ring, 0, 60, rx_status::BAD_FCS);
        assert!(matches!(ring.receive(&mut session), RxOutcome::Delivered(_)));
    }

    #[test]
    fn frame_longer_than_buffer_is_released() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        ring.refill(&mut session);
        deliver(&ring, 0, (SLOT + 1) as u32, 0);

        assert_eq!(ring.receive(&mut session), RxOutcome::Dropped);
        assert_eq!(ring.stats().oversized, 1);
    }

    #[test]
    fn address_outside_pool_is_released() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        ring.refill(&mut session);

        ring.descriptor(0).give_to_hardware(0x0BAD_0000, false);
        deliver(&ring, 0, 60, 0);

        assert_eq!(ring.receive(&mut session), RxOutcome::Dropped);
        assert_eq!(session.released, vec![PacketDescriptor::new(0, SLOT)]);
        assert_eq!(ring.stats().unmapped, 1);
    }

    #[test]
    fn frames_are_processed_in_order_across_wrap() {
        let (mut session, mut ring) = zero_copy_ring::<2>();
        let mut expected = Vec::new();

        for _ in 0..3 {
            assert_eq!(ring.refill(&mut session), 2);
            for i in [ring.tail_index(), (ring.tail_index() + 1) % 2] {
                let offset = (ring.descriptor(i).buffer_addr() - PHYS) as usize;
                expected.push(PacketDescriptor::new(offset, 60));
                deliver(&ring, i, 60, 0);
            }
            for _ in 0..2 {
                assert!(matches!(ring.receive(&mut session), RxOutcome::Delivered(_)));
            }
        }

        assert_eq!(session.submitted, expected);
        assert_eq!(ring.stats().delivered, 6);
        let wraps: Vec<_> = (0..2).filter(|&i| ring.descriptor(i).is_wrap()).collect();
        assert_eq!(wraps, vec![1]);
    }

    #[test]
    fn reset_releases_attached_packets() {
        let (mut session, mut ring) = zero_copy_ring::<4>();
        ring.refill(&mut session);
        deliver(&ring, 0, 60, 0);
        ring.receive(&mut session);

        assert_eq!(ring.queued(), 3);
        let released = ring.reset(&mut session);

        assert_eq!(released, 3);
        assert_eq!(ring.queued(), 0);
        assert_eq!(session.released.len(), 3);
        assert_eq!(ring.head_index(), 0);
        assert_eq!(ring.tail_index(), 0);
        for i in 0..4 {
            assert!(ring.descriptor(i).is_used());
            assert!(!ring.descriptor(i).is_configured());
        }
        assert!(ring.descriptor(3).is_wrap());
    }
}
