//! Transmit ring controller.
//!
//! Hands session packets to the GEM one frame per descriptor and returns
//! them to the session once the hardware sets the `used` bit again. There
//! are no completion interrupts: callers reclaim explicitly with
//! [`TxRing::submit_acks`], and [`TxRing::add_to_queue`] polls the head slot
//! with a bounded sleep when the hardware is behind.

use core::sync::atomic::{Ordering, fence};

use embedded_hal::delay::DelayNs;

use super::descriptor::{TxDescriptor, TxErrorFlags};
use super::pool::DmaPool;
use super::ring::DescriptorRing;
use crate::driver::config::TxRingConfig;
use crate::driver::error::{ConfigResult, IoError, IoResult, Result};
use crate::hal::platform::{DataCache, DmaAddr, DmaAllocator, DmaBuffer};
use crate::internal::constants::{DEFAULT_TX_DESCRIPTORS, DMA_PREFERRED_ALIGN};
use crate::session::{PacketDescriptor, TxSink};

// =============================================================================
// Reclaim accounting
// =============================================================================

/// Outcome of one reclaim pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckSummary {
    /// Slots the tail moved past
    pub reclaimed: usize,
    /// Packets acknowledged to the session
    pub acknowledged: usize,
    /// Configured slots whose packet the session rejected
    pub invalid: usize,
    /// Frames that exceeded the retry limit
    pub retry_limit: usize,
    /// Frames corrupted by a bus error
    pub corrupt: usize,
    /// Frames that hit a late collision
    pub late_collision: usize,
    /// Frames that carried their own CRC
    pub crc_present: usize,
    /// Frames with a checksum offload error
    pub checksum_error: usize,
    /// Frames with any bit of the error range set
    pub unknown_error: usize,
}

impl AckSummary {
    fn record(&mut self, index: usize, flags: TxErrorFlags) {
        if flags.retry_limit {
            gem_warn!("tx slot {}: retry limit exceeded", index);
            self.retry_limit += 1;
        }
        if flags.corrupt {
            gem_warn!("tx slot {}: transmit frame corruption", index);
            self.corrupt += 1;
        }
        if flags.late_collision {
            gem_warn!("tx slot {}: late collision", index);
            self.late_collision += 1;
        }
        if flags.crc_present {
            gem_warn!("tx slot {}: CRC already present, checksum offload impeded", index);
            self.crc_present += 1;
        }
        if flags.checksum_error != 0 {
            gem_warn!("tx slot {}: checksum error {}", index, flags.checksum_error);
            self.checksum_error += 1;
        }
        if flags.has_error() {
            gem_warn!("tx slot {}: error bits {:#x}", index, flags.error_bits);
            self.unknown_error += 1;
        }
    }
}

/// Running transmit counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStats {
    /// Frames handed to hardware
    pub queued: u32,
    /// Packets acknowledged to the session
    pub acknowledged: u32,
    /// Reclaimed slots whose packet the session rejected
    pub invalid: u32,
    /// Frames refused for exceeding the slot size
    pub oversized: u32,
    /// Frames the DMA pool could not map
    pub unmapped: u32,
    /// `add_to_queue` calls that gave up waiting
    pub timeouts: u32,
    /// Frames that exceeded the retry limit
    pub retry_limit: u32,
    /// Frames corrupted by a bus error
    pub corrupt: u32,
    /// Frames that hit a late collision
    pub late_collision: u32,
    /// Frames that carried their own CRC
    pub crc_present: u32,
    /// Frames with a checksum offload error
    pub checksum_error: u32,
    /// Frames with any bit of the error range set
    pub unknown_error: u32,
}

impl TxStats {
    fn absorb(&mut self, summary: &AckSummary) {
        self.acknowledged = self.acknowledged.wrapping_add(summary.acknowledged as u32);
        self.invalid = self.invalid.wrapping_add(summary.invalid as u32);
        self.retry_limit = self.retry_limit.wrapping_add(summary.retry_limit as u32);
        self.corrupt = self.corrupt.wrapping_add(summary.corrupt as u32);
        self.late_collision = self.late_collision.wrapping_add(summary.late_collision as u32);
        self.crc_present = self.crc_present.wrapping_add(summary.crc_present as u32);
        self.checksum_error = self.checksum_error.wrapping_add(summary.checksum_error as u32);
        self.unknown_error = self.unknown_error.wrapping_add(summary.unknown_error as u32);
    }
}

// =============================================================================
// Transmit ring
// =============================================================================

/// Transmit descriptor ring bound to a session, a DMA pool, a data cache and
/// a delay.
///
/// # Type Parameters
/// * `S` - Session packet buffer receiving acknowledgments
/// * `P` - DMA pool translating packets to bus addresses
/// * `C` - Data-cache maintenance
/// * `D` - Delay used while waiting for a free slot
/// * `M` - Uncached memory holding the descriptor table
/// * `N` - Number of descriptors (at least 2)
pub struct TxRing<S, P, C, D, M, const N: usize = DEFAULT_TX_DESCRIPTORS>
where
    S: TxSink,
    P: DmaPool,
    C: DataCache,
    D: DelayNs,
    M: DmaBuffer,
{
    ring: DescriptorRing<TxDescriptor, M, N>,
    session: S,
    pool: P,
    cache: C,
    delay: D,
    config: TxRingConfig,
    stats: TxStats,
}

impl<S, P, C, D, M, const N: usize> TxRing<S, P, C, D, M, N>
where
    S: TxSink,
    P: DmaPool,
    C: DataCache,
    D: DelayNs,
    M: DmaBuffer,
{
    /// Create a ring with every slot unconfigured and software-owned.
    ///
    /// The descriptor table is allocated uncached from `allocator`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidConfig`](crate::ConfigError::InvalidConfig) if
    ///   `config` fails [`TxRingConfig::validate`]
    /// - any error of [`DescriptorRing::allocate`]
    pub fn new<A>(
        allocator: &mut A,
        session: S,
        pool: P,
        cache: C,
        delay: D,
        config: TxRingConfig,
    ) -> ConfigResult<Self>
    where
        A: DmaAllocator<Buffer = M>,
    {
        config.validate()?;

        let ring = Self {
            ring: DescriptorRing::allocate(allocator)?,
            session,
            pool,
            cache,
            delay,
            config,
            stats: TxStats::default(),
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

    /// Acknowledge every in-flight packet and return the ring to its
    /// initial state.
    ///
    /// Packets still owned by hardware are acknowledged too, so stop the
    /// transmitter first.
    pub fn reset(&mut self) -> AckSummary {
        let summary = self.submit_acks_forced();
        self.reset_descriptors();
        self.ring.reset_indices();
        gem_debug!("tx ring reset, {} packets acknowledged", summary.acknowledged);
        summary
    }

    /// Reclaim completed slots from the tail, in order.
    ///
    /// Stops at the first slot the hardware still owns.
    pub fn submit_acks(&mut self) -> AckSummary {
        self.reclaim(false)
    }

    /// Reclaim every in-flight slot regardless of ownership.
    pub fn submit_acks_forced(&mut self) -> AckSummary {
        self.reclaim(true)
    }

    fn reclaim(&mut self, force: bool) -> AckSummary {
        let mut summary = AckSummary::default();

        for _ in 0..self.ring.queued() {
            let index = self.ring.tail_index();
            let desc = self.ring.slot(index);

            if !desc.is_used() && !force {
                break;
            }
            // Status written by the DMA engine is read only after `used`
            fence(Ordering::Acquire);

            let addr = desc.address();
            if addr != 0 {
                let packet = self.pool.packet_descriptor(addr, desc.length());
                if self.session.packet_valid(&packet) {
                    self.session.acknowledge_packet(packet);
                    summary.acknowledged += 1;
                } else {
                    gem_warn!("tx slot {}: invalid packet descriptor for {:#010x}", index, addr);
                    summary.invalid += 1;
                }

                desc.clear_address();
                summary.record(index, desc.error_flags());
            }

            self.ring.advance_tail();
            summary.reclaimed += 1;
        }

        self.stats.absorb(&summary);
        summary
    }

    /// Hand `packet` to the hardware.
    ///
    /// Oversized frames and packets the pool cannot map are logged, counted
    /// and dropped without touching the ring.
    ///
    /// # Errors
    ///
    /// [`IoError::SendTimeout`] if no slot became free within the send
    /// timeout. No descriptor is written in that case.
    pub fn add_to_queue(&mut self, packet: PacketDescriptor) -> Result<()> {
        if packet.size() > self.config.max_frame_size {
            gem_warn!(
                "frame of {} bytes exceeds slot size {}, not sent",
                packet.size(),
                self.config.max_frame_size
            );
            self.stats.oversized += 1;
            return Ok(());
        }

        let phys = match self.pool.dma_addr_with_content(&self.session, &packet) {
            Ok(addr) => addr,
            Err(e) => {
                gem_warn!("cannot map packet at offset {}: {}", packet.offset(), e.as_str());
                self.stats.unmapped += 1;
                return Ok(());
            }
        };
        let local = self.pool.local_addr(&packet);

        if phys & (DMA_PREFERRED_ALIGN - 1) != 0 {
            gem_debug!("packet at {:#010x} is not aligned to {} bytes", phys, DMA_PREFERRED_ALIGN);
        }

        self.cache.clean_invalidate(local, packet.size());

        self.wait_for_free_slot()?;

        let index = self.ring.head_index();
        let desc = self.ring.slot(index);
        desc.configure(phys, index == self.ring.max_index());
        desc.set_length(packet.size());

        // Address and length must be visible before ownership flips
        fence(Ordering::Release);
        desc.clear_used();

        self.ring.advance_head();
        self.stats.queued = self.stats.queued.wrapping_add(1);
        Ok(())
    }

    fn slot_available(&self) -> bool {
        self.ring.queued() < N - 1 && self.ring.head().is_used()
    }

    fn wait_for_free_slot(&mut self) -> IoResult<()> {
        let max_polls = self.config.max_polls();
        let mut polls = 0;

        loop {
            if self.ring.queued() == N - 1 {
                self.submit_acks();
            }
            if self.slot_available() {
                return Ok(());
            }
            if polls == max_polls {
                break;
            }
            self.delay.delay_us(self.config.poll_interval_us);
            polls += 1;
        }

        gem_warn!(
            "tx send timeout: slot {} busy, {} frames in flight",
            self.ring.head_index(),
            self.ring.queued()
        );
        self.stats.timeouts += 1;
        Err(IoError::SendTimeout)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Running counters
    #[inline(always)]
    pub fn stats(&self) -> &TxStats {
        &self.stats
    }

    /// Frames handed to hardware and not yet reclaimed
    #[inline(always)]
    pub fn queued(&self) -> usize {
        self.ring.queued()
    }

    /// Next slot handed to hardware
    #[inline(always)]
    pub fn head_index(&self) -> usize {
        self.ring.head_index()
    }

    /// Next slot expected back from hardware
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
    pub fn descriptor(&self, index: usize) -> &TxDescriptor {
        self.ring.slot(index)
    }

    /// Active configuration
    #[inline(always)]
    pub fn config(&self) -> &TxRingConfig {
        &self.config
    }

    /// Bus address of the descriptor table, for the transmit queue base register
    #[inline(always)]
    pub fn descriptor_table_addr(&self) -> DmaAddr {
        self.ring.dma_addr()
    }

    /// The session packet buffer
    pub fn session(&self) -> &S {
        &self.session
    }

    /// The session packet buffer, mutably
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// The DMA pool
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// The delay
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// The delay, mutably
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Give back the collaborators and the descriptor memory. In-flight
    /// packets are not acknowledged.
    pub fn release(self) -> (S, P, C, D, M) {
        (self.session, self.pool, self.cache, self.delay, self.ring.into_memory())
    }
}

// =============================================================================
// Tests
// =============================================================================
