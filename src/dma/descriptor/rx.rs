//! RX buffer descriptor for frame reception.

use crate::internal::descriptor_bits::{field_get, rx_addr, rx_status};
use crate::internal::volatile::VolatileCell;

/// GEM receive buffer descriptor (8 bytes).
///
/// Unlike transmit, ownership and wrap live in the low bits of the address
/// word, so buffers must be word aligned. `used` set means the slot belongs
/// to software: either never configured or holding a received frame.
#[repr(C)]
pub struct RxDescriptor {
    /// Word 0: Buffer address[31:2], wrap[1], used[0]
    address: VolatileCell<u32>,
    /// Word 1: Frame status written by the DMA engine
    status: VolatileCell<u32>,
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl RxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 8;

    /// Create an unconfigured, software-owned descriptor without wrap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: VolatileCell::new(rx_addr::USED),
            status: VolatileCell::new(0),
        }
    }

    /// Return the slot to the unconfigured, software-owned state.
    pub fn reset(&self, wrap: bool) {
        self.address
            .set(rx_addr::USED | if wrap { rx_addr::WRAP } else { 0 });
        self.status.set(0);
    }

    /// Attach a buffer and hand the slot to the DMA engine in one store.
    ///
    /// The address word becomes `addr | wrap` with `used` clear. The two low
    /// address bits are dropped by the hardware layout. Callers clear the
    /// status word and issue a release fence first.
    #[inline(always)]
    pub fn give_to_hardware(&self, addr: u32, wrap: bool) {
        let wrap = if wrap { rx_addr::WRAP } else { 0 };
        self.address.set((addr & rx_addr::ADDRESS_MASK) | wrap);
    }

    /// Get buffer address.
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.address.get() & rx_addr::ADDRESS_MASK
    }

    /// Get the raw address word, flag bits included.
    #[inline(always)]
    #[must_use]
    pub fn raw_address(&self) -> u32 {
        self.address.get()
    }

    /// Check if a buffer is attached.
    #[inline(always)]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.buffer_addr() != 0
    }

    /// Check if the slot is owned by software.
    #[inline(always)]
    #[must_use]
    pub fn is_used(&self) -> bool {
        (self.address.get() & rx_addr::USED) != 0
    }

    /// Mark the slot software-owned (what the hardware does after writing a frame).
    #[inline(always)]
    pub fn set_used(&self) {
        self.address.update(|v| v | rx_addr::USED);
    }

    /// Check if this is the last slot of the ring.
    #[inline(always)]
    #[must_use]
    pub fn is_wrap(&self) -> bool {
        (self.address.get() & rx_addr::WRAP) != 0
    }

    /// Received frame length in bytes.
    #[inline(always)]
    #[must_use]
    pub fn length(&self) -> usize {
        field_get(
            self.status.get(),
            rx_status::LENGTH_SHIFT,
            rx_status::LENGTH_WIDTH,
        ) as usize
    }

    /// Check if the frame failed its FCS check.
    #[inline(always)]
    #[must_use]
    pub fn is_bad_fcs(&self) -> bool {
        (self.status.get() & rx_status::BAD_FCS) != 0
    }

    /// Check if the buffer holds the start of a frame.
    #[inline(always)]
    #[must_use]
    pub fn is_first(&self) -> bool {
        (self.status.get() & rx_status::START_OF_FRAME) != 0
    }

    /// Check if the buffer holds the end of a frame.
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        (self.status.get() & rx_status::END_OF_FRAME) != 0
    }

    /// Check if the whole frame fits in this one buffer.
    #[inline(always)]
    #[must_use]
    pub fn is_complete_frame(&self) -> bool {
        let mask = rx_status::START_OF_FRAME | rx_status::END_OF_FRAME;
        (self.status.get() & mask) == mask
    }

    /// Checksum offload status (0: not checked, 1: IP, 2: IP+TCP, 3: IP+UDP).
    #[inline(always)]
    #[must_use]
    pub fn checksum_status(&self) -> u8 {
        field_get(
            self.status.get(),
            rx_status::CHECKSUM_SHIFT,
            rx_status::CHECKSUM_WIDTH,
        ) as u8
    }

    /// Check if the destination was the broadcast address.
    #[inline(always)]
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        (self.status.get() & rx_status::BROADCAST) != 0
    }

    /// Check if the destination matched the multicast hash.
    #[inline(always)]
    #[must_use]
    pub fn is_multicast_hash(&self) -> bool {
        (self.status.get() & rx_status::MULTICAST_HASH) != 0
    }

    /// Check if the destination matched the unicast hash.
    #[inline(always)]
    #[must_use]
    pub fn is_unicast_hash(&self) -> bool {
        (self.status.get() & rx_status::UNICAST_HASH) != 0
    }

    /// Get raw status word for debugging.
    #[inline(always)]
    #[must_use]
    pub fn raw_status(&self) -> u32 {
        self.status.get()
    }

    /// Overwrite the raw status word.
    #[inline(always)]
    pub fn set_raw_status(&self, status: u32) {
        self.status.set(status);
    }
}
