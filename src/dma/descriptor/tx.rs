//! TX buffer descriptor for frame transmission.

use crate::internal::descriptor_bits::{field_get, field_set, tx_status};
use crate::internal::volatile::VolatileCell;

/// GEM transmit buffer descriptor (8 bytes).
///
/// A slot cycles through four states:
///
/// | State              | address | used |
/// |--------------------|---------|------|
/// | unconfigured       | 0       | 1    |
/// | handed to hardware | buffer  | 0    |
/// | completed          | buffer  | 1    |
/// | reclaimed          | 0       | 1    |
#[repr(C)]
pub struct TxDescriptor {
    /// Word 0: Physical buffer address, `0` when unconfigured
    address: VolatileCell<u32>,
    /// Word 1: Length, control and status bits
    status: VolatileCell<u32>,
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 8;

    /// Create an unconfigured, software-owned descriptor without wrap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: VolatileCell::new(0),
            status: VolatileCell::new(tx_status::USED | tx_status::LAST_BUFFER),
        }
    }

    /// Return the slot to the unconfigured, software-owned state.
    ///
    /// `wrap` must be set on the last slot of the ring only.
    pub fn reset(&self, wrap: bool) {
        self.address.set(0);
        self.status.set(Self::control_bits(wrap));
    }

    /// Point the slot at a buffer while keeping it software-owned.
    ///
    /// Status becomes `used | last_buffer` (+ `wrap`), clearing any length or
    /// error bits left from the previous frame.
    pub fn configure(&self, addr: u32, wrap: bool) {
        self.address.set(addr);
        self.status.set(Self::control_bits(wrap));
    }

    #[inline(always)]
    const fn control_bits(wrap: bool) -> u32 {
        let bits = tx_status::USED | tx_status::LAST_BUFFER;
        if wrap { bits | tx_status::WRAP } else { bits }
    }

    /// Get buffer address.
    #[inline(always)]
    #[must_use]
    pub fn address(&self) -> u32 {
        self.address.get()
    }

    /// Set buffer address.
    #[inline(always)]
    pub fn set_address(&self, addr: u32) {
        self.address.set(addr);
    }

    /// Mark the slot reclaimed so it is never acknowledged twice.
    #[inline(always)]
    pub fn clear_address(&self) {
        self.address.set(0);
    }

    /// Check if the slot is owned by software.
    #[inline(always)]
    #[must_use]
    pub fn is_used(&self) -> bool {
        (self.status.get() & tx_status::USED) != 0
    }

    /// Mark the slot software-owned (what the hardware does on completion).
    #[inline(always)]
    pub fn set_used(&self) {
        self.status.update(|v| v | tx_status::USED);
    }

    /// Hand the slot to the DMA engine.
    #[inline(always)]
    pub fn clear_used(&self) {
        self.status.update(|v| v & !tx_status::USED);
    }

    /// Frame length in bytes.
    #[inline(always)]
    #[must_use]
    pub fn length(&self) -> usize {
        field_get(
            self.status.get(),
            tx_status::LENGTH_SHIFT,
            tx_status::LENGTH_WIDTH,
        ) as usize
    }

    /// Set frame length, truncated to the 14-bit field.
    #[inline(always)]
    pub fn set_length(&self, len: usize) {
        self.status.update(|v| {
            field_set(
                v,
                tx_status::LENGTH_SHIFT,
                tx_status::LENGTH_WIDTH,
                len as u32,
            )
        });
    }

    /// Check if this is the last slot of the ring.
    #[inline(always)]
    #[must_use]
    pub fn is_wrap(&self) -> bool {
        (self.status.get() & tx_status::WRAP) != 0
    }

    /// Check if the buffer holds the end of a frame.
    #[inline(always)]
    #[must_use]
    pub fn is_last_buffer(&self) -> bool {
        (self.status.get() & tx_status::LAST_BUFFER) != 0
    }

    /// Decode the completion status.
    #[inline(always)]
    #[must_use]
    pub fn error_flags(&self) -> TxErrorFlags {
        TxErrorFlags::from_status(self.status.get())
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

// =============================================================================
// Completion status classification
// =============================================================================

/// Per-frame transmit conditions reported in a completed descriptor.
///
/// The conditions are independent; one frame may report several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxErrorFlags {
    /// Retry limit exceeded
    pub retry_limit: bool,
    /// Frame corrupted by a bus error during transmit
    pub corrupt: bool,
    /// Collision after the slot time
    pub late_collision: bool,
    /// Frame carried its own CRC
    pub crc_present: bool,
    /// Checksum offload error code, `0` when none
    pub checksum_error: u8,
    /// Raw `error[29:20]` range, `0` when no error bit is set
    pub error_bits: u16,
}

impl TxErrorFlags {
    /// Decode a raw status word.
    #[must_use]
    pub const fn from_status(status: u32) -> Self {
        Self {
            retry_limit: status & tx_status::RETRY_LIMIT != 0,
            corrupt: status & tx_status::CORRUPT != 0,
            late_collision: status & tx_status::LATE_COLLISION != 0,
            crc_present: status & tx_status::CRC_PRESENT != 0,
            checksum_error: field_get(
                status,
                tx_status::CHKSUM_ERR_SHIFT,
                tx_status::CHKSUM_ERR_WIDTH,
            ) as u8,
            error_bits: field_get(status, tx_status::ERROR_SHIFT, tx_status::ERROR_WIDTH)
                as u16,
        }
    }

    /// Any bit of the error range set
    #[inline(always)]
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error_bits != 0
    }
}
