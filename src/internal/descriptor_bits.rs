//! DMA descriptor bit field constants.
//!
//! Based on the Zynq-7000 TRM (UG585), chapter 16, "Gigabit Ethernet
//! Controller", buffer descriptor tables 16-2 and 16-3.
//!
//! Fields are described as `(shift, width)` pairs and read through
//! [`field_get`]/[`field_set`] rather than relying on compiler bit packing.

/// Mask covering `width` bits starting at bit `shift`
#[inline(always)]
pub const fn field_mask(shift: u32, width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        ((1u32 << width) - 1) << shift
    }
}

/// Extract a field value from a raw word
#[inline(always)]
pub const fn field_get(word: u32, shift: u32, width: u32) -> u32 {
    (word & field_mask(shift, width)) >> shift
}

/// Replace a field in a raw word, truncating `value` to the field width
#[inline(always)]
pub const fn field_set(word: u32, shift: u32, width: u32, value: u32) -> u32 {
    let mask = field_mask(shift, width);
    (word & !mask) | ((value << shift) & mask)
}

// =============================================================================
// TX Descriptor Word 1 - Status
// =============================================================================

/// TX descriptor status word (offset 0x04) bit field constants
pub mod tx_status {
    /// Frame length shift (bits 13:0)
    pub const LENGTH_SHIFT: u32 = 0;
    /// Frame length width
    pub const LENGTH_WIDTH: u32 = 14;

    /// Last Buffer - this buffer holds the end of the frame
    pub const LAST_BUFFER: u32 = 1 << 15;
    /// CRC already present - do not append a CRC to the frame
    pub const CRC_PRESENT: u32 = 1 << 16;

    /// Checksum generation offload error shift (bits 22:20)
    pub const CHKSUM_ERR_SHIFT: u32 = 20;
    /// Checksum generation offload error width
    pub const CHKSUM_ERR_WIDTH: u32 = 3;

    /// Late Collision - collision after the slot time (gigabit half duplex)
    pub const LATE_COLLISION: u32 = 1 << 26;
    /// Frame corruption - AHB/AXI error during transmit
    pub const CORRUPT: u32 = 1 << 27;
    /// Retry limit exceeded - transmit error
    pub const RETRY_LIMIT: u32 = 1 << 29;
    /// Wrap - last descriptor of the ring
    pub const WRAP: u32 = 1 << 30;
    /// Used - 0: owned by hardware, 1: owned by software
    pub const USED: u32 = 1 << 31;

    /// Error range shift (bits 29:20)
    pub const ERROR_SHIFT: u32 = 20;
    /// Error range width
    pub const ERROR_WIDTH: u32 = 10;
}

// =============================================================================
// RX Descriptor Word 0 - Address
// =============================================================================

/// RX descriptor address word (offset 0x00) bit field constants
pub mod rx_addr {
    /// Ownership - 0: owned by hardware, 1: software (frame written)
    pub const USED: u32 = 1 << 0;
    /// Wrap - last descriptor of the ring
    pub const WRAP: u32 = 1 << 1;
    /// Buffer address mask (word aligned, bits 31:2)
    pub const ADDRESS_MASK: u32 = !0x3;
}

// =============================================================================
// RX Descriptor Word 1 - Status
// =============================================================================

/// RX descriptor status word (offset 0x04) bit field constants
pub mod rx_status {
    /// Frame length shift (bits 12:0)
    pub const LENGTH_SHIFT: u32 = 0;
    /// Frame length width
    pub const LENGTH_WIDTH: u32 = 13;
    /// Bad FCS (only reported when FCS errors are not discarded)
    pub const BAD_FCS: u32 = 1 << 13;
    /// Start of frame
    pub const START_OF_FRAME: u32 = 1 << 14;
    /// End of frame
    pub const END_OF_FRAME: u32 = 1 << 15;
    /// Checksum offload status shift (bits 23:22)
    pub const CHECKSUM_SHIFT: u32 = 22;
    /// Checksum offload status width
    pub const CHECKSUM_WIDTH: u32 = 2;
    /// Unicast hash match
    pub const UNICAST_HASH: u32 = 1 << 29;
    /// Multicast hash match
    pub const MULTICAST_HASH: u32 = 1 << 30;
    /// Global all-ones broadcast address detected
    pub const BROADCAST: u32 = 1 << 31;
}
