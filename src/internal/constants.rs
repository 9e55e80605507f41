//! Centralized Constants
//!
//! This module provides a single source of truth for all magic numbers and
//! policy defaults used throughout the GEM descriptor-ring engine.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Slot capacity and length-field limits
//! - **Ring sizes**: Default descriptor counts
//! - **Timing**: Send timeout and polling interval
//! - **Alignment**: DMA and cache-line alignment
//!
//! # Note
//!
//! Descriptor bit definitions live in `internal::descriptor_bits` as they are
//! specific to the hardware descriptor layout.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Default per-slot buffer capacity in bytes
///
/// Frames larger than this are rejected by the transmit ring, since a
/// descriptor always carries exactly one complete frame.
pub const DEFAULT_BUFFER_SIZE: usize = 1600;

/// Largest length the TX status length field can hold (14 bits)
pub const TX_LENGTH_LIMIT: usize = 0x3FFF;

/// Largest length the RX status length field can hold (13 bits)
pub const RX_LENGTH_LIMIT: usize = 0x1FFF;

// =============================================================================
// Ring Sizes
// =============================================================================

/// Default number of transmit descriptors
pub const DEFAULT_TX_DESCRIPTORS: usize = 1024;

/// Default number of receive descriptors
pub const DEFAULT_RX_DESCRIPTORS: usize = 256;

// =============================================================================
// Timing Constants
// =============================================================================

/// Interval between polls of a busy TX slot, in microseconds
pub const TX_POLL_INTERVAL_US: u32 = 1_000;

/// Total time `add_to_queue` waits for a free TX slot, in microseconds
pub const TX_SEND_TIMEOUT_US: u32 = 10_000;

// =============================================================================
// Alignment
// =============================================================================

/// Preferred alignment of packet buffers handed to the DMA engine.
///
/// Misaligned buffers still work, they only cost bus efficiency.
pub const DMA_PREFERRED_ALIGN: u32 = 32;

/// Cortex-A9 L1 data cache line size in bytes
pub const CACHE_LINE_SIZE: usize = 32;
