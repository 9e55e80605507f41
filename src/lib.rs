//! Cadence GEM Descriptor-Ring Engine
//!
//! A `no_std`, `no_alloc` Rust implementation of the buffer-descriptor rings and
//! DMA address translation for the Cadence Gigabit Ethernet MAC (GEM), as found
//! on Xilinx Zynq-7000 devices.
//!
//! The crate moves Ethernet frames between a packet buffer shared with session
//! clients and hardware-owned descriptor memory. Completion is detected by
//! polling the descriptors' `used` bits; no interrupts are required.
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! 1. **Ring Layer** ([`dma`]): Descriptor rings, transmit and receive controllers
//! 2. **Translation Layer** ([`dma::pool`]): Packet offset to bus address mapping,
//!    zero-copy or through a separate DMA region
//! 3. **Platform Layer** ([`hal`], [`session`]): DMA memory, cache maintenance
//!    and the packet-buffer session, expressed as traits
//!
//! ## Hardware Reference
//!
//! - **Zynq-7000 TRM (UG585)**, chapter 16: buffer descriptor layouts
//! - **Cortex-A9**: 32-byte L1 data cache lines, CP15 maintenance by MVA
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for public types and defmt logging
//! - `log`: Log through the `log` facade (ignored when `defmt` is enabled)
//!
//! # Example
//!
//! ```ignore
//! use cadence_gem::{TxRing, TxRingConfig, ZeroCopyDmaPool};
//! use cadence_gem::hal::ArmV7DataCache;
//!
//! // Session packet buffer from your NIC session server
//! let session = /* your TxSink implementation */;
//! let delay = /* your DelayNs implementation */;
//! let dma = /* your DmaAllocator implementation */;
//!
//! let pool = ZeroCopyDmaPool::from_buffer(&session)?;
//! let config = TxRingConfig::new().with_send_timeout_us(10_000);
//!
//! let mut tx: TxRing<_, _, _, _, _> =
//!     TxRing::new(&mut dma, session, pool, ArmV7DataCache, delay, config)?;
//! gem.set_tx_queue_base(tx.descriptor_table_addr());
//!
//! match tx.add_to_queue(packet) {
//!     Ok(()) => gem.start_transmit(),
//!     Err(Error::Io(IoError::SendTimeout)) => { tx.reset(); }
//!     Err(e) => return Err(e),
//! }
//!
//! let summary = tx.submit_acks();
//! ```
//!
//! # Memory Requirements
//!
//! Each descriptor is 8 bytes. Descriptor tables are allocated once, uncached,
//! from the platform's [`hal::DmaAllocator`]: 8 KB for the default 1024-slot
//! transmit ring and 2 KB for the default 256-slot receive ring. The receive
//! ring also keeps 8 bytes of bookkeeping per slot inline.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// Internal implementation details (pub(crate) only); first so the logging
// macros are visible to every module below
#[macro_use]
mod internal;

// =============================================================================
// Modules
// =============================================================================

pub mod dma;
pub mod driver;
pub mod hal;
pub mod session;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use dma::{
    AckSummary, BufferedDmaPool, DmaPool, RxOutcome, RxRing, RxStats, TxRing, TxStats,
    ZeroCopyDmaPool,
};
pub use driver::config::{RxRingConfig, TxRingConfig};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use session::{Dataspace, PacketBuffer, PacketDescriptor, RxSource, TxSink};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on ring types and platform traits.
pub mod constants {
    pub use crate::internal::constants::{
        // Alignment
        CACHE_LINE_SIZE,
        DMA_PREFERRED_ALIGN,
        // Frame/buffer sizes
        DEFAULT_BUFFER_SIZE,
        RX_LENGTH_LIMIT,
        TX_LENGTH_LIMIT,
        // Ring sizes
        DEFAULT_RX_DESCRIPTORS,
        DEFAULT_TX_DESCRIPTORS,
        // Timing
        TX_POLL_INTERVAL_US,
        TX_SEND_TIMEOUT_US,
    };
}
