//! Descriptor-ring engine
//!
//! This module moves frames between session packet buffers and the GEM's
//! DMA engine. Nothing is allocated on the per-packet path: each ring takes
//! one uncached descriptor table from the platform's DMA allocator when it is
//! built and sizes it with const generics.
//!
//! # Architecture
//!
//! - [`DescriptorRing`]: Circular table of descriptors in DMA memory with
//!   head/tail indices
//! - [`DmaPool`]: Translation between packet offsets and bus addresses
//!   ([`ZeroCopyDmaPool`], [`BufferedDmaPool`])
//! - [`TxRing`]: Transmit controller (enqueue, bounded wait, reclaim, reset)
//! - [`RxRing`]: Receive controller (refill, receive, reset)
//!
//! # Example
//!
//! ```ignore
//! use cadence_gem::dma::{TxRing, ZeroCopyDmaPool};
//! use cadence_gem::hal::NoCacheMaintenance;
//! use cadence_gem::TxRingConfig;
//!
//! let pool = ZeroCopyDmaPool::from_buffer(&session)?;
//! let mut tx: TxRing<_, _, _, _, _, 256> =
//!     TxRing::new(&mut dma, session, pool, NoCacheMaintenance, delay, TxRingConfig::new())?;
//!
//! gem.set_tx_queue_base(tx.descriptor_table_addr());
//!
//! tx.add_to_queue(packet)?;
//! gem.start_transmit();
//!
//! // Later, from the driver's poll loop
//! let summary = tx.submit_acks();
//! ```

pub mod descriptor;
pub mod pool;
pub mod ring;
pub mod rx;
pub mod tx;

pub use descriptor::{RxDescriptor, TxDescriptor, TxErrorFlags};
pub use pool::{BufferedDmaPool, DmaPool, ZeroCopyDmaPool};
pub use ring::DescriptorRing;
pub use rx::{RxOutcome, RxRing, RxStats};
pub use tx::{AckSummary, TxRing, TxStats};
