//! TX and RX buffer descriptor structures.
//!
//! Each descriptor is two 32-bit words shared with the GEM DMA engine: a
//! buffer address and a status word. Ownership of a slot is decided by a
//! single `used` bit, located in the status word for transmit and in the
//! address word for receive.

pub mod rx;
pub mod tx;

pub use rx::RxDescriptor;
pub use tx::{TxDescriptor, TxErrorFlags};
