//! Hardware Abstraction Layer
//!
//! Platform services the descriptor rings depend on, expressed as traits so
//! the rings run unchanged on a microkernel, on bare metal, and on the host
//! under test.
//!
//! # Modules
//!
//! - [`platform`]: DMA memory allocation and cache-maintenance traits
//! - [`cache`]: Data-cache maintenance implementations
//!
//! # Delay Integration
//!
//! The transmit ring's send-timeout polling uses `embedded_hal::delay::DelayNs`
//! directly. Pass any delay implementation from your HAL or timer session.

pub mod cache;
pub mod platform;

// Re-export commonly used types
#[cfg(target_arch = "arm")]
pub use cache::ArmV7DataCache;
pub use cache::NoCacheMaintenance;
pub use platform::{CachePolicy, DataCache, DmaAddr, DmaAllocator, DmaBuffer};
