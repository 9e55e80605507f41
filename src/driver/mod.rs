//! Core driver components shared by the transmit and receive rings.
//!
//! - [`config`] - Ring policy types and builder patterns
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```ignore
//! use cadence_gem::driver::{TxRingConfig, Error};
//!
//! let config = TxRingConfig::new().with_send_timeout_us(20_000);
//! ```

// Submodules
pub mod config;
pub mod error;

// Re-exports for convenience
pub use config::{RxRingConfig, TxRingConfig};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
