//! Configuration types for the GEM descriptor rings
//!
//! Ring slot counts are const generics on [`crate::TxRing`] and
//! [`crate::RxRing`]; everything else that is policy rather than hardware
//! layout lives here.

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_BUFFER_SIZE, RX_LENGTH_LIMIT, TX_LENGTH_LIMIT, TX_POLL_INTERVAL_US,
    TX_SEND_TIMEOUT_US,
};

// =============================================================================
// Transmit Ring Configuration
// =============================================================================

/// Transmit ring policy
///
/// # Example
///
/// ```ignore
/// let config = TxRingConfig::new()
///     .with_max_frame_size(1536)
///     .with_send_timeout_us(20_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxRingConfig {
    /// Per-slot buffer capacity; larger frames are rejected (no fragmentation)
    pub max_frame_size: usize,
    /// Sleep between polls of a busy head slot, in microseconds
    pub poll_interval_us: u32,
    /// Total wait for a free head slot before `SendTimeout`, in microseconds
    pub send_timeout_us: u32,
}

impl Default for TxRingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TxRingConfig {
    /// Create a new configuration with defaults
    ///
    /// 1600 byte slots, 1 ms poll interval, 10 ms send timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_BUFFER_SIZE,
            poll_interval_us: TX_POLL_INTERVAL_US,
            send_timeout_us: TX_SEND_TIMEOUT_US,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the per-slot maximum frame size
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.poll_interval_us = interval_us;
        self
    }

    /// Set the send timeout
    #[must_use]
    pub const fn with_send_timeout_us(mut self, timeout_us: u32) -> Self {
        self.send_timeout_us = timeout_us;
        self
    }

    /// Number of polls `add_to_queue` performs before giving up
    #[must_use]
    pub const fn max_polls(&self) -> u32 {
        if self.poll_interval_us == 0 {
            return 0;
        }
        self.send_timeout_us.div_ceil(self.poll_interval_us)
    }

    /// Check the configuration for values the hardware cannot honor
    ///
    /// The frame size must fit the 14-bit length field and the poll
    /// interval must be non-zero.
    pub const fn validate(&self) -> ConfigResult<()> {
        if self.max_frame_size == 0 || self.max_frame_size > TX_LENGTH_LIMIT {
            return Err(ConfigError::InvalidConfig);
        }
        if self.poll_interval_us == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

// =============================================================================
// Receive Ring Configuration
// =============================================================================

/// Receive ring policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxRingConfig {
    /// Size of the packet allocated for each receive slot
    pub max_frame_size: usize,
    /// Deliver frames flagged with a bad FCS instead of dropping them
    pub accept_bad_fcs: bool,
}

impl Default for RxRingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RxRingConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_BUFFER_SIZE,
            accept_bad_fcs: false,
        }
    }

    /// Set the per-slot receive buffer size
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Deliver frames with a bad FCS
    #[must_use]
    pub const fn with_accept_bad_fcs(mut self, accept: bool) -> Self {
        self.accept_bad_fcs = accept;
        self
    }

    /// Check the configuration for values the hardware cannot honor
    pub const fn validate(&self) -> ConfigResult<()> {
        if self.max_frame_size == 0 || self.max_frame_size > RX_LENGTH_LIMIT {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}
