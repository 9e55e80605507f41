//! Error types for the GEM descriptor-ring engine
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Construction and configuration failures
//! - [`DmaError`]: DMA pool translation and copy failures
//! - [`IoError`]: Runtime TX/RX failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by the ring operations.
//!
//! Per-frame hardware conditions (collisions, corruption, checksum errors)
//! are not errors. They are observational and reported
//! through [`crate::dma::AckSummary`] and [`crate::dma::TxStats`].

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and construction errors
///
/// These errors are fatal: the driver cannot start without valid policy
/// values and DMA-capable memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// Platform could not allocate DMA memory of the requested size
    AllocationFailed,
    /// Platform did not report a DMA address for the memory region
    DmaUnavailable,
    /// Descriptor memory is too small for the ring or not word aligned
    DescriptorMemory,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::AllocationFailed => "DMA memory allocation failed",
            ConfigError::DmaUnavailable => "no DMA address for memory region",
            ConfigError::DescriptorMemory => "descriptor memory too small or misaligned",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// DMA pool errors
///
/// These errors relate to translating packets into the DMA region and
/// copying their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Packet region does not lie inside the DMA region
    OutOfRange,
    /// Packet buffer could not provide the packet's content
    ContentUnavailable,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::OutOfRange => "packet outside DMA region",
            DmaError::ContentUnavailable => "packet content unavailable",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime TX/RX errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Hardware did not release a TX slot within the send timeout
    ///
    /// Signals ring saturation or a stalled DMA engine. The caller decides
    /// whether to drop the frame, retry later or reset the ring.
    SendTimeout,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::SendTimeout => "send timed out waiting for a free descriptor",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match tx.add_to_queue(packet) {
///     Err(Error::Io(IoError::SendTimeout)) => { /* drop, retry or reset */ }
///     Err(e) => { /* ... */ }
///     Ok(()) => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for ring operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA pool operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
