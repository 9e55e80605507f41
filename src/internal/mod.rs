//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`fmt`]: Logging macros forwarding to `defmt` or `log`
//! - [`constants`]: Internal constants and policy defaults
//! - [`descriptor_bits`]: Buffer descriptor bit field constants
//! - [`volatile`]: Volatile cell for descriptor words
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Do not depend on any types
//! or functions in this module from external code. They are subject to change
//! without notice.

#[macro_use]
pub(crate) mod fmt;

pub(crate) mod constants;
pub(crate) mod descriptor_bits;
pub(crate) mod volatile;
