//! Error types for the waycache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (the only invalid parameter is a way count of zero, which would make
//!   the set-index modulus undefined).
//! - [`InvariantError`]: Returned by `check_invariants` methods when the
//!   store's internal representation is inconsistent (index and sets out
//!   of sync, an overfull set, or an entry in a set its hash does not
//!   route to).
//!
//! ## Example Usage
//!
//! ```
//! use waycache::error::ConfigError;
//! use waycache::store::SetAssocCore;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<SetAssocCore<u64, i32>, ConfigError> = SetAssocCore::try_new(4);
//! assert!(cache.is_ok());
//!
//! // A zero way count is caught without panicking
//! let bad = SetAssocCore::<u64, i32>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Produced by the fallible constructors
/// [`SetAssocCore::try_new`](crate::store::SetAssocCore::try_new) and
/// [`SetAssocCore::try_with_policy`](crate::store::SetAssocCore::try_with_policy).
/// Carries a human-readable description of which parameter failed
/// validation.
///
/// # Example
///
/// ```
/// use waycache::store::SetAssocCore;
///
/// let err = SetAssocCore::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("way count"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal store invariants are violated.
///
/// Produced by
/// [`SetAssocCore::check_invariants`](crate::store::SetAssocCore::check_invariants).
/// A non-`Ok` result means the index and the sets disagree about which
/// keys exist, a set holds more entries than the way bound allows, or an
/// entry sits in a set its routing hash does not select. Carries a
/// human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
