//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors that validate inputs.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use oddswatch::domain::error::DomainError;
//! use oddswatch::domain::{MatchKey, MatchOdds, OddsSnapshot, Prices};
//! use rust_decimal_macros::dec;
//!
//! let odds = MatchOdds::new(
//!     MatchKey::event("42"),
//!     "Premier League",
//!     "Arsenal",
//!     "Chelsea",
//!     None,
//!     Prices::new(dec!(1.9), dec!(3.4), dec!(4.2)),
//! );
//!
//! // The same key twice violates snapshot uniqueness.
//! let result = OddsSnapshot::try_new(vec![odds.clone(), odds], Utc::now());
//! assert!(matches!(result, Err(DomainError::DuplicateMatchKey { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Match keys must be unique within one snapshot.
    #[error("duplicate match key {key} in snapshot")]
    DuplicateMatchKey {
        /// Display form of the repeated key.
        key: String,
    },

    /// Decimal odds are always strictly positive.
    #[error("price for {outcome} must be positive, got {price}")]
    NonPositivePrice {
        /// Which outcome carried the invalid price.
        outcome: &'static str,
        /// The rejected price.
        price: rust_decimal::Decimal,
    },

    /// The soft memory limit must sit below the hard limit.
    #[error("soft memory limit {soft} must be below hard limit {hard}")]
    InvertedMemoryLimits {
        /// Soft limit in bytes.
        soft: u64,
        /// Hard limit in bytes.
        hard: u64,
    },

    /// A limit given in megabytes does not fit in a byte count.
    #[error("memory limit of {mb} MB is out of range")]
    MemoryLimitOutOfRange {
        /// The rejected limit in megabytes.
        mb: u64,
    },
}
