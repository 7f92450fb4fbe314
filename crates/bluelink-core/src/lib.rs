//! # BlueLink Core
//!
//! Core data model for the BlueLink bond-tokenization client.
//!
//! This crate provides the fundamental building blocks:
//! - `BondOffering` - Issuer-created fundraising instrument (backend snapshot)
//! - `BondToken` - One investor's non-fungible claim against an offering
//! - `Clock` - Injectable source of the evaluation instant
//! - `units` - Exact MIST/SUI and basis-point conversions
//! - `ApiResponse` - The backend's uniform response envelope
//!
//! ## Ownership
//!
//! The ledger contract owns and mutates every record; the backend indexes
//! them. Nothing here writes state back, it only derives values.
//!
//! ```text
//!   ledger contract ──► backend index ──► BondOffering / BondToken snapshot
//!                                                  │
//!                                                  ▼
//!                                         accrual (bluelink-accrual)
//! ```

pub mod clock;
pub mod envelope;
pub mod error;
pub mod types;
pub mod units;

pub use clock::*;
pub use envelope::*;
pub use error::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::envelope::ApiResponse;
    pub use crate::error::{BondError, Result};
    pub use crate::types::*;
    pub use crate::units::{format_interest_rate, format_sui, parse_sui, MIST_PER_SUI};
}
