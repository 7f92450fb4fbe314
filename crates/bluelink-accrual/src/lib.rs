//! # BlueLink Accrual - Bond Redemption Math
//!
//! Derived values for bond tokens and offerings, evaluated against an
//! explicit instant.
//!
//! ## Key Features
//!
//! - **Simple interest**: principal × rate × elapsed / (365 days × 10000 bps)
//! - **Maturity clamp**: accrual freezes at maturity however late "now" is
//! - **Exact arithmetic**: one floor division over an integer numerator
//! - **Redemption eligibility**: matured and not yet redeemed
//! - **Subscription checks**: progress, remaining capacity, purchase limits
//! - **Portfolio view**: invested, expected returns, per-status counts
//!
//! ## Accrual
//!
//! ```text
//!   end      = min(now, maturity)
//!   interest = floor(principal * bps * (end - purchase) / (365 * 86_400_000 * 10_000))
//!   value    = principal + interest
//! ```
//!
//! | Principal | Rate | Held | Interest | Redemption |
//! |-----------|------|------|----------|------------|
//! | 1 SUI | 5.00% | 182.5 days | 0.025 SUI | 1.025 SUI |
//! | 1 SUI | 5.00% | 365 days | 0.05 SUI | 1.05 SUI |
//! | 1 SUI | 5.00% | 400 days (matures at 365) | 0.05 SUI | 1.05 SUI |

pub mod accrual;
pub mod maturity;
pub mod portfolio;
pub mod subscription;

// Re-exports
pub use accrual::{
    accrue, compute_expected_interest, compute_redemption_amount, is_redeemable,
    AccrualCalculator, AccrualTerms, RedemptionQuote,
};
pub use maturity::{days_until_maturity, is_matured, PortfolioFilter, TokenStatus};
pub use portfolio::{Portfolio, PortfolioSummary, SkippedToken};
pub use subscription::{
    available_amount, can_purchase, is_issuer, is_sold_out, progress_percent,
    projected_interest, validate_purchase, validate_withdrawal, OfferingSummary,
};

/// Accrual constants
pub mod constants {
    pub use bluelink_core::units::{BPS_DENOMINATOR, MIST_PER_SUI};

    /// Milliseconds in one day
    pub const MS_PER_DAY: i64 = 86_400_000;

    /// Day-count basis for annual rates
    pub const DAYS_PER_YEAR: i64 = 365;

    /// Milliseconds in one accrual year
    pub const MS_PER_YEAR: i64 = DAYS_PER_YEAR * MS_PER_DAY; // 31,536,000,000

    /// Denominator of the accrual fraction: year length times 100% in bps
    pub const ACCRUAL_DENOMINATOR: i128 = MS_PER_YEAR as i128 * BPS_DENOMINATOR as i128;

    /// Smallest accepted purchase: 0.01 SUI
    pub const MIN_PURCHASE_MIST: u64 = MIST_PER_SUI / 100;
}

pub use constants::*;
