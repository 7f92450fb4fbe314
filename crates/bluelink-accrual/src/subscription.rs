//! # Subscription
//!
//! Offering-side views: how much of the target is raised, what is left to
//! buy, and the optimistic checks run before a purchase or withdrawal is
//! handed to the wallet. The contract re-validates everything.

use crate::constants::*;
use crate::maturity::{days_until_maturity, is_matured};
use bluelink_core::units::format_interest_rate;
use bluelink_core::{BasisPoints, BondError, BondOffering, Mist, Result, TimestampMs};
use serde::{Deserialize, Serialize};

/// Raised share of the target in percent, capped at 100
///
/// 0 for a zero target.
pub fn progress_percent(raised: Mist, total: Mist) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (raised as f64 / total as f64 * 100.0).min(100.0)
}

/// Remaining capacity of the offering
pub fn available_amount(offering: &BondOffering) -> Mist {
    offering.total_amount.saturating_sub(offering.amount_raised)
}

/// Target fully subscribed
pub fn is_sold_out(offering: &BondOffering) -> bool {
    offering.total_amount > 0 && offering.amount_raised >= offering.total_amount
}

/// Sale open and capacity left
pub fn can_purchase(offering: &BondOffering) -> bool {
    offering.active && !is_sold_out(offering)
}

/// Check a purchase of `amount` against the snapshot
pub fn validate_purchase(offering: &BondOffering, amount: Mist) -> Result<()> {
    if !offering.active {
        return Err(BondError::OfferingInactive(offering.bond_name.clone()));
    }
    if amount == 0 {
        return Err(BondError::ZeroAmount);
    }
    if amount < MIN_PURCHASE_MIST {
        return Err(BondError::BelowMinimumPurchase {
            amount,
            min: MIN_PURCHASE_MIST,
        });
    }
    let available = available_amount(offering);
    if amount > available {
        return Err(BondError::ExceedsAvailable { amount, available });
    }
    tracing::debug!(offering = offering.id, amount, available, "purchase within limits");
    Ok(())
}

/// Check an issuer withdrawal of `amount` against the raised total
pub fn validate_withdrawal(offering: &BondOffering, amount: Mist) -> Result<()> {
    if amount == 0 {
        return Err(BondError::ZeroAmount);
    }
    if amount > offering.amount_raised {
        return Err(BondError::ExceedsRaisedBalance {
            amount,
            balance: offering.amount_raised,
        });
    }
    Ok(())
}

/// One full year of simple interest on `amount`, for a purchase preview
///
/// Fails with [`BondError::ArithmeticOverflow`] when the interest does not
/// fit in `u64`, which needs a rate above 100%.
pub fn projected_interest(amount: Mist, annual_rate_bps: BasisPoints) -> Result<Mist> {
    let interest = amount as u128 * annual_rate_bps as u128 / BPS_DENOMINATOR as u128;
    Mist::try_from(interest).map_err(|_| BondError::ArithmeticOverflow("projected interest"))
}

/// Case-insensitive match of a wallet against the issuer
pub fn is_issuer(offering: &BondOffering, wallet_address: &str) -> bool {
    offering.issuer_address.eq_ignore_ascii_case(wallet_address)
}

/// Marketplace card values for an offering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferingSummary {
    pub id: u64,
    pub bond_name: String,
    pub rate: String,
    pub total_amount: Mist,
    pub amount_raised: Mist,
    pub available: Mist,
    pub progress_percent: f64,
    pub sold_out: bool,
    pub can_purchase: bool,
    pub matured: bool,
    pub days_until_maturity: u64,
}

impl OfferingSummary {
    /// Summarize `offering` at `now_ms`
    pub fn of(offering: &BondOffering, now_ms: TimestampMs) -> Self {
        let maturity_ms = offering.maturity_ms();
        Self {
            id: offering.id,
            bond_name: offering.bond_name.clone(),
            rate: format_interest_rate(offering.annual_interest_rate),
            total_amount: offering.total_amount,
            amount_raised: offering.amount_raised,
            available: available_amount(offering),
            progress_percent: progress_percent(offering.amount_raised, offering.total_amount),
            sold_out: is_sold_out(offering),
            can_purchase: can_purchase(offering),
            matured: is_matured(maturity_ms, now_ms),
            days_until_maturity: days_until_maturity(maturity_ms, now_ms),
        }
    }
}
