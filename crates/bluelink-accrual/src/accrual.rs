//! # Accrual Calculation
//!
//! Converts a bond token's principal, annual rate, purchase time and
//! maturity time into its redemption value at a given instant.
//!
//! Every operation takes the evaluation instant explicitly. [`AccrualCalculator`]
//! is a thin wrapper that supplies it from a [`Clock`].
//!
//! The arithmetic is a single integer numerator floored once by
//! [`ACCRUAL_DENOMINATOR`], so the result equals
//! `floor(principal + principal * bps * elapsed_days / (365 * 10000))`
//! computed over exact rationals.

use crate::constants::*;
use crate::maturity::{days_until_maturity, TokenStatus};
use bluelink_core::{
    BasisPoints, BondError, BondToken, Clock, Mist, Result, SystemClock, TimestampMs,
};
use serde::{Deserialize, Serialize};

/// Accrual inputs of one token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualTerms {
    /// Principal
    pub principal: Mist,

    /// Annual simple interest rate
    pub annual_rate_bps: BasisPoints,

    /// Purchase instant
    pub purchase_ms: TimestampMs,

    /// Maturity instant
    pub maturity_ms: TimestampMs,
}

impl AccrualTerms {
    /// Build terms, rejecting a purchase after maturity
    pub fn new(
        principal: Mist,
        annual_rate_bps: BasisPoints,
        purchase_ms: TimestampMs,
        maturity_ms: TimestampMs,
    ) -> Result<Self> {
        if purchase_ms > maturity_ms {
            return Err(BondError::InvalidTerms {
                purchase_ms,
                maturity_ms,
            });
        }
        Ok(Self {
            principal,
            annual_rate_bps,
            purchase_ms,
            maturity_ms,
        })
    }

    /// Terms recorded on a token snapshot
    pub fn from_token(token: &BondToken) -> Result<Self> {
        Self::new(
            token.amount,
            token.annual_interest_rate,
            token.purchase_date,
            token.maturity_date,
        )
    }

    /// Last instant that accrues interest when evaluated at `now_ms`
    pub fn accrual_end(&self, now_ms: TimestampMs) -> TimestampMs {
        now_ms.min(self.maturity_ms)
    }

    /// Fractional days accrued at `now_ms`, for display
    pub fn elapsed_days(&self, now_ms: TimestampMs) -> f64 {
        let elapsed_ms = self.accrual_end(now_ms) as i128 - self.purchase_ms as i128;
        elapsed_ms as f64 / MS_PER_DAY as f64
    }

    /// Principal plus accrued interest at `now_ms`
    pub fn redemption_amount(&self, now_ms: TimestampMs) -> Result<Mist> {
        if now_ms < self.purchase_ms {
            tracing::warn!(
                now_ms,
                purchase_ms = self.purchase_ms,
                "accrual evaluated before purchase"
            );
            return Err(BondError::EvaluationBeforePurchase {
                now_ms,
                purchase_ms: self.purchase_ms,
            });
        }

        let value = accrue(
            self.principal,
            self.annual_rate_bps,
            self.purchase_ms,
            self.maturity_ms,
            now_ms,
        )?;

        Mist::try_from(value).map_err(|_| BondError::ArithmeticOverflow("redemption amount"))
    }

    /// Accrued interest at `now_ms`
    pub fn expected_interest(&self, now_ms: TimestampMs) -> Result<Mist> {
        Ok(self.redemption_amount(now_ms)? - self.principal)
    }
}

/// Unvalidated accrual value
///
/// Never panics. When `now_ms` precedes `purchase_ms` the elapsed time is
/// negative and the value falls below principal (possibly below zero); the
/// caller has to treat that as an input error. Fails only when the numerator
/// does not fit in `i128`.
pub fn accrue(
    principal: Mist,
    annual_rate_bps: BasisPoints,
    purchase_ms: TimestampMs,
    maturity_ms: TimestampMs,
    now_ms: TimestampMs,
) -> Result<i128> {
    let end = now_ms.min(maturity_ms);
    let elapsed_ms = end as i128 - purchase_ms as i128;

    let numerator = (principal as i128)
        .checked_mul(annual_rate_bps as i128)
        .and_then(|x| x.checked_mul(elapsed_ms))
        .ok_or(BondError::ArithmeticOverflow("accrued interest"))?;

    let interest = numerator.div_euclid(ACCRUAL_DENOMINATOR);

    tracing::trace!(
        principal,
        annual_rate_bps,
        elapsed_ms = %elapsed_ms,
        interest = %interest,
        "accrued"
    );

    Ok(principal as i128 + interest)
}

/// Redemption amount at `now_ms`: principal plus simple interest, clamped at maturity
pub fn compute_redemption_amount(
    principal: Mist,
    annual_rate_bps: BasisPoints,
    purchase_ms: TimestampMs,
    maturity_ms: TimestampMs,
    now_ms: TimestampMs,
) -> Result<Mist> {
    AccrualTerms::new(principal, annual_rate_bps, purchase_ms, maturity_ms)?
        .redemption_amount(now_ms)
}

/// Redemption amount minus principal
pub fn compute_expected_interest(
    principal: Mist,
    annual_rate_bps: BasisPoints,
    purchase_ms: TimestampMs,
    maturity_ms: TimestampMs,
    now_ms: TimestampMs,
) -> Result<Mist> {
    let amount =
        compute_redemption_amount(principal, annual_rate_bps, purchase_ms, maturity_ms, now_ms)?;
    Ok(amount - principal)
}

/// Whether the redeem action should be offered
///
/// Matured and not already redeemed. The ledger contract decides whether a
/// redemption actually succeeds; this only reflects the snapshot.
pub fn is_redeemable(token: &BondToken, now_ms: TimestampMs) -> bool {
    now_ms >= token.maturity_date && !token.is_redeemed
}

/// Everything a token card shows, evaluated at one instant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedemptionQuote {
    /// Backend token id
    pub token_id: u64,

    /// Instant the quote was evaluated at
    pub evaluated_at_ms: TimestampMs,

    /// Principal
    pub principal: Mist,

    /// Accrued interest
    pub interest: Mist,

    /// Principal plus interest
    pub redemption_amount: Mist,

    /// Fractional days accrued
    pub elapsed_days: f64,

    /// Whole days left, rounded up, 0 once matured
    pub days_until_maturity: u64,

    /// Lifecycle status
    pub status: TokenStatus,

    /// Redeem action available
    pub redeemable: bool,
}

impl RedemptionQuote {
    /// Quote a token at `now_ms`
    pub fn for_token(token: &BondToken, now_ms: TimestampMs) -> Result<Self> {
        let terms = AccrualTerms::from_token(token)?;
        let redemption_amount = terms.redemption_amount(now_ms)?;

        Ok(Self {
            token_id: token.id,
            evaluated_at_ms: now_ms,
            principal: terms.principal,
            interest: redemption_amount - terms.principal,
            redemption_amount,
            elapsed_days: terms.elapsed_days(now_ms),
            days_until_maturity: days_until_maturity(token.maturity_date, now_ms),
            status: TokenStatus::of(token, now_ms),
            redeemable: is_redeemable(token, now_ms),
        })
    }
}

/// Accrual calculator bound to a clock
///
/// Stateless apart from the clock; cheap to clone when the clock is.
#[derive(Clone, Debug, Default)]
pub struct AccrualCalculator<C = SystemClock> {
    clock: C,
}

impl AccrualCalculator<SystemClock> {
    /// Calculator reading the wall clock
    pub fn system() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> AccrualCalculator<C> {
    /// Create a calculator over `clock`
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Current evaluation instant
    pub fn now_ms(&self) -> TimestampMs {
        self.clock.now_ms()
    }

    /// The underlying clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Redemption amount of `token` now
    pub fn redemption_amount(&self, token: &BondToken) -> Result<Mist> {
        AccrualTerms::from_token(token)?.redemption_amount(self.now_ms())
    }

    /// Accrued interest of `token` now
    pub fn expected_interest(&self, token: &BondToken) -> Result<Mist> {
        AccrualTerms::from_token(token)?.expected_interest(self.now_ms())
    }

    /// Whether `token` can be redeemed now
    pub fn is_redeemable(&self, token: &BondToken) -> bool {
        is_redeemable(token, self.now_ms())
    }

    /// Full quote for `token` now
    pub fn quote(&self, token: &BondToken) -> Result<RedemptionQuote> {
        RedemptionQuote::for_token(token, self.now_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluelink_core::ManualClock;

    const ONE_SUI: Mist = 1_000_000_000;

    fn token(maturity_ms: TimestampMs, is_redeemed: bool) -> BondToken {
        BondToken {
            id: 1,
            on_chain_id: "0xtoken".into(),
            project_id: "0xproject".into(),
            bond_name: "Test Bond".into(),
            token_image_url: String::new(),
            maturity_date: maturity_ms,
            annual_interest_rate: 500,
            token_number: 1,
            owner: "0xowner".into(),
            amount: ONE_SUI,
            purchase_date: 0,
            is_redeemed,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_full_year() {
        let amount = compute_redemption_amount(ONE_SUI, 500, 0, MS_PER_YEAR, MS_PER_YEAR).unwrap();
        assert_eq!(amount, 1_050_000_000);

        let interest =
            compute_expected_interest(ONE_SUI, 500, 0, MS_PER_YEAR, MS_PER_YEAR).unwrap();
        assert_eq!(interest, 50_000_000);
    }

    #[test]
    fn test_half_year() {
        let half = MS_PER_YEAR / 2;
        let amount = compute_redemption_amount(ONE_SUI, 500, 0, MS_PER_YEAR, half).unwrap();
        assert_eq!(amount, 1_025_000_000);
    }

    #[test]
    fn test_clamped_after_maturity() {
        let at_maturity =
            compute_redemption_amount(ONE_SUI, 500, 0, MS_PER_YEAR, MS_PER_YEAR).unwrap();
        let later =
            compute_redemption_amount(ONE_SUI, 500, 0, MS_PER_YEAR, 400 * MS_PER_DAY).unwrap();
        assert_eq!(at_maturity, later);
    }

    #[test]
    fn test_zero_principal() {
        for now in [0, MS_PER_DAY, MS_PER_YEAR, 10 * MS_PER_YEAR] {
            assert_eq!(
                compute_redemption_amount(0, 10_000, 0, MS_PER_YEAR, now).unwrap(),
                0
            );
        }
    }

    #[test]
    fn test_floor_of_partial_unit() {
        // 1 MIST at 100% for one day: 1/365 MIST floors away
        assert_eq!(compute_redemption_amount(1, 10_000, 0, MS_PER_YEAR, MS_PER_DAY).unwrap(), 1);
        // 365 MIST at 100% for one day: exactly 1 MIST of interest
        let amount = compute_redemption_amount(365, 10_000, 0, MS_PER_YEAR, MS_PER_DAY).unwrap();
        assert_eq!(amount, 366);
    }

    #[test]
    fn test_fractional_days_accrue() {
        // 12 hours on 365 SUI at 100% earns 0.5 SUI
        let principal = 365 * ONE_SUI;
        let interest =
            compute_expected_interest(principal, 10_000, 0, MS_PER_YEAR, MS_PER_DAY / 2).unwrap();
        assert_eq!(interest, ONE_SUI / 2);
    }

    #[test]
    fn test_before_purchase_is_rejected() {
        let err = compute_redemption_amount(ONE_SUI, 500, 1_000, MS_PER_YEAR, 0).unwrap_err();
        assert_eq!(
            err,
            BondError::EvaluationBeforePurchase {
                now_ms: 0,
                purchase_ms: 1_000
            }
        );
    }

    #[test]
    fn test_accrue_before_purchase_is_below_principal() {
        let value = accrue(ONE_SUI, 500, MS_PER_DAY, MS_PER_YEAR, 0).unwrap();
        assert!(value < ONE_SUI as i128);
    }

    #[test]
    fn test_purchase_after_maturity_is_rejected() {
        let err = compute_redemption_amount(ONE_SUI, 500, 10, 5, 20).unwrap_err();
        assert_eq!(err.code(), 1001);
    }

    #[test]
    fn test_elapsed_days_spans_full_timestamp_range() {
        let terms = AccrualTerms::new(0, 500, i64::MIN, 0).unwrap();
        let expected = -(i64::MIN as f64) / MS_PER_DAY as f64;
        assert_eq!(terms.elapsed_days(0), expected);

        let mut t = token(0, false);
        t.amount = 0;
        t.purchase_date = i64::MIN;
        let quote = RedemptionQuote::for_token(&t, 0).unwrap();
        assert_eq!(quote.redemption_amount, 0);
        assert!(quote.elapsed_days > 0.0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = accrue(u64::MAX, u32::MAX, i64::MIN, i64::MAX, i64::MAX).unwrap_err();
        assert!(matches!(err, BondError::ArithmeticOverflow(_)));
    }

    #[test]
    fn test_is_redeemable() {
        assert!(!is_redeemable(&token(MS_PER_YEAR, false), MS_PER_YEAR - 1));
        assert!(is_redeemable(&token(MS_PER_YEAR, false), MS_PER_YEAR));
        assert!(is_redeemable(&token(MS_PER_YEAR, false), MS_PER_YEAR + 1));
        assert!(!is_redeemable(&token(MS_PER_YEAR, true), MS_PER_YEAR + 1));
    }

    #[test]
    fn test_quote() {
        let quote =
            RedemptionQuote::for_token(&token(MS_PER_YEAR, false), MS_PER_YEAR / 2).unwrap();

        assert_eq!(quote.principal, ONE_SUI);
        assert_eq!(quote.interest, 25_000_000);
        assert_eq!(quote.redemption_amount, 1_025_000_000);
        assert_eq!(quote.days_until_maturity, 183);
        assert_eq!(quote.status, TokenStatus::Active);
        assert!(!quote.redeemable);
        assert!((quote.elapsed_days - 182.5).abs() < 1e-9);
    }

    #[test]
    fn test_calculator_follows_clock() {
        let clock = ManualClock::new(0);
        let calculator = AccrualCalculator::new(clock.clone());
        let t = token(MS_PER_YEAR, false);

        assert_eq!(calculator.redemption_amount(&t).unwrap(), ONE_SUI);
        assert!(!calculator.is_redeemable(&t));

        clock.set(MS_PER_YEAR);
        assert_eq!(calculator.expected_interest(&t).unwrap(), 50_000_000);
        assert!(calculator.is_redeemable(&t));
        assert!(calculator.quote(&t).unwrap().redeemable);
    }
}
