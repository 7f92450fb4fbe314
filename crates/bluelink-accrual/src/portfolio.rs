//! # Portfolio
//!
//! Aggregates an investor's bond tokens at one instant.
//!
//! | Figure | Tokens counted | Value |
//! |--------|----------------|-------|
//! | Invested | unredeemed | principal |
//! | Expected returns | unredeemed | redemption amount at `now` |
//! | Expected interest | unredeemed | returns - invested |
//!
//! A token whose terms cannot be evaluated (purchase after maturity, or
//! bought after `now`, which happens when the local clock lags the chain) is
//! left out of the totals and reported in `skipped` rather than failing the
//! whole view.

use crate::accrual::{is_redeemable, AccrualTerms, RedemptionQuote};
use crate::maturity::{PortfolioFilter, TokenStatus};
use bluelink_core::{BondError, BondToken, Mist, Result, TimestampMs};
use serde::{Deserialize, Serialize};

/// Token excluded from the totals
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedToken {
    pub token_id: u64,
    pub code: u32,
    pub reason: String,
}

/// Portfolio totals at one instant
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Instant the summary was evaluated at
    pub evaluated_at_ms: TimestampMs,

    pub total_tokens: u64,
    pub active: u64,
    pub matured: u64,
    pub redeemed: u64,

    /// Principal of unredeemed tokens
    pub total_invested: Mist,

    /// Redemption value of unredeemed tokens
    pub total_expected_returns: Mist,

    /// Interest accrued on unredeemed tokens
    pub total_expected_interest: Mist,

    /// Ids of tokens the redeem action is offered for
    pub redeemable: Vec<u64>,

    /// Tokens left out of the totals
    pub skipped: Vec<SkippedToken>,
}

/// An investor's tokens
#[derive(Clone, Debug, Default)]
pub struct Portfolio {
    tokens: Vec<BondToken>,
}

impl Portfolio {
    /// Create a portfolio over `tokens`
    pub fn new(tokens: Vec<BondToken>) -> Self {
        Self { tokens }
    }

    /// All tokens
    pub fn tokens(&self) -> &[BondToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens passing `filter` at `now_ms`
    pub fn filter(&self, filter: PortfolioFilter, now_ms: TimestampMs) -> Vec<&BondToken> {
        self.tokens
            .iter()
            .filter(|t| filter.matches(TokenStatus::of(t, now_ms)))
            .collect()
    }

    /// Tokens the redeem action is offered for at `now_ms`
    pub fn redeemable(&self, now_ms: TimestampMs) -> Vec<&BondToken> {
        self.tokens
            .iter()
            .filter(|t| is_redeemable(t, now_ms))
            .collect()
    }

    /// Quote every token passing `filter`; invalid tokens yield their error
    pub fn quotes(
        &self,
        filter: PortfolioFilter,
        now_ms: TimestampMs,
    ) -> Vec<(u64, Result<RedemptionQuote>)> {
        self.filter(filter, now_ms)
            .into_iter()
            .map(|t| (t.id, RedemptionQuote::for_token(t, now_ms)))
            .collect()
    }

    /// Totals at `now_ms`
    ///
    /// Fails only if a total overflows `u64`.
    pub fn summary(&self, now_ms: TimestampMs) -> Result<PortfolioSummary> {
        let mut summary = PortfolioSummary {
            evaluated_at_ms: now_ms,
            total_tokens: self.tokens.len() as u64,
            ..Default::default()
        };

        for token in &self.tokens {
            match TokenStatus::of(token, now_ms) {
                TokenStatus::Active => summary.active += 1,
                TokenStatus::Matured => summary.matured += 1,
                TokenStatus::Redeemed => {
                    summary.redeemed += 1;
                    continue;
                }
            }

            let amount = match AccrualTerms::from_token(token)
                .and_then(|terms| terms.redemption_amount(now_ms))
            {
                Ok(amount) => amount,
                Err(err) => {
                    tracing::warn!(
                        token = token.id,
                        error = %err,
                        "token left out of portfolio totals"
                    );
                    summary.skipped.push(SkippedToken {
                        token_id: token.id,
                        code: err.code(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            summary.total_invested = summary
                .total_invested
                .checked_add(token.amount)
                .ok_or(BondError::ArithmeticOverflow("total invested"))?;
            summary.total_expected_returns = summary
                .total_expected_returns
                .checked_add(amount)
                .ok_or(BondError::ArithmeticOverflow("total expected returns"))?;

            if is_redeemable(token, now_ms) {
                summary.redeemable.push(token.id);
            }
        }

        summary.total_expected_interest =
            summary.total_expected_returns - summary.total_invested;

        tracing::debug!(
            tokens = summary.total_tokens,
            invested = summary.total_invested,
            returns = summary.total_expected_returns,
            skipped = summary.skipped.len(),
            "portfolio summarized"
        );

        Ok(summary)
    }
}

impl From<Vec<BondToken>> for Portfolio {
    fn from(tokens: Vec<BondToken>) -> Self {
        Self::new(tokens)
    }
}
