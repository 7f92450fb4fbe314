//! Maturity and token lifecycle status

use crate::constants::MS_PER_DAY;
use bluelink_core::{BondError, BondToken, TimestampMs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether `maturity_ms` has been reached at `now_ms`
pub fn is_matured(maturity_ms: TimestampMs, now_ms: TimestampMs) -> bool {
    maturity_ms <= now_ms
}

/// Whole days until maturity, rounded up, 0 once matured
pub fn days_until_maturity(maturity_ms: TimestampMs, now_ms: TimestampMs) -> u64 {
    if is_matured(maturity_ms, now_ms) {
        return 0;
    }
    let remaining = maturity_ms as i128 - now_ms as i128;
    let days = (remaining + MS_PER_DAY as i128 - 1) / MS_PER_DAY as i128;
    days as u64
}

/// Lifecycle status of a bond token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    /// Accruing, not yet matured
    Active,
    /// Matured, waiting for redemption
    Matured,
    /// Redemption settled
    Redeemed,
}

impl TokenStatus {
    /// Status of `token` at `now_ms`; redemption takes precedence over maturity
    pub fn of(token: &BondToken, now_ms: TimestampMs) -> Self {
        if token.is_redeemed {
            Self::Redeemed
        } else if is_matured(token.maturity_date, now_ms) {
            Self::Matured
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Matured => "matured",
            Self::Redeemed => "redeemed",
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Portfolio listing filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioFilter {
    #[default]
    All,
    Active,
    Matured,
    Redeemed,
}

impl PortfolioFilter {
    /// Whether a token with `status` passes the filter
    pub fn matches(&self, status: TokenStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == TokenStatus::Active,
            Self::Matured => status == TokenStatus::Matured,
            Self::Redeemed => status == TokenStatus::Redeemed,
        }
    }
}

impl FromStr for PortfolioFilter {
    type Err = BondError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "matured" => Ok(Self::Matured),
            "redeemed" => Ok(Self::Redeemed),
            other => Err(BondError::InvalidInput(format!(
                "unknown filter '{}', expected all, active, matured or redeemed",
                other
            ))),
        }
    }
}
