//! Core type definitions for BlueLink
//!
//! Snapshots of the two records the backend index serves: bond offerings
//! created by issuers and the bond tokens investors hold. Field names follow
//! the backend JSON schema so snapshots deserialize without adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in MIST, the smallest on-chain unit (10^9 MIST = 1 SUI)
pub type Mist = u64;

/// Rate in basis points (10000 = 100%)
pub type BasisPoints = u32;

/// Unix timestamp in milliseconds
pub type TimestampMs = i64;

/// Bond offering as indexed by the backend
///
/// Owned and mutated by the ledger contract; this is a read-only snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondOffering {
    /// Backend row id
    pub id: u64,

    /// Bond project object id on chain
    pub on_chain_id: String,

    /// Issuer wallet address
    pub issuer_address: String,

    /// Issuer display name
    #[serde(default)]
    pub issuer_name: String,

    /// Bond display name
    pub bond_name: String,

    #[serde(default)]
    pub bond_image_url: String,

    #[serde(default)]
    pub token_image_url: String,

    #[serde(default)]
    pub metadata_url: String,

    /// Subscription target
    pub total_amount: Mist,

    /// Amount subscribed so far
    pub amount_raised: Mist,

    /// Amount paid out to redeeming investors
    #[serde(default)]
    pub amount_redeemed: Mist,

    #[serde(default)]
    pub tokens_issued: u64,

    #[serde(default)]
    pub tokens_redeemed: u64,

    /// Annual simple interest rate
    pub annual_interest_rate: BasisPoints,

    /// Maturity instant
    #[serde(with = "iso_date")]
    pub maturity_date: DateTime<Utc>,

    /// Issue instant
    #[serde(with = "iso_date")]
    pub issue_date: DateTime<Utc>,

    /// Sale is open (not paused)
    pub active: bool,

    /// Redemption pool has been opened by the issuer
    #[serde(default)]
    pub redeemable: bool,

    /// Raised funds still held by the contract
    #[serde(default)]
    pub raised_funds_balance: Mist,

    /// Funds deposited for redemptions
    #[serde(default)]
    pub redemption_pool_balance: Mist,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

impl BondOffering {
    /// Maturity as Unix milliseconds
    pub fn maturity_ms(&self) -> TimestampMs {
        self.maturity_date.timestamp_millis()
    }

    /// Issue date as Unix milliseconds
    pub fn issue_ms(&self) -> TimestampMs {
        self.issue_date.timestamp_millis()
    }
}

impl fmt::Display for BondOffering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.bond_name, self.id)
    }
}

/// Non-fungible claim held by one investor
///
/// Created by a purchase, consumed by a redemption. The rate is fixed at
/// purchase time for the life of the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondToken {
    /// Backend row id
    pub id: u64,

    /// Token object id on chain
    pub on_chain_id: String,

    /// Bond project this token was bought from
    pub project_id: String,

    #[serde(default)]
    pub bond_name: String,

    #[serde(default)]
    pub token_image_url: String,

    /// Maturity instant
    pub maturity_date: TimestampMs,

    /// Annual simple interest rate
    pub annual_interest_rate: BasisPoints,

    /// Sequence number within the offering
    #[serde(default)]
    pub token_number: u64,

    /// Holder wallet address
    pub owner: String,

    /// Principal
    pub amount: Mist,

    /// Purchase instant
    pub purchase_date: TimestampMs,

    /// Redemption already settled on chain
    pub is_redeemed: bool,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

impl BondToken {
    /// Principal in MIST
    pub fn principal(&self) -> Mist {
        self.amount
    }

    /// Check the purchase/maturity ordering invariant
    pub fn has_valid_terms(&self) -> bool {
        self.purchase_date <= self.maturity_date
    }
}

impl fmt::Display for BondToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.bond_name, self.token_number)
    }
}

/// Serde adapter for backend date strings
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and a
/// plain `YYYY-MM-DD` (midnight UTC). Serializes as RFC 3339.
pub mod iso_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parse a backend date string
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Utc.from_utc_datetime(&naive));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_JSON: &str = r#"{
        "id": 7,
        "on_chain_id": "0xtoken",
        "project_id": "0xproject",
        "bond_name": "Harbor Green Bond",
        "token_image_url": "",
        "maturity_date": 31536000000,
        "annual_interest_rate": 500,
        "token_number": 3,
        "owner": "0xowner",
        "amount": 1000000000,
        "purchase_date": 0,
        "is_redeemed": false,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    }"#;

    fn offering_json(maturity: &str) -> String {
        format!(
            r#"{{
                "id": 1,
                "on_chain_id": "0xproject",
                "issuer_address": "0xIssuer",
                "bond_name": "Harbor Green Bond",
                "total_amount": 5000000000,
                "amount_raised": 1000000000,
                "annual_interest_rate": 500,
                "maturity_date": "{}",
                "issue_date": "2026-01-01",
                "active": true
            }}"#,
            maturity
        )
    }

    #[test]
    fn test_token_deserialize() {
        let token: BondToken = serde_json::from_str(TOKEN_JSON).unwrap();

        assert_eq!(token.principal(), 1_000_000_000);
        assert_eq!(token.maturity_date, 31_536_000_000);
        assert!(token.has_valid_terms());
        assert_eq!(token.to_string(), "Harbor Green Bond #3");
    }

    #[test]
    fn test_offering_plain_date() {
        let offering: BondOffering = serde_json::from_str(&offering_json("2027-01-01")).unwrap();

        assert_eq!(offering.issue_ms(), 1_767_225_600_000);
        assert_eq!(offering.maturity_ms(), 1_798_761_600_000);
        assert_eq!(offering.amount_redeemed, 0);
        assert!(!offering.redeemable);
    }

    #[test]
    fn test_offering_rfc3339_date() {
        let offering: BondOffering =
            serde_json::from_str(&offering_json("2027-01-01T08:00:00+08:00")).unwrap();

        assert_eq!(offering.maturity_ms(), 1_798_761_600_000);
    }

    #[test]
    fn test_offering_bad_date_rejected() {
        let result: std::result::Result<BondOffering, _> =
            serde_json::from_str(&offering_json("next spring"));
        assert!(result.is_err());
    }

    #[test]
    fn test_iso_date_naive_datetime() {
        let dt = iso_date::parse("2026-01-01T12:30:00.250").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_767_270_600_250);
    }
}
