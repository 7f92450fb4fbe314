//! Integration tests for BlueLink accrual
//!
//! These tests exercise the public API end to end: snapshot JSON in,
//! redemption values and eligibility out.

use bluelink_accrual::{
    accrue, compute_expected_interest, compute_redemption_amount, is_redeemable,
    AccrualCalculator, Portfolio, PortfolioFilter, TokenStatus, MS_PER_DAY, MS_PER_YEAR,
};
use bluelink_core::{decode_payload, BondToken, ManualClock};
use proptest::prelude::*;

const ONE_SUI: u64 = 1_000_000_000;

fn token(maturity_ms: i64, is_redeemed: bool) -> BondToken {
    BondToken {
        id: 1,
        on_chain_id: "0xtoken".into(),
        project_id: "0xproject".into(),
        bond_name: "Harbor Green Bond".into(),
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

mod scenario_tests {
    use super::*;

    #[test]
    fn test_one_sui_five_percent_at_maturity() {
        let amount = compute_redemption_amount(ONE_SUI, 500, 0, 31_536_000_000, 31_536_000_000);
        let interest = compute_expected_interest(ONE_SUI, 500, 0, 31_536_000_000, 31_536_000_000);

        assert_eq!(amount.unwrap(), 1_050_000_000);
        assert_eq!(interest.unwrap(), 50_000_000);
    }

    #[test]
    fn test_one_sui_five_percent_half_year() {
        let half_year = 182 * MS_PER_DAY + MS_PER_DAY / 2;
        let amount = compute_redemption_amount(ONE_SUI, 500, 0, MS_PER_YEAR, half_year).unwrap();
        let interest = compute_expected_interest(ONE_SUI, 500, 0, MS_PER_YEAR, half_year).unwrap();

        assert_eq!(amount, 1_025_000_000);
        assert_eq!(interest, 25_000_000);
    }

    #[test]
    fn test_one_sui_five_percent_past_maturity() {
        let at_maturity = compute_redemption_amount(ONE_SUI, 500, 0, MS_PER_YEAR, MS_PER_YEAR);
        let at_400_days = compute_redemption_amount(ONE_SUI, 500, 0, MS_PER_YEAR, 400 * MS_PER_DAY);

        assert_eq!(at_maturity.unwrap(), at_400_days.unwrap());
    }

    #[test]
    fn test_snapshot_to_redemption() {
        let raw = r#"{
            "success": true,
            "data": [
                {
                    "id": 1, "on_chain_id": "0xa", "project_id": "0xp",
                    "bond_name": "A", "maturity_date": 31536000000,
                    "annual_interest_rate": 500, "token_number": 1,
                    "owner": "0xo", "amount": 1000000000,
                    "purchase_date": 0, "is_redeemed": false
                },
                {
                    "id": 2, "on_chain_id": "0xb", "project_id": "0xp",
                    "bond_name": "B", "maturity_date": 15768000000,
                    "annual_interest_rate": 1000, "token_number": 2,
                    "owner": "0xo", "amount": 2000000000,
                    "purchase_date": 0, "is_redeemed": true
                }
            ]
        }"#;

        let tokens: Vec<BondToken> = decode_payload(raw).unwrap();
        let portfolio = Portfolio::new(tokens);
        let summary = portfolio.summary(MS_PER_YEAR).unwrap();

        assert_eq!(summary.total_invested, ONE_SUI);
        assert_eq!(summary.total_expected_returns, 1_050_000_000);
        assert_eq!(summary.redeemable, vec![1]);
        assert_eq!(portfolio.filter(PortfolioFilter::Redeemed, MS_PER_YEAR)[0].id, 2);
    }

    #[test]
    fn test_calculator_over_token_lifetime() {
        let clock = ManualClock::new(0);
        let calculator = AccrualCalculator::new(clock.clone());
        let t = token(MS_PER_YEAR, false);

        let mut last = 0;
        for _ in 0..400 {
            let quote = calculator.quote(&t).unwrap();
            assert!(quote.redemption_amount >= last);
            assert_eq!(quote.redeemable, quote.status == TokenStatus::Matured);
            last = quote.redemption_amount;
            clock.advance(MS_PER_DAY);
        }
        assert_eq!(last, 1_050_000_000);
    }
}

mod property_tests {
    use super::*;

    const MAX_PRINCIPAL: u64 = 100_000_000 * ONE_SUI;
    const MAX_SPAN: i64 = 50 * MS_PER_YEAR;

    proptest! {
        #[test]
        fn prop_zero_elapsed_is_principal(
            principal in 0..=MAX_PRINCIPAL,
            rate in 0u32..=10_000,
            purchase in 0..MAX_SPAN,
            span in 0..MAX_SPAN,
        ) {
            let maturity = purchase + span;
            let amount = compute_redemption_amount(principal, rate, purchase, maturity, purchase);
            prop_assert_eq!(amount.unwrap(), principal);
        }

        #[test]
        fn prop_monotonic_before_maturity(
            principal in 0..=MAX_PRINCIPAL,
            rate in 0u32..=10_000,
            span in 0..MAX_SPAN,
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let now1 = (span as f64 * lo) as i64;
            let now2 = (span as f64 * hi) as i64;

            let v1 = compute_redemption_amount(principal, rate, 0, span, now1).unwrap();
            let v2 = compute_redemption_amount(principal, rate, 0, span, now2).unwrap();
            prop_assert!(v1 <= v2);
            prop_assert!(v1 >= principal);
        }

        #[test]
        fn prop_frozen_after_maturity(
            principal in 0..=MAX_PRINCIPAL,
            rate in 0u32..=10_000,
            span in 0..MAX_SPAN,
            extra in 0..MAX_SPAN,
        ) {
            let at_maturity = compute_redemption_amount(principal, rate, 0, span, span).unwrap();
            let later = compute_redemption_amount(principal, rate, 0, span, span + extra).unwrap();
            prop_assert_eq!(at_maturity, later);
        }

        #[test]
        fn prop_interest_identity(
            principal in 0..=MAX_PRINCIPAL,
            rate in 0u32..=10_000,
            span in 0..MAX_SPAN,
            now in 0..(2 * MAX_SPAN),
        ) {
            let amount = compute_redemption_amount(principal, rate, 0, span, now).unwrap();
            let interest = compute_expected_interest(principal, rate, 0, span, now).unwrap();
            prop_assert_eq!(interest, amount - principal);
        }

        #[test]
        fn prop_validated_matches_raw(
            principal in 0..=MAX_PRINCIPAL,
            rate in 0u32..=10_000,
            span in 0..MAX_SPAN,
            now in 0..(2 * MAX_SPAN),
        ) {
            let validated = compute_redemption_amount(principal, rate, 0, span, now).unwrap();
            let raw = accrue(principal, rate, 0, span, now).unwrap();
            prop_assert_eq!(validated as i128, raw);
        }

        #[test]
        fn prop_zero_principal_is_zero(
            rate in 0u32..=10_000,
            span in 0..MAX_SPAN,
            now in 0..(2 * MAX_SPAN),
        ) {
            prop_assert_eq!(compute_redemption_amount(0, rate, 0, span, now).unwrap(), 0);
        }

        #[test]
        fn prop_redeemable_definition(
            maturity in 0..MAX_SPAN,
            now in 0..MAX_SPAN,
            redeemed in any::<bool>(),
        ) {
            let t = token(maturity, redeemed);
            prop_assert_eq!(is_redeemable(&t, now), now >= maturity && !redeemed);
        }
    }
}
