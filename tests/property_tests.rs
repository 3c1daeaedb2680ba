//! Property-based tests for the core math.
//!
//! These verify the pricing and settlement invariants under random inputs.

use exchange_core::*;
use proptest::prelude::*;

fn reserve_strategy() -> impl Strategy<Value = u64> {
    1_000u64..1_000_000_000
}

fn trade_strategy() -> impl Strategy<Value = u64> {
    1u64..10_000_000
}

fn fee_strategy() -> impl Strategy<Value = u64> {
    0u64..=1_000 // up to 10%
}

proptest! {
    /// The reserve product never decreases across an exact-input swap.
    #[test]
    fn swap_never_decreases_product(
        reserve_in in reserve_strategy(),
        reserve_out in reserve_strategy(),
        amount_in in trade_strategy(),
        fee in fee_strategy(),
    ) {
        let out = swap::input_price(amount_in, reserve_in, reserve_out, fee).unwrap();
        prop_assert!(out < reserve_out);

        let before = math::reserve_product(reserve_in, reserve_out);
        let after = math::reserve_product(reserve_in + amount_in, reserve_out - out);
        prop_assert!(after >= before);
    }

    /// Buying back the output of an input swap can never cost less than what
    /// was paid: the pool keeps rounding and fees.
    #[test]
    fn round_trip_never_profits(
        reserve_in in reserve_strategy(),
        reserve_out in reserve_strategy(),
        amount_in in trade_strategy(),
        fee in fee_strategy(),
    ) {
        let out = swap::input_price(amount_in, reserve_in, reserve_out, fee).unwrap();
        prop_assume!(out > 0);

        let required = swap::output_price(out, reserve_in, reserve_out, fee).unwrap();
        prop_assert!(required <= amount_in);
    }

    /// The exact-output price really buys the output: feeding it back through
    /// the input formula covers the requested amount.
    #[test]
    fn output_price_is_sufficient(
        reserve_in in reserve_strategy(),
        reserve_out in reserve_strategy(),
        fee in fee_strategy(),
        amount_out in 1u64..1_000,
    ) {
        prop_assume!(amount_out < reserve_out);
        let amount_in = swap::output_price(amount_out, reserve_in, reserve_out, fee).unwrap();
        let delivered = swap::input_price(amount_in, reserve_in, reserve_out, fee).unwrap();
        prop_assert!(delivered >= amount_out);
    }

    /// Bonding then immediately unbonding the minted receipt never extracts
    /// more of either asset than was deposited.
    #[test]
    fn bond_unbond_never_extracts_value(
        reserve_a in reserve_strategy(),
        reserve_b in reserve_strategy(),
        supply in reserve_strategy(),
        amount_b in trade_strategy(),
    ) {
        let bonded = pool::bond_outcome(reserve_a, reserve_b, supply, u64::MAX, amount_b, 0).unwrap();
        prop_assume!(bonded.receipt_minted > 0);

        let unbonded = pool::unbond_outcome(
            reserve_a + bonded.amount_a,
            reserve_b + bonded.amount_b,
            supply + bonded.receipt_minted,
            bonded.receipt_minted,
        )
        .unwrap();

        prop_assert!(unbonded.amount_a <= bonded.amount_a);
        prop_assert!(unbonded.amount_b <= bonded.amount_b);
    }

    /// Exiting in two pieces drains exactly what exiting at once does: the
    /// rounding remainder of the first burn is picked up by the second.
    #[test]
    fn staged_full_exit_matches_single_exit(
        reserve_a in reserve_strategy(),
        reserve_b in reserve_strategy(),
        supply in 2u64..1_000_000,
        split in 1u64..1_000_000,
    ) {
        let first_burn = split % (supply - 1) + 1;
        let full = pool::unbond_outcome(reserve_a, reserve_b, supply, supply).unwrap();

        let first = pool::unbond_outcome(reserve_a, reserve_b, supply, first_burn).unwrap();
        let second = pool::unbond_outcome(
            reserve_a - first.amount_a,
            reserve_b - first.amount_b,
            supply - first_burn,
            supply - first_burn,
        )
        .unwrap();

        prop_assert_eq!(first.amount_a + second.amount_a, full.amount_a);
        prop_assert_eq!(first.amount_b + second.amount_b, full.amount_b);
    }

    /// PnL is zero at entry and antisymmetric between directions.
    #[test]
    fn pnl_zero_at_entry_and_antisymmetric(
        amount in trade_strategy(),
        entry in 1u64..100_000_000,
        mark in 1u64..100_000_000,
    ) {
        prop_assert_eq!(position::signed_pnl(Direction::Long, amount, entry, entry), 0);

        let long = position::signed_pnl(Direction::Long, amount, entry, mark);
        let short = position::signed_pnl(Direction::Short, amount, entry, mark);
        // rounding is always toward the pool, so the sum is 0 or -1
        prop_assert!(long + short == 0 || long + short == -1);
    }

    /// Settlement value never exceeds equity plus positive pnl and never
    /// goes negative.
    #[test]
    fn settlement_is_clamped(
        equity in 0u64..u64::MAX / 2,
        pnl in -1_000_000_000i128..1_000_000_000i128,
    ) {
        let value = position::settle(equity, pnl);
        if pnl >= 0 {
            prop_assert_eq!(value as i128, equity as i128 + pnl);
        } else {
            prop_assert!(value <= equity);
        }
    }

    /// The funding rate is always within the configured maximum and the two
    /// sides of the same book pay opposite signs.
    #[test]
    fn funding_rate_is_bounded(
        long_oi in 0u64..u64::MAX / 2,
        short_oi in 0u64..u64::MAX / 2,
        max_rate in 1u64..10_000,
    ) {
        let params = funding::FundingParams { max_rate_bps_per_day: max_rate };
        let rate = funding::funding_rate_bps(long_oi, short_oi, &params);
        prop_assert!(rate.unsigned_abs() <= max_rate);

        let long = funding::accrued_funding(
            Direction::Long, 1_000_000, long_oi, short_oi, 86_400, &params,
        ).unwrap();
        let short = funding::accrued_funding(
            Direction::Short, 1_000_000, long_oi, short_oi, 86_400, &params,
        ).unwrap();
        prop_assert_eq!(long, -short);
    }

    /// The liquidation split always conserves the settled value.
    #[test]
    fn liquidation_split_conserves(value in 0u64..u64::MAX / 2) {
        let params = liquidation::LiquidationParams::default();
        let split = liquidation::split_liquidation_value(value, &params).unwrap();
        prop_assert_eq!(split.liquidator_reward + split.pool_remainder, value);
        prop_assert!(split.liquidator_reward <= value);
    }
}
