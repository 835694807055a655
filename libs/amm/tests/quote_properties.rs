//! Constant-Product Quote Property Tests
//!
//! Mathematical properties that must hold for every quote, regardless of
//! the pool's reserves or the trade size.

use proptest::prelude::*;
use stable_amm::{FeeRate, V2Math, U256, U512};

/// Reserves within the uint112 range a V2 pair can hold
fn reserve() -> impl Strategy<Value = u128> {
    1u128..(1u128 << 112)
}

fn amount() -> impl Strategy<Value = u128> {
    0u128..(1u128 << 100)
}

fn fee() -> impl Strategy<Value = FeeRate> {
    (1u32..10_000u32).prop_flat_map(|denominator| {
        (0u32..denominator).prop_map(move |numerator| FeeRate {
            numerator,
            denominator,
        })
    })
}

proptest! {
    #[test]
    fn zero_input_yields_zero_output(r_in in reserve(), r_out in reserve(), fee in fee()) {
        let out = V2Math::get_amount_out(U256::zero(), U256::from(r_in), U256::from(r_out), fee).unwrap();
        prop_assert!(out.is_zero());
    }

    #[test]
    fn output_is_monotonic_in_input(
        a in amount(),
        b in amount(),
        r_in in reserve(),
        r_out in reserve(),
        fee in fee(),
    ) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let out_small = V2Math::get_amount_out(U256::from(small), U256::from(r_in), U256::from(r_out), fee).unwrap();
        let out_large = V2Math::get_amount_out(U256::from(large), U256::from(r_in), U256::from(r_out), fee).unwrap();
        prop_assert!(out_small <= out_large);
    }

    #[test]
    fn output_is_below_spot_price_value(
        a in 1u128..(1u128 << 100),
        r_in in reserve(),
        r_out in reserve(),
        fee in fee(),
    ) {
        // amount_out * reserve_in < amount_in * reserve_out: fees and price impact only ever cost
        let out = V2Math::get_amount_out(U256::from(a), U256::from(r_in), U256::from(r_out), fee).unwrap();
        let realized: U512 = out.full_mul(U256::from(r_in));
        let spot: U512 = U256::from(a).full_mul(U256::from(r_out));
        prop_assert!(realized < spot);
    }

    #[test]
    fn output_never_drains_reserve(a in amount(), r_in in reserve(), r_out in reserve(), fee in fee()) {
        let out = V2Math::get_amount_out(U256::from(a), U256::from(r_in), U256::from(r_out), fee).unwrap();
        prop_assert!(out < U256::from(r_out));
    }

    #[test]
    fn equal_reserves_are_never_profitable(a in 1u128..(1u128 << 100), r in reserve(), denominator in 1u32..10_000u32) {
        // Even without a fee, price impact keeps the output strictly below the input
        let zero_fee = FeeRate { numerator: 0, denominator };
        let out = V2Math::get_amount_out(U256::from(a), U256::from(r), U256::from(r), zero_fee).unwrap();
        prop_assert!(out < U256::from(a));
    }

    #[test]
    fn fee_never_increases_output(a in 1_000_000u128..(1u128 << 64), r_in in 1_000_000u128..(1u128 << 100), r_out in 1_000_000u128..(1u128 << 100)) {
        let free = V2Math::get_amount_out(U256::from(a), U256::from(r_in), U256::from(r_out), FeeRate { numerator: 0, denominator: 1000 }).unwrap();
        let charged = V2Math::get_amount_out(U256::from(a), U256::from(r_in), U256::from(r_out), FeeRate::UNISWAP_V2).unwrap();
        prop_assert!(charged <= free);
    }
}
