//! Basis point arithmetic for protocol fees and slippage.
//!
//! All amounts are integers in the token's smallest unit; divisions round down.

use num_bigint::BigUint;

/// 100% expressed in basis points.
pub const BASIS_POINTS: u32 = 10_000;

/// Fee charged on `amount` at `fee_bps`, rounded down.
pub fn fee_for_amount(amount: &BigUint, fee_bps: u32) -> BigUint {
    amount * BigUint::from(fee_bps) / BigUint::from(BASIS_POINTS)
}

/// Splits `amount` into the part left after the fee and the fee itself.
///
/// The two parts always add up to `amount`. Fee basis points above 100% are clamped.
pub fn amount_after_fee(amount: &BigUint, fee_bps: u32) -> (BigUint, BigUint) {
    let fee = fee_for_amount(amount, fee_bps.min(BASIS_POINTS));
    (amount - &fee, fee)
}

/// Smallest amount accepted for `amount` with `slippage_bps` tolerance, rounded down.
pub fn min_amount_after_slippage(amount: &BigUint, slippage_bps: u32) -> BigUint {
    let kept = BASIS_POINTS - slippage_bps.min(BASIS_POINTS);
    amount * BigUint::from(kept) / BigUint::from(BASIS_POINTS)
}
