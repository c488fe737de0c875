//! Price and size rounding.
//!
//! Quote prices are rounded on a magnitude tier so they stay within the
//! exchange's significant-figure limits without per-market tick metadata:
//! >= 10000 to the nearest 10, >= 100 to the nearest integer, >= 10 to one
//! decimal, >= 1 to two decimals, otherwise four decimals.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Round a quote price on the magnitude tier of `price`.
pub fn round_price(price: Decimal) -> Decimal {
    if price >= dec!(10000) {
        (price / dec!(10)).round() * dec!(10)
    } else if price >= dec!(100) {
        price.round()
    } else if price >= dec!(10) {
        price.round_dp(1)
    } else if price >= Decimal::ONE {
        price.round_dp(2)
    } else {
        price.round_dp(4)
    }
}

/// Round an order size to the market's size decimals.
pub fn round_size(size: Decimal, decimals: u32) -> Decimal {
    size.round_dp(decimals)
}
