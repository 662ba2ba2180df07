//! Token amounts in base units
//!
//! Amounts are arbitrary-precision non-negative integers. 18-decimal tokens in
//! six-figure quantities overflow u64 (and get close to u128), so everything
//! runs on `BigUint` and no arbitrage decision ever touches floating point.

use num_bigint::BigUint;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::errors::AmountError;

/// Basis points per 100%
const BPS_SCALE: u32 = 10_000;

/// A non-negative integer amount in an asset's base units
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    /// Parse a plain base-10 digit string. No sign, no decimal point, no
    /// whitespace.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidAmount(s.to_string()));
        }

        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Amount)
            .ok_or_else(|| AmountError::InvalidAmount(s.to_string()))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    /// `self - other`, or `None` if `other > self`
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if other.0 > self.0 {
            return None;
        }
        Some(Amount(&self.0 - &other.0))
    }

    pub fn mul_scalar(&self, scalar: u32) -> Amount {
        Amount(self.0.clone() * scalar)
    }

    /// Truncating integer division, `None` on a zero divisor
    pub fn checked_div(&self, divisor: &Amount) -> Option<Amount> {
        if divisor.is_zero() {
            return None;
        }
        Some(Amount(&self.0 / &divisor.0))
    }

    /// Render with a decimal point inserted `decimals` digits from the right.
    ///
    /// Presentation only: trailing fractional zeros are dropped, nothing is
    /// rounded.
    pub fn to_decimal_string(&self, decimals: u8) -> String {
        let digits = self.0.to_string();
        let decimals = decimals as usize;
        if decimals == 0 {
            return digits;
        }

        let padded = format!("{:0>width$}", digits, width = decimals + 1);
        let (whole, frac) = padded.split_at(padded.len() - decimals);
        let frac = frac.trim_end_matches('0');

        if frac.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, frac)
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for &Amount {
    type Output = Amount;

    fn add(self, other: &Amount) -> Amount {
        Amount(&self.0 + &other.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(BigUint::from(value))
    }
}

// ============================================
// GAIN CALCULATION
// ============================================

/// Gain of `returned` over `start` in whole basis points, truncated.
///
/// `None` unless `returned > start` (and `start` is non-zero).
pub fn gain_basis_points(start: &Amount, returned: &Amount) -> Option<Amount> {
    if returned <= start {
        return None;
    }
    returned
        .checked_sub(start)?
        .mul_scalar(BPS_SCALE)
        .checked_div(start)
}

/// Basis points as a two-decimal percentage string (`1234` -> `"12.34"`)
pub fn format_basis_points(bps: &Amount) -> String {
    let hundred = BigUint::from(100u32);
    let whole = &bps.0 / &hundred;
    let cents = &bps.0 % &hundred;
    format!("{}.{:0>2}", whole, cents.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn test_parse_round_trips_digit_strings() {
        for s in [
            "0",
            "1",
            "1000",
            "10000000000000000000000",
            "115792089237316195423570985008687907853269984665640564039457584007913129639936",
        ] {
            assert_eq!(amt(s).to_string(), s);
        }
    }

    #[test]
    fn test_parse_normalizes_leading_zeros() {
        assert_eq!(amt("000123").to_string(), "123");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for s in ["", "-1", "+1", "1.5", "1e18", " 1", "0x10", "12a"] {
            assert_eq!(
                Amount::parse(s),
                Err(AmountError::InvalidAmount(s.to_string())),
                "{:?} should not parse",
                s
            );
        }
    }

    #[test]
    fn test_checked_sub() {
        let a = amt("10500000000000000000000");
        let b = amt("10000000000000000000000");
        let d = a.checked_sub(&b).unwrap();
        assert_eq!(d.to_string(), "500000000000000000000");
        assert_eq!(&d + &b, a);

        assert_eq!(b.checked_sub(&a), None);
        assert!(a.checked_sub(&a).unwrap().is_zero());
    }

    #[test]
    fn test_add_past_u128() {
        let max = amt("340282366920938463463374607431768211455");
        assert_eq!((&max + &amt("1")).to_string(), "340282366920938463463374607431768211456");
        assert_eq!(&amt("0") + &amt("7"), amt("7"));
    }

    #[test]
    fn test_checked_div_truncates() {
        assert_eq!(amt("7").checked_div(&amt("2")), Some(amt("3")));
        assert_eq!(amt("7").checked_div(&Amount::default()), None);
    }

    #[test]
    fn test_ordering() {
        assert!(amt("10000000000000000000001") > amt("10000000000000000000000"));
        assert!(amt("999") < amt("1000"));
        assert_eq!(amt("42").cmp(&amt("042")), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_gain_ten_percent() {
        let bps = gain_basis_points(&amt("1000"), &amt("1100")).unwrap();
        assert_eq!(format_basis_points(&bps), "10.00");
    }

    #[test]
    fn test_gain_below_one_basis_point_is_zero() {
        let bps = gain_basis_points(
            &amt("10000000000000000000000"),
            &amt("10000000000000000000001"),
        )
        .unwrap();
        assert_eq!(format_basis_points(&bps), "0.00");
    }

    #[test]
    fn test_gain_requires_strict_increase() {
        assert_eq!(gain_basis_points(&amt("1000"), &amt("1000")), None);
        assert_eq!(gain_basis_points(&amt("1000"), &amt("999")), None);
        assert_eq!(gain_basis_points(&Amount::default(), &amt("1")), None);
    }

    #[test]
    fn test_format_basis_points() {
        assert_eq!(format_basis_points(&amt("5")), "0.05");
        assert_eq!(format_basis_points(&amt("1234")), "12.34");
        assert_eq!(format_basis_points(&amt("120000")), "1200.00");
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(amt("10000000000000000000000").to_decimal_string(18), "10000");
        assert_eq!(amt("1500000").to_decimal_string(6), "1.5");
        assert_eq!(amt("5").to_decimal_string(6), "0.000005");
        assert_eq!(amt("0").to_decimal_string(18), "0");
        assert_eq!(amt("123").to_decimal_string(0), "123");
    }
}
