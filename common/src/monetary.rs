//! Monetary types for the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// Suffix shown after formatted amounts.
pub const CURRENCY_SUFFIX: &str = "TL";

/// Decimal places used when displaying amounts.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// The pair of balances every account carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    /// Settled, already-realized balance.
    pub current: Decimal,
    /// Expected balance once pending items settle.
    pub future: Decimal,
}

impl Balances {
    /// Create a balance pair.
    pub fn new(current: Decimal, future: Decimal) -> Self {
        Self { current, future }
    }

    /// Both balances set to the same opening value.
    pub fn opening(value: Decimal) -> Self {
        Self {
            current: value,
            future: value,
        }
    }

    /// Sum of two pairs, or `None` if either side leaves the decimal range.
    pub fn checked_add(self, other: Balances) -> Option<Balances> {
        Some(Balances {
            current: self.current.checked_add(other.current)?,
            future: self.future.checked_add(other.future)?,
        })
    }
}

impl Neg for Balances {
    type Output = Balances;

    fn neg(self) -> Self::Output {
        Balances {
            current: -self.current,
            future: -self.future,
        }
    }
}

impl fmt::Display for Balances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "current {} / future {}",
            format_amount(self.current),
            format_amount(self.future)
        )
    }
}

/// Format an amount for display, e.g. `150.00 TL`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp(DISPLAY_DECIMAL_PLACES);
    format!(
        "{:.places$} {}",
        rounded,
        CURRENCY_SUFFIX,
        places = DISPLAY_DECIMAL_PLACES as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_arithmetic() {
        let opening = Balances::opening(dec!(100));
        let delta = Balances::new(dec!(50), dec!(20));

        assert_eq!(opening.checked_add(delta), Some(Balances::new(dec!(150), dec!(120))));
        assert_eq!(opening.checked_add(-delta), Some(Balances::new(dec!(50), dec!(80))));
        assert_eq!(-delta, Balances::new(dec!(-50), dec!(-20)));
    }

    #[test]
    fn test_checked_add_overflow() {
        let top = Balances::new(dec!(0), Decimal::MAX);
        assert_eq!(top.checked_add(Balances::new(dec!(0), dec!(1))), None);
        assert_eq!(top.checked_add(Balances::new(dec!(1), dec!(0))), Some(Balances::new(dec!(1), Decimal::MAX)));

        let bottom = Balances::opening(Decimal::MIN);
        assert_eq!(bottom.checked_add(Balances::new(dec!(-1), dec!(0))), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(150)), "150.00 TL");
        assert_eq!(format_amount(dec!(-12.5)), "-12.50 TL");
        assert_eq!(format_amount(dec!(0.005)), "0.00 TL");
    }
}
