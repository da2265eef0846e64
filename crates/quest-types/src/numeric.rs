//! Lenient numeric parsing for dataset cells.
//!
//! Upstream files pad cells with whitespace, mark missing values with `-` or
//! leave them empty, and occasionally print floats in scientific notation.
//! None of these are errors: anything that does not parse becomes `None`.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Parse a decimal cell. Returns `None` for empty or non-numeric input.
pub fn parse_decimal(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .ok()
}

/// Parse an integral year cell. `"2013"` and `"2013.0"` both yield `2013`;
/// fractional or non-numeric input yields `None`.
pub fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if let Ok(year) = cell.parse::<i32>() {
        return Some(year);
    }
    let value = parse_decimal(cell)?;
    if value.fract().is_zero() {
        value.to_i32()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_tolerate_padding_and_notation() {
        assert_eq!(parse_decimal("   2.6"), Some(Decimal::new(26, 1)));
        assert_eq!(parse_decimal("-1.5 "), Some(Decimal::new(-15, 1)));
        assert_eq!(parse_decimal("316128839.0"), Some(Decimal::new(316_128_839, 0)));
        assert_eq!(parse_decimal("3.2e2"), Some(Decimal::new(320, 0)));
    }

    #[test]
    fn malformed_decimals_are_none() {
        for cell in ["", "   ", "-", "n/a", "NaN", "1.2.3"] {
            assert_eq!(parse_decimal(cell), None, "cell {cell:?}");
        }
    }

    #[test]
    fn years_accept_integral_forms_only() {
        assert_eq!(parse_year("2013"), Some(2013));
        assert_eq!(parse_year(" 2013 "), Some(2013));
        assert_eq!(parse_year("2013.0"), Some(2013));
        assert_eq!(parse_year("2013.5"), None);
        assert_eq!(parse_year("twenty"), None);
        assert_eq!(parse_year(""), None);
    }
}
