//! Exact conversion between human-readable token amounts and raw integers.
//!
//! Token contracts store quantities as integers scaled by `10^decimals`. Both
//! directions work on decimal digit strings, so values beyond the range a
//! float can represent exactly (anything above 2^53) never lose precision.

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Input was empty or whitespace
    #[error("Amount is empty")]
    Empty,

    /// Input is not a plain non-negative decimal number
    #[error("Invalid amount: {0:?}")]
    Malformed(String),

    /// More significant fractional digits than the token supports
    #[error("Amount {input:?} has more than {decimals} decimal places")]
    TooPrecise { input: String, decimals: u8 },

    /// Raw value does not fit in 256 bits
    #[error("Amount {0:?} is too large")]
    Overflow(String),
}

/// Parse a decimal string such as `"10.5"` into its raw integer form.
///
/// Accepts an optional integer part and an optional fractional part, but not
/// both empty. Fractional digits beyond `decimals` are only accepted when
/// they are zeros; anything else fails instead of being rounded.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (integer, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !is_digits(integer) || !is_digits(fraction) {
        return Err(AmountError::Malformed(trimmed.to_string()));
    }

    let places = usize::from(decimals);
    let fraction = if fraction.len() > places {
        let (kept, excess) = fraction.split_at(places);
        if excess.bytes().any(|b| b != b'0') {
            return Err(AmountError::TooPrecise {
                input: trimmed.to_string(),
                decimals,
            });
        }
        kept
    } else {
        fraction
    };

    let mut digits = String::with_capacity(integer.len() + places);
    digits.push_str(integer);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat_n('0', places - fraction.len()));

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(significant, 10).map_err(|_| AmountError::Overflow(trimmed.to_string()))
}

/// Format a raw integer amount as a decimal string.
///
/// Trailing fractional zeros are dropped but at least one fractional digit is
/// always kept, so `1000 * 10^18` with 18 decimals renders as `"1000.0"`.
pub fn format_amount(raw: U256, decimals: u8) -> String {
    let places = usize::from(decimals);
    let digits = raw.to_string();

    let padded = if digits.len() <= places {
        format!("{digits:0>width$}", width = places + 1)
    } else {
        digits
    };

    let (integer, fraction) = padded.split_at(padded.len() - places);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{integer}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn test_parse_fractional_amount() {
        assert_eq!(
            parse_amount("10.5", 18).unwrap(),
            raw("10500000000000000000")
        );
    }

    #[test]
    fn test_parse_integer_and_edge_forms() {
        assert_eq!(parse_amount("1", 18).unwrap(), raw("1000000000000000000"));
        assert_eq!(parse_amount(".5", 1).unwrap(), U256::from(5));
        assert_eq!(parse_amount("7.", 2).unwrap(), U256::from(700));
        assert_eq!(parse_amount("  0.000  ", 6).unwrap(), U256::ZERO);
        assert_eq!(parse_amount("42", 0).unwrap(), U256::from(42));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_amount("", 18), Err(AmountError::Empty));
        assert_eq!(parse_amount("   ", 18), Err(AmountError::Empty));
        for input in [".", "-1", "+1", "1.2.3", "1e18", "abc", "1,5", "0x10"] {
            assert!(
                matches!(parse_amount(input, 18), Err(AmountError::Malformed(_))),
                "{input} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(matches!(
            parse_amount("1.234", 2),
            Err(AmountError::TooPrecise { decimals: 2, .. })
        ));
        assert!(matches!(
            parse_amount("1.5", 0),
            Err(AmountError::TooPrecise { .. })
        ));
        // Zeros past the token's precision carry no value.
        assert_eq!(parse_amount("1.2300", 2).unwrap(), U256::from(123));
    }

    #[test]
    fn test_parse_overflow() {
        let too_big = format!("1{}", "0".repeat(78));
        assert!(matches!(
            parse_amount(&too_big, 0),
            Err(AmountError::Overflow(_))
        ));
        assert!(parse_amount(&U256::MAX.to_string(), 0).is_ok());
    }

    #[test]
    fn test_format_whole_supply() {
        assert_eq!(
            format_amount(raw("1000000000000000000000"), 18),
            "1000.0"
        );
    }

    #[test]
    fn test_format_small_and_zero_values() {
        assert_eq!(format_amount(U256::ZERO, 18), "0.0");
        assert_eq!(format_amount(U256::from(1), 18), "0.000000000000000001");
        assert_eq!(format_amount(U256::from(1500), 3), "1.5");
        assert_eq!(format_amount(U256::from(1000), 0), "1000.0");
    }

    #[test]
    fn test_large_raw_amount_is_exact() {
        let value = raw("123456789012345678901234");
        let formatted = format_amount(value, 18);

        assert_eq!(formatted, "123456.789012345678901234");
        assert_eq!(parse_amount(&formatted, 18).unwrap(), value);
    }

    #[test]
    fn test_parsed_input_formats_back_normalized() {
        for (input, expected) in [("10.50", "10.5"), ("007", "7.0"), ("0.1", "0.1")] {
            let parsed = parse_amount(input, 18).unwrap();
            assert_eq!(format_amount(parsed, 18), expected);
        }
    }

    #[test]
    fn test_max_value_survives_format() {
        for decimals in [0, 6, 18, 77, 90] {
            let formatted = format_amount(U256::MAX, decimals);
            assert_eq!(parse_amount(&formatted, decimals).unwrap(), U256::MAX);
        }
    }

    /// Digits with leading integer zeros and trailing fraction zeros dropped.
    fn normalized(integer: &str, fraction: &str) -> String {
        let integer = integer.trim_start_matches('0');
        let fraction = fraction.trim_end_matches('0');
        format!(
            "{}.{}",
            if integer.is_empty() { "0" } else { integer },
            if fraction.is_empty() { "0" } else { fraction }
        )
    }

    proptest! {
        #[test]
        fn test_formatted_amount_parses_to_same_raw(
            limbs in any::<[u64; 4]>(),
            decimals in 0u8..=90,
        ) {
            let raw = U256::from_limbs(limbs);
            let formatted = format_amount(raw, decimals);
            prop_assert_eq!(parse_amount(&formatted, decimals), Ok(raw));
        }

        #[test]
        fn test_parsed_amount_formats_to_normalized_input(
            integer in "[0-9]{1,30}",
            fraction in "[0-9]{0,30}",
            decimals in 30u8..=40,
        ) {
            let raw = parse_amount(&format!("{integer}.{fraction}"), decimals).unwrap();
            prop_assert_eq!(format_amount(raw, decimals), normalized(&integer, &fraction));
        }
    }
}
