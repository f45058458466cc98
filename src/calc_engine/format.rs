/// Decimal places shown for non-integral results.
pub const DECIMAL_PLACES: usize = 8;

/// Formats a result for display.
///
/// Integral values print without a decimal point. Everything else is fixed to
/// eight decimals with trailing zeros (and a bare trailing `.`) removed.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    if value.fract() == 0.0 {
        // Adding 0.0 turns -0.0 into 0.0.
        return format!("{}", value + 0.0);
    }

    let fixed = format!("{:.*}", DECIMAL_PLACES, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integers_have_no_decimal_point() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_trailing_zeros_are_trimmed() {
        assert_eq!(format_number(0.10000000), "0.1");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.125), "-0.125");
    }

    #[test]
    fn test_eight_decimal_places() {
        assert_eq!(format_number(1.0 / 3.0), "0.33333333");
        assert_eq!(format_number(2.0 / 3.0), "0.66666667");
        assert_eq!(format_number(std::f64::consts::PI), "3.14159265");
    }

    #[test]
    fn test_values_that_round_to_zero() {
        assert_eq!(format_number(1e-10), "0");
        assert_eq!(format_number(-1e-10), "0");
        assert_eq!(format_number(1.0000000001), "1");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    proptest! {
        #[test]
        fn integral_values_never_show_a_point(n in -1_000_000_000i64..1_000_000_000i64) {
            let formatted = format_number(n as f64);
            prop_assert!(!formatted.contains('.'));
            prop_assert_eq!(formatted, n.to_string());
        }

        #[test]
        fn formatted_values_never_end_in_zero_decimals(v in -1.0e6f64..1.0e6f64) {
            let formatted = format_number(v);
            if formatted.contains('.') {
                prop_assert!(!formatted.ends_with('0'));
                prop_assert!(!formatted.ends_with('.'));
            }
        }
    }
}
