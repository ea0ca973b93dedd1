//! Numeric reading extraction from alarm reason text.
//!
//! Reason strings embed the offending datapoint in square brackets, e.g.
//! `"... 1 out of the last 1 datapoints [85.0 (18/10/26 12:00:00)] was ..."`.
//! The first bracket followed by a numeric literal wins.

use crate::error::ReasonError;

/// Largest power of ten representable as a finite `f64`.
const MAX_DECIMAL_EXPONENT: u32 = 308;

/// Extract the first bracketed numeric reading from `text`.
///
/// Returns `Ok(None)` when no bracket is followed by a numeric literal.
/// Exponential literals are scaled by hand (`base × 10^exp`, or
/// `base / 10^|exp|` for negative exponents).
pub fn extract_reading(text: &str) -> Result<Option<f64>, ReasonError> {
    let Some(literal) = find_literal(text) else {
        return Ok(None);
    };
    tracing::debug!(literal, "extracted raw value");

    let value = convert_literal(literal)?;
    tracing::debug!(value, "converted value");
    Ok(Some(value))
}

/// Locate the literal following the first `[` that starts one.
fn find_literal(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('[') {
        let start = search_from + offset + 1;
        if let Some(len) = literal_len(&bytes[start..]) {
            return Some(&text[start..start + len]);
        }
        search_from = start;
    }

    None
}

/// Length of the numeric literal at the start of `bytes`, if any.
///
/// Grammar: `[+-]? digits? ('.' digits)? ([eE] [+-]? digits)?` with at
/// least one mantissa digit. A point with no digits after it, or an
/// exponent marker with no digits, is left out of the literal.
fn literal_len(bytes: &[u8]) -> Option<usize> {
    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let frac_digits = if bytes.get(pos) == Some(&b'.') {
        count_digits(&bytes[pos + 1..])
    } else {
        0
    };
    if frac_digits > 0 {
        pos += 1 + frac_digits;
    } else if int_digits == 0 {
        return None;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp_pos = pos + 1;
        if matches!(bytes.get(exp_pos), Some(b'+' | b'-')) {
            exp_pos += 1;
        }
        let exp_digits = count_digits(&bytes[exp_pos..]);
        if exp_digits > 0 {
            pos = exp_pos + exp_digits;
        }
    }

    Some(pos)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn convert_literal(literal: &str) -> Result<f64, ReasonError> {
    let Some((base, exponent)) = literal.split_once(['e', 'E']) else {
        return literal
            .parse::<f64>()
            .map_err(|_| ReasonError::InvalidLiteral(literal.to_string()));
    };

    let base: f64 = base
        .parse()
        .map_err(|_| ReasonError::InvalidLiteral(literal.to_string()))?;
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| ReasonError::ExponentOutOfRange(exponent.to_string()))?;

    let magnitude = exponent.unsigned_abs();
    if magnitude > MAX_DECIMAL_EXPONENT {
        return Err(ReasonError::ExponentOutOfRange(exponent.to_string()));
    }
    let scale = power_of_ten(magnitude)?;

    if exponent >= 0 {
        Ok(base * scale)
    } else {
        Ok(base / scale)
    }
}

/// `10^magnitude` rounded once to the nearest `f64`.
///
/// Repeated multiplication (`powi`) accumulates rounding error past 1e22.
fn power_of_ten(magnitude: u32) -> Result<f64, ReasonError> {
    format!("1e{magnitude}")
        .parse::<f64>()
        .map_err(|_| ReasonError::ExponentOutOfRange(magnitude.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * b.abs().max(1.0)
    }

    #[test]
    fn plain_decimal() {
        assert_eq!(extract_reading("[85] datapoints").unwrap(), Some(85.0));
        assert_eq!(extract_reading("[42.75 (18/10/26)]").unwrap(), Some(42.75));
    }

    #[test]
    fn cloudwatch_reason() {
        let reason = "Threshold Crossed: 1 out of the last 1 datapoints \
                      [85.3 (18/10/26 12:00:00)] was greater than the threshold (80.0).";
        assert_eq!(extract_reading(reason).unwrap(), Some(85.3));
    }

    #[test]
    fn exponent_positive_and_negative() {
        let up = extract_reading("[1.5E+3] ...").unwrap().unwrap();
        let down = extract_reading("[1.5E-3] ...").unwrap().unwrap();
        assert!(approx(up, 1500.0), "got {up}");
        assert!(approx(down, 0.0015), "got {down}");
    }

    #[test]
    fn lowercase_exponent_without_sign() {
        let value = extract_reading("[2.5e2]").unwrap().unwrap();
        assert!(approx(value, 250.0));
    }

    #[test]
    fn signed_values() {
        assert_eq!(extract_reading("[-3.5]").unwrap(), Some(-3.5));
        assert_eq!(extract_reading("[+7]").unwrap(), Some(7.0));
        assert_eq!(extract_reading("[-.5]").unwrap(), Some(-0.5));
    }

    #[test]
    fn trailing_point_and_dangling_exponent_excluded() {
        assert_eq!(extract_reading("[12.]").unwrap(), Some(12.0));
        assert_eq!(extract_reading("[1.5E]").unwrap(), Some(1.5));
        assert_eq!(extract_reading("[1.2.3]").unwrap(), Some(1.2));
    }

    #[test]
    fn skips_brackets_without_literal() {
        assert_eq!(extract_reading("[n/a] then [7.25]").unwrap(), Some(7.25));
    }

    #[test]
    fn unbracketed_numbers_are_ignored() {
        assert_eq!(extract_reading("1 out of the last 1 datapoints").unwrap(), None);
    }

    #[test]
    fn no_match() {
        assert_eq!(extract_reading("unexpected state").unwrap(), None);
        assert_eq!(extract_reading("").unwrap(), None);
        assert_eq!(extract_reading("[").unwrap(), None);
        assert_eq!(extract_reading("[+").unwrap(), None);
        assert_eq!(extract_reading("[.]").unwrap(), None);
    }

    #[test]
    fn non_ascii_text_around_literal() {
        assert_eq!(extract_reading("ü ⚠️ [3.5] é").unwrap(), Some(3.5));
    }

    #[test]
    fn exponent_out_of_range_is_an_error() {
        let err = extract_reading("[1E+400]").unwrap_err();
        assert_eq!(err, ReasonError::ExponentOutOfRange("400".to_string()));

        let err = extract_reading("[1E-99999999999]").unwrap_err();
        assert!(matches!(err, ReasonError::ExponentOutOfRange(_)));
    }

    #[test]
    fn every_power_of_ten_is_correctly_rounded() {
        for n in 0..=MAX_DECIMAL_EXPONENT {
            let expected: f64 = format!("1e{n}").parse().unwrap();

            let up = extract_reading(&format!("[1E{n}]")).unwrap().unwrap();
            assert_eq!(up, expected, "[1E{n}]");

            let down = extract_reading(&format!("[1E-{n}]")).unwrap().unwrap();
            assert_eq!(down, 1.0 / expected, "[1E-{n}]");
        }
    }

    #[test]
    fn large_exponent_renders_like_exact_integer_power() {
        let value = extract_reading("[1E33]").unwrap().unwrap();
        assert_eq!(
            crate::units::MetricUnit::Plain.format(value),
            "999999999999999945575230987042816.00"
        );
    }

    #[test]
    fn literal_outside_scanner_grammar_is_invalid() {
        assert_eq!(
            convert_literal("--1"),
            Err(ReasonError::InvalidLiteral("--1".to_string()))
        );
        assert_eq!(
            convert_literal("1.x5E3"),
            Err(ReasonError::InvalidLiteral("1.x5E3".to_string()))
        );
    }

    #[test]
    fn largest_exponent_is_finite() {
        let value = extract_reading("[1E308]").unwrap().unwrap();
        assert!(value.is_finite());
    }
}
