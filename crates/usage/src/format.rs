//! es-MX display rendering for token counts and currency amounts.
//!
//! Matches the widget's number formatting: thousands separated by commas,
//! currency with a `$` prefix and between four and six fraction digits so
//! sub-centavo costs stay legible.

/// Minimum fraction digits shown for a currency amount.
const MIN_FRACTION_DIGITS: usize = 4;

/// Maximum fraction digits shown for a currency amount.
const MAX_FRACTION_DIGITS: usize = 6;

/// Render an MXN amount, e.g. `0.00126` → `"$0.00126"`.
///
/// The amount is rounded to six fraction digits, then trailing zeros are
/// trimmed down to a floor of four digits.
pub fn format_mxn(amount: f64) -> String {
    let fixed = format!("{amount:.MAX_FRACTION_DIGITS$}");
    let (int_part, frac_part) = fixed
        .split_once('.')
        .expect("fixed-point format always contains a dot");

    let mut frac = frac_part.to_string();
    while frac.len() > MIN_FRACTION_DIGITS && frac.ends_with('0') {
        frac.pop();
    }

    format!("${}.{}", group_thousands(int_part), frac)
}

/// Render a token count with thousands separators, e.g. `1234567` →
/// `"1,234,567"`.
pub fn format_tokens(count: u64) -> String {
    group_thousands(&count.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_zeros_to_the_four_digit_floor() {
        assert_eq!(format_mxn(0.00126), "$0.00126");
        assert_eq!(format_mxn(0.5), "$0.5000");
        assert_eq!(format_mxn(0.0), "$0.0000");
    }

    #[test]
    fn keeps_six_significant_fraction_digits() {
        assert_eq!(format_mxn(0.123456), "$0.123456");
        assert_eq!(format_mxn(0.1234567), "$0.123457");
    }

    #[test]
    fn groups_integer_part() {
        assert_eq!(format_mxn(1234.5), "$1,234.5000");
        assert_eq!(format_mxn(1_000_000.0), "$1,000,000.0000");
    }

    #[test]
    fn token_counts_group_by_thousands() {
        assert_eq!(format_tokens(0), "0");
        assert_eq!(format_tokens(150), "150");
        assert_eq!(format_tokens(1500), "1,500");
        assert_eq!(format_tokens(1_234_567), "1,234,567");
    }
}
