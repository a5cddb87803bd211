// Unit and formatting helpers.
//
// Parsing takes an explicit `NumberFormat` instead of reading process
// locale state, so the same text always parses the same way.
use num_format::{Locale, ToFormattedString};

/// Generation efficiency applied when converting site kWh to source MMBtu.
const GENERATION_EFFICIENCY: f64 = 0.33;
const MMBTU_PER_KWH: f64 = 0.003413;

/// Separators and symbol used when reading amounts out of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub grouping_separator: char,
    pub decimal_separator: char,
    pub currency_symbol: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            grouping_separator: ',',
            decimal_separator: '.',
            currency_symbol: "$".to_string(),
        }
    }
}

/// Parse a whole-number amount such as `12,000`.
///
/// - Trims whitespace and drops grouping separators.
/// - A fractional part is accepted only when it is all zeros (`1,000.00`).
/// - Returns `None` for anything else.
pub fn parse_integer_safe(s: Option<&str>, fmt: &NumberFormat) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s: String = s.chars().filter(|c| *c != fmt.grouping_separator).collect();
    let (int_part, frac_part) = match s.split_once(fmt.decimal_separator) {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    if let Some(frac) = frac_part {
        if !frac.chars().all(|c| c == '0') {
            return None;
        }
    }
    int_part.parse::<i64>().ok()
}

/// Parse a currency cell like `$1,234`, stripping the symbol from either end.
pub fn parse_currency_safe(s: Option<&str>, fmt: &NumberFormat) -> Option<i64> {
    let s = s?.trim();
    let symbol = fmt.currency_symbol.as_str();
    let stripped = if symbol.is_empty() {
        s
    } else {
        s.trim_start_matches(symbol).trim_end_matches(symbol)
    };
    parse_integer_safe(Some(stripped), fmt)
}

/// Parse the leading token of an amount-with-unit cell like `10,000 kWh`.
pub fn parse_leading_int_safe(s: Option<&str>, fmt: &NumberFormat) -> Option<i64> {
    let token = s?.split_whitespace().next()?;
    parse_integer_safe(Some(token), fmt)
}

/// Source energy of an electricity saving, in MMBtu.
pub fn kwh_to_mmbtu(kwh: i64) -> f64 {
    kwh as f64 * MMBTU_PER_KWH / GENERATION_EFFICIENCY
}

/// Round half to even, the rule used for every reported whole number.
pub fn round_half_even(n: f64) -> f64 {
    n.round_ties_even()
}

/// Round a dollar figure to `digits` decimal places.
pub fn currency_accuracy(n: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    round_half_even(n * scale) / scale
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `num-format` grouping on the integer part.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Values past u128 (and non-finite ones) are shown ungrouped.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Whole-unit display of a fractional quantity; the fraction is dropped.
pub fn format_truncated(n: f64) -> String {
    format_int(n.trunc() as i64)
}

pub fn format_currency(n: f64, decimals: usize, symbol: &str) -> String {
    if n.is_sign_negative() && n != 0.0 {
        format!("-{}{}", symbol, format_number(n.abs(), decimals))
    } else {
        format!("{}{}", symbol, format_number(n, decimals))
    }
}

/// Describe a payback period for prose: whole months while that rounds
/// below twelve, else years.
pub fn describe_payback(years: f64) -> String {
    let months = round_half_even(years * 12.0).max(1.0);
    if months >= 12.0 {
        return format!("{:.1} years", years);
    }
    match months as i64 {
        1 => "1 month".to_string(),
        m => format!("{} months", m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us() -> NumberFormat {
        NumberFormat::default()
    }

    #[test]
    fn parses_grouped_integers() {
        assert_eq!(parse_integer_safe(Some(" 12,000 "), &us()), Some(12_000));
        assert_eq!(parse_integer_safe(Some("1,000.00"), &us()), Some(1_000));
        assert_eq!(parse_integer_safe(Some("-250"), &us()), Some(-250));
        assert_eq!(parse_integer_safe(Some("1,000.50"), &us()), None);
        assert_eq!(parse_integer_safe(Some("abc"), &us()), None);
        assert_eq!(parse_integer_safe(Some(""), &us()), None);
        assert_eq!(parse_integer_safe(None, &us()), None);
    }

    #[test]
    fn parses_with_european_separators() {
        let eu = NumberFormat {
            grouping_separator: '.',
            decimal_separator: ',',
            currency_symbol: "€".to_string(),
        };
        assert_eq!(parse_currency_safe(Some("€12.500"), &eu), Some(12_500));
        assert_eq!(parse_integer_safe(Some("3.000,00"), &eu), Some(3_000));
    }

    #[test]
    fn parses_currency() {
        assert_eq!(parse_currency_safe(Some("$1,000"), &us()), Some(1_000));
        assert_eq!(parse_currency_safe(Some("1,000$"), &us()), Some(1_000));
        assert_eq!(parse_currency_safe(Some("$ 2,500"), &us()), Some(2_500));
        assert_eq!(parse_currency_safe(Some("$1,0x0"), &us()), None);
        assert_eq!(parse_currency_safe(Some("$"), &us()), None);
    }

    #[test]
    fn parses_leading_token() {
        assert_eq!(parse_leading_int_safe(Some("10,000 kWh"), &us()), Some(10_000));
        assert_eq!(parse_leading_int_safe(Some("50 MMBtu"), &us()), Some(50));
        assert_eq!(parse_leading_int_safe(Some("  "), &us()), None);
        assert_eq!(parse_leading_int_safe(Some("about 5 kW"), &us()), None);
    }

    #[test]
    fn electricity_conversion_uses_generation_efficiency() {
        let expected = 12000.0 * 0.003413 / 0.33;
        assert_eq!(kwh_to_mmbtu(12_000), expected);
        assert!((kwh_to_mmbtu(12_000) - 124.109_090_9).abs() < 1e-6);
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(3.5), 4.0);
        assert_eq!(currency_accuracy(0.123_45, 3), 0.123);
        assert_eq!(currency_accuracy(7.456, 2), 7.46);
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_int(9855), "9,855");
        assert_eq!(format_truncated(124.9), "124");
        assert_eq!(format_currency(3000.0, 0, "$"), "$3,000");
        assert_eq!(format_currency(-42.5, 2, "$"), "-$42.50");
    }

    #[test]
    fn formats_numbers_beyond_i64() {
        assert_eq!(format_number(1e19, 0), "10,000,000,000,000,000,000");
        assert_eq!(format_number(-1e19, 1), "-10,000,000,000,000,000,000.0");
        assert_eq!(format_number(f64::INFINITY, 0), "inf");
    }

    #[test]
    fn describes_payback() {
        assert_eq!(describe_payback(0.5), "6 months");
        assert_eq!(describe_payback(0.05), "1 month");
        assert_eq!(describe_payback(0.9), "11 months");
        assert_eq!(describe_payback(0.96), "1.0 years");
        assert_eq!(describe_payback(1.0), "1.0 years");
        assert_eq!(describe_payback(2.345), "2.3 years");
    }
}
