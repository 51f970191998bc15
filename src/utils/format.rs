//! Display formatting for currency and supply figures
//!
//! `format_currency` groups thousands behind a dollar sign,
//! `format_currency_short` abbreviates large amounts ("$1.23M") and
//! `format_supply` uses SI prefixes with "B" standing in for giga.
//! `parse_display` reads any of them back.

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

const SHORT_SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Dollar amount with grouped thousands, e.g. 2000000 -> "$2,000,000".
/// Keeps up to 12 significant digits and drops trailing zeros.
pub fn format_currency(x: f64) -> String {
    if !x.is_finite() {
        return "n/a".to_string();
    }
    let sign = if x < 0.0 { "-" } else { "" };
    let a = x.abs();
    if a == 0.0 {
        return "$0".to_string();
    }

    let exponent = a.log10().floor() as i32;
    let decimals = (11 - exponent).clamp(0, 30) as usize;
    let plain = trim_fraction(format!("{:.*}", decimals, a));

    format!("{}${}", sign, group_thousands(&plain))
}

/// Abbreviated dollar amount, e.g. 1234567 -> "$1.23M".
/// Amounts under one thousand fall back to `format_currency`.
pub fn format_currency_short(x: f64) -> String {
    if !x.is_finite() {
        return "n/a".to_string();
    }
    let a = x.abs();
    if a < 1e3 {
        return format_currency(x);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let rounded = round_significant(a, 3);
    let (scale, suffix) = SHORT_SUFFIXES
        .iter()
        .copied()
        .find(|(scale, _)| rounded >= *scale)
        .unwrap_or((1e3, "K"));

    let scaled = rounded / scale;
    let decimals = (2 - scaled.log10().floor() as i32).clamp(0, 2) as usize;
    let number = trim_fraction(format!("{:.*}", decimals, scaled));

    format!("{}${}{}", sign, number, suffix)
}

/// SI-prefixed figure with three significant digits, e.g. 1234 -> "1.23k",
/// 1e9 -> "1.00B".
pub fn format_supply(x: f64) -> String {
    if !x.is_finite() {
        return "n/a".to_string();
    }
    if x == 0.0 {
        return "0.00".to_string();
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let (digits, exponent) = significant_digits(x.abs(), 3);

    let prefix_index = exponent.div_euclid(3).clamp(-8, 8);
    let shift = exponent - prefix_index * 3;

    let number = if shift < 0 {
        format!("0.{}{}", "0".repeat((-shift - 1) as usize), digits)
    } else if shift as usize + 1 >= digits.len() {
        format!("{}{}", digits, "0".repeat(shift as usize + 1 - digits.len()))
    } else {
        let (int_part, frac_part) = digits.split_at(shift as usize + 1);
        format!("{}.{}", int_part, frac_part)
    };

    let prefix = match SI_PREFIXES[(prefix_index + 8) as usize] {
        "G" => "B",
        p => p,
    };

    format!("{}{}{}", sign, number, prefix)
}

/// Parse a string produced by any of the formatters back into a number.
/// Returns `None` for "n/a" or anything unrecognised.
#[cfg(test)]
pub fn parse_display(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.strip_prefix('$').unwrap_or(s);
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();

    let last = cleaned.chars().last()?;
    let (number, multiplier) = if last.is_ascii_digit() || last == '.' {
        (cleaned.as_str(), 1.0)
    } else {
        let multiplier = suffix_multiplier(last)?;
        (&cleaned[..cleaned.len() - last.len_utf8()], multiplier)
    };

    let value: f64 = number.parse().ok()?;
    let value = value * multiplier;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
fn suffix_multiplier(suffix: char) -> Option<f64> {
    let multiplier = match suffix {
        'y' => 1e-24,
        'z' => 1e-21,
        'a' => 1e-18,
        'f' => 1e-15,
        'p' => 1e-12,
        'n' => 1e-9,
        'µ' | 'u' => 1e-6,
        'm' => 1e-3,
        'k' | 'K' => 1e3,
        'M' => 1e6,
        'B' | 'G' => 1e9,
        'T' => 1e12,
        'P' => 1e15,
        'E' => 1e18,
        'Z' => 1e21,
        'Y' => 1e24,
        _ => return None,
    };
    Some(multiplier)
}

/// Round `a` (positive, finite) to `precision` significant digits and
/// return the digit string with the decimal exponent of its first digit.
fn significant_digits(a: f64, precision: usize) -> (String, i32) {
    let scientific = format!("{:.*e}", precision.saturating_sub(1), a);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits, exponent.parse().unwrap_or(0))
}

fn round_significant(a: f64, precision: usize) -> f64 {
    format!("{:.*e}", precision.saturating_sub(1), a)
        .parse()
        .unwrap_or(a)
}

fn trim_fraction(s: String) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn group_thousands(plain: &str) -> String {
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, rel: f64) {
        let tolerance = expected.abs() * rel;
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} not within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(2_000_000.0), "$2,000,000");
        assert_eq!(format_currency(1234.5), "$1,234.5");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(2.0), "$2");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(-1500.0), "-$1,500");
        assert_eq!(format_currency(0.0123), "$0.0123");
    }

    #[test]
    fn test_format_currency_short_abbreviates() {
        assert_eq!(format_currency_short(1_234_567.0), "$1.23M");
        assert_eq!(format_currency_short(2_000_000.0), "$2M");
        assert_eq!(format_currency_short(1_200_000.0), "$1.2M");
        assert_eq!(format_currency_short(45_600.0), "$45.6K");
        assert_eq!(format_currency_short(3.5e9), "$3.5B");
        assert_eq!(format_currency_short(999_999.0), "$1M");
        assert_eq!(format_currency_short(500.0), "$500");
    }

    #[test]
    fn test_format_supply_uses_si_prefixes_with_billions() {
        assert_eq!(format_supply(200.0), "200");
        assert_eq!(format_supply(1234.0), "1.23k");
        assert_eq!(format_supply(1e9), "1.00B");
        assert_eq!(format_supply(2.5e6), "2.50M");
        assert_eq!(format_supply(0.5), "500m");
        assert_eq!(format_supply(12.0), "12.0");
        assert_eq!(format_supply(0.0), "0.00");
        assert_eq!(format_supply(-4200.0), "-4.20k");
    }

    #[test]
    fn test_non_finite_values_are_not_formatted() {
        assert_eq!(format_currency(f64::NAN), "n/a");
        assert_eq!(format_currency_short(f64::INFINITY), "n/a");
        assert_eq!(format_supply(f64::NAN), "n/a");
        assert_eq!(parse_display("n/a"), None);
    }

    #[test]
    fn test_formatting_round_trips_within_tolerance() {
        let samples = [0.004, 0.25, 1.0, 7.5, 42.0, 999.0, 1_500.0, 87_654.0, 3.3e6, 1.9e9, 7.25e11];
        for &x in &samples {
            assert_close(parse_display(&format_currency(x)).unwrap(), x, 1e-9);
            assert_close(parse_display(&format_currency_short(x)).unwrap(), x, 5e-3);
            assert_close(parse_display(&format_supply(x)).unwrap(), x, 5e-3);
        }
    }
}
