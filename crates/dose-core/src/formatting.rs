/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dose_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a tiny epsilon so exact binary midpoints round away from zero.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // "0.50" -> ".50"
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a cumulative dose for table cells and axis labels.
///
/// Uses three decimals below 10, two below 1,000 and none above, so that
/// small early readings stay distinguishable without widening large ones.
///
/// ```
/// use dose_core::formatting::format_dose;
///
/// assert_eq!(format_dose(2.5), "2.500");
/// assert_eq!(format_dose(125.0), "125.00");
/// assert_eq!(format_dose(12345.6), "12,346");
/// ```
pub fn format_dose(value: f64) -> String {
    let magnitude = value.abs();
    let decimals = if magnitude < 10.0 {
        3
    } else if magnitude < 1_000.0 {
        2
    } else {
        0
    };
    format_number(value, decimals)
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.0001, 2), "0.00");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::NAN, 2), "NaN");
        assert_eq!(format_number(f64::INFINITY, 2), "inf");
    }

    #[test]
    fn test_format_dose_bands() {
        assert_eq!(format_dose(0.0), "0.000");
        assert_eq!(format_dose(9.9994), "9.999");
        assert_eq!(format_dose(10.0), "10.00");
        assert_eq!(format_dose(999.5), "999.50");
        assert_eq!(format_dose(1_000.0), "1,000");
    }
}
