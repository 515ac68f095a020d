/// Insert thousands separators into the integer part of a formatted number
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a number with thousands separators and a fixed number of decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut result = String::new();
    // `-0.0000` should not print a sign
    if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        result.push('-');
    }
    result.push_str(&group_thousands(int_part));
    if let Some(frac_part) = frac_part {
        result.push('.');
        result.push_str(frac_part);
    }
    result
}

/// Format a value in compact form (e.g., 2.10B, 450.25M, 1,234.50)
pub fn format_compact(value: f64) -> String {
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000_000.0 {
        format!("{}{}B", sign, format_number(abs_value / 1_000_000_000.0, 2))
    } else if abs_value >= 1_000_000.0 {
        format!("{}{}M", sign, format_number(abs_value / 1_000_000.0, 2))
    } else {
        format_number(value, 2)
    }
}

/// Format a percentage that is already on the 0-100 scale
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}
