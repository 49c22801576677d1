//! Currency and number formatting with Indian digit grouping (lakh / crore)

use bigdecimal::{BigDecimal, RoundingMode};

/// Default currency glyph
pub const RUPEE_SYMBOL: &str = "₹";

/// Group an unsigned digit string the Indian way: last three digits, then pairs.
///
/// `"12345678"` becomes `"1,23,45,678"`.
pub fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), last_three)
}

/// Round to two decimals and group, without a currency symbol: `1,23,456.75`
pub fn format_amount(amount: &BigDecimal) -> String {
    let rounded = amount.with_scale_round(2, RoundingMode::HalfUp);
    let (mantissa, _) = rounded.as_bigint_and_exponent();
    let text = mantissa.to_string();

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let padded = format!("{:0>3}", digits);
    let (integer, fraction) = padded.split_at(padded.len() - 2);

    format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        group_indian(integer),
        fraction
    )
}

/// Currency amount with the glyph prefixed: `₹1,23,456.75`, `-₹50.00`
pub fn format_currency(amount: &BigDecimal, symbol: &str) -> String {
    let formatted = format_amount(amount);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-{}{}", symbol, rest),
        None => format!("{}{}", symbol, formatted),
    }
}

/// Decimal without trailing fractional zeros and without exponent notation
pub fn plain_decimal(value: &BigDecimal) -> String {
    if value.is_integer() {
        value.with_scale(0).to_string()
    } else {
        value.normalized().to_string()
    }
}

/// Quantities print as plain numbers, no grouping
pub fn format_quantity(quantity: &BigDecimal) -> String {
    plain_decimal(quantity)
}

/// GST percentage label: `18%`
pub fn format_percent(rate: &BigDecimal) -> String {
    format!("{}%", plain_decimal(rate))
}
