//! Legal amount in words on the Indian numbering scale

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;
const HUNDRED: u64 = 100;

/// 1..=99 in words
fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        return ONES[n].to_string();
    }
    match ONES[n % 10] {
        "" => TENS[n / 10].to_string(),
        unit => format!("{} {}", TENS[n / 10], unit),
    }
}

/// Whole number in words: crore, lakh, thousand, hundred, then the remainder
/// joined with "and" when a higher group precedes it.
pub fn integer_in_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut rest = n;

    if rest >= CRORE {
        parts.push(format!("{} Crore", integer_in_words(rest / CRORE)));
        rest %= CRORE;
    }
    if rest >= LAKH {
        parts.push(format!("{} Lakh", below_hundred(rest / LAKH)));
        rest %= LAKH;
    }
    if rest >= THOUSAND {
        parts.push(format!("{} Thousand", below_hundred(rest / THOUSAND)));
        rest %= THOUSAND;
    }
    if rest >= HUNDRED {
        parts.push(format!("{} Hundred", below_hundred(rest / HUNDRED)));
        rest %= HUNDRED;
    }
    if rest > 0 {
        let words = below_hundred(rest);
        if parts.is_empty() {
            parts.push(words);
        } else {
            parts.push(format!("and {}", words));
        }
    }

    parts.join(" ")
}

/// Rupees and paise in words, e.g. `One Hundred and Five and Fifty Paise Only`.
///
/// Paise are rounded half up; a rounding that reaches 100 paise carries into
/// the rupees.
pub fn amount_in_words(amount: &BigDecimal) -> String {
    if amount < &BigDecimal::from(0) {
        return format!("Minus {}", amount_in_words(&amount.abs()));
    }

    let rupees = amount.with_scale_round(0, RoundingMode::Floor);
    let paise = ((amount - &rupees) * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_u64()
        .unwrap_or(0);

    let Some(mut rupees) = rupees.to_u64() else {
        return format!("{} Only", amount);
    };
    let mut paise = paise;
    if paise >= 100 {
        rupees += 1;
        paise -= 100;
    }

    let mut words = integer_in_words(rupees);
    if paise > 0 {
        words.push_str(" and ");
        words.push_str(&integer_in_words(paise));
        words.push_str(" Paise Only");
    } else {
        words.push_str(" Only");
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn words(value: &str) -> String {
        amount_in_words(&BigDecimal::from_str(value).unwrap())
    }

    #[test]
    fn test_spot_values() {
        assert_eq!(words("0"), "Zero Only");
        assert_eq!(words("100"), "One Hundred Only");
        assert_eq!(words("100000"), "One Lakh Only");
        assert_eq!(
            words("123456.75"),
            "One Lakh Twenty Three Thousand Four Hundred and Fifty Six and Seventy Five Paise Only"
        );
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(words("7"), "Seven Only");
        assert_eq!(words("15"), "Fifteen Only");
        assert_eq!(words("40"), "Forty Only");
        assert_eq!(words("236"), "Two Hundred and Thirty Six Only");
        assert_eq!(words("1000"), "One Thousand Only");
    }

    #[test]
    fn test_crore_groups() {
        assert_eq!(
            words("12345678"),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred and Seventy Eight Only"
        );
        assert_eq!(words("1000000000"), "One Hundred Crore Only");
    }

    #[test]
    fn test_paise_rounding() {
        assert_eq!(words("0.5"), "Zero and Fifty Paise Only");
        assert_eq!(words("10.005"), "Ten and One Paise Only");
        assert_eq!(words("9.999"), "Ten Only");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(words("-5"), "Minus Five Only");
    }
}
