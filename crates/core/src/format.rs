//! Display helpers for amounts and users

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency suffix appended to formatted amounts
pub const CURRENCY: &str = "UZS";

const GROUP_SEPARATOR: char = '\u{a0}';
const DECIMAL_SEPARATOR: char = ',';
const MAX_FRACTION_DIGITS: u32 = 3;

/// Format an amount the way the `uz-UZ` locale writes plain decimals,
/// followed by the currency code: `1 234 567,5 UZS`.
///
/// Groups are separated by a no-break space; at most three fraction digits
/// are kept and trailing zeros are dropped.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let digits = rounded.abs().to_string();
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + 8);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    let len = integer.len();
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(fraction);
    }
    out.push(' ');
    out.push_str(CURRENCY);
    out
}

/// Two-letter avatar text derived from an email address
pub fn user_initials(email: &str) -> String {
    email.chars().take(2).collect::<String>().to_uppercase()
}
