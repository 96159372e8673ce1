//! Presentation formatting for money.
//!
//! Computations keep full decimal precision. Rounding to two places happens
//! only here, when a figure is turned into text.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to currency precision (2 dp, half away from zero).
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two fixed decimal places with thousands grouping: `1,674,750.00`.
pub fn format_fixed(amount: Decimal) -> String {
    let mut rounded = round_currency(amount);
    rounded.rescale(2);
    group(&rounded.to_string())
}

/// Locale-style grouping with at most two decimals and no trailing zeros:
/// `8,000`, `83,737.5`, `674,402.08`.
pub fn format_grouped(amount: Decimal) -> String {
    group(&round_currency(amount).normalize().to_string())
}

/// Symbol-prefixed fixed figure, e.g. `₦1,500.00`.
pub fn format_money_fixed(symbol: &str, amount: Decimal) -> String {
    with_symbol(symbol, &format_fixed(amount))
}

/// Symbol-prefixed grouped figure, e.g. `₦8,000`.
pub fn format_money(symbol: &str, amount: Decimal) -> String {
    with_symbol(symbol, &format_grouped(amount))
}

fn with_symbol(symbol: &str, figure: &str) -> String {
    match figure.strip_prefix('-') {
        Some(abs) => format!("-{}{}", symbol, abs),
        None => format!("{}{}", symbol, figure),
    }
}

fn group(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
