//! Locale-aware number and currency formatting.

/// Separators and currency symbol for a numeric locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub grouping: char,
    pub decimal: char,
    pub currency_symbol: &'static str,
}

/// Brazilian convention: `R$ 1.234,50`.
pub const PT_BR: NumberLocale = NumberLocale {
    grouping: '.',
    decimal: ',',
    currency_symbol: "R$",
};

/// Formats `value` with `decimals` fractional digits and grouped thousands.
#[must_use]
pub fn format_decimal(value: f64, decimals: usize, locale: &NumberLocale) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let digits = integer.len();
    let mut out = String::with_capacity(fixed.len() + digits / 3 + 2);
    if value.is_sign_negative() && fixed.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        out.push('-');
    }
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (digits - index) % 3 == 0 {
            out.push(locale.grouping);
        }
        out.push(ch);
    }
    if !fraction.is_empty() {
        out.push(locale.decimal);
        out.push_str(fraction);
    }
    out
}

/// Formats a monetary value with two decimals, prefixed by the currency symbol.
#[must_use]
pub fn format_currency(value: f64, locale: &NumberLocale) -> String {
    format!("{} {}", locale.currency_symbol, format_decimal(value, 2, locale))
}
