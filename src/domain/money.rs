use thiserror::Error;

/// Money is held as integer cents so that totals and balances are exact.
/// Rs 50.00 = 5000 cents.
pub type Cents = i64;

/// Sums over many amounts are widened so that totals cannot overflow.
pub type TotalCents = i128;

/// Largest amount a single transaction may carry (Rs 100,000,000,000.00).
/// Amounts up to this size survive the `REAL` column exactly.
pub const MAX_AMOUNT_CENTS: Cents = 10_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount format: {0}")]
    InvalidFormat(String),
}

/// Format cents as a plain decimal string with two places.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: impl Into<TotalCents>) -> String {
    let cents = cents.into();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Format cents for display with thousands separators.
/// Example: 5000000 -> "50,000.00"
pub fn format_grouped(cents: impl Into<TotalCents>) -> String {
    let cents = cents.into();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{:02}", sign, grouped, abs % 100)
}

/// Format cents with a currency label, e.g. "Rs 50,000.00".
pub fn format_money(cents: impl Into<TotalCents>, currency: &str) -> String {
    if currency.is_empty() {
        format_grouped(cents)
    } else {
        format!("{} {}", currency, format_grouped(cents))
    }
}

/// Parse a decimal string into cents. Extra decimal places are truncated.
/// Example: "50.00" -> 5000, "12.5" -> 1250, ".5" -> 50
pub fn parse_cents(input: &str) -> Result<Cents, ParseAmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let invalid = || ParseAmountError::InvalidFormat(trimmed.to_string());
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (units_str, fraction_str) = digits.split_once('.').unwrap_or((digits, ""));
    if fraction_str.contains('.') || (units_str.is_empty() && fraction_str.is_empty()) {
        return Err(invalid());
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| invalid())?
    };

    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction_str[..2].parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}

/// Convert cents to currency units for the `REAL` amount column.
pub fn cents_to_units(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Convert a stored `REAL` amount back to cents, rounding to the nearest cent.
pub fn units_to_cents(units: f64) -> Cents {
    (units * 100.0).round() as Cents
}
