use chrono::{DateTime, Duration, NaiveDate};

use crate::errors::CoreError;

/// Amounts are integers in the smallest currency unit. IDR has no minor unit
/// in practice, so one unit is one rupiah.
pub type Amount = i64;

/// Format an amount for display.
///
/// IDR uses the Indonesian convention (`Rp 1.500.000`); every other currency
/// is rendered as `CODE 1,500,000`. Negative amounts get a leading minus.
#[must_use]
pub fn format_amount(amount: Amount, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let (prefix, separator) = if code == "IDR" {
        ("Rp".to_string(), '.')
    } else {
        (code, ',')
    };

    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{prefix} {grouped}")
}

/// Parse an entry date as reported by the backend into a local calendar date.
///
/// Accepts a plain `YYYY-MM-DD` (taken as-is, already local) or an RFC 3339
/// timestamp, which is shifted by `utc_offset_minutes` before the date is
/// taken. `2025-10-31T20:00:00Z` with a +07:00 offset is November 1st.
pub fn parse_entry_date(raw: &str, utc_offset_minutes: i32) -> Result<NaiveDate, CoreError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    let timestamp = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| CoreError::Deserialization(format!("Invalid entry date '{raw}': {e}")))?;
    let local = timestamp.naive_utc() + Duration::minutes(i64::from(utc_offset_minutes));
    Ok(local.date())
}

/// Render a date the way the backend expects it in request bodies.
#[must_use]
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
