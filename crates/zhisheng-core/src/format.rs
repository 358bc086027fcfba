//! # Formatting Utilities
//!
//! Display helpers shared by every page: prices, dates, order numbers.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike};
use rand::Rng;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::CURRENCY_SYMBOL;

/// Pattern used when a page does not pass one.
pub const DEFAULT_DATE_PATTERN: &str = "YYYY-MM-DD HH:mm:ss";

/// Formats a decimal yuan amount: `"¥"` plus exactly two decimals.
///
/// Rounds to the nearest fen with ties away from zero, the same as
/// [`Money::from_decimal`]. Values with no fen equivalent (NaN, infinities,
/// out of range) are printed as-is.
///
/// ```rust
/// use zhisheng_core::format::format_price;
///
/// assert_eq!(format_price(9.0), "¥9.00");
/// assert_eq!(format_price(12.345), "¥12.35");
/// assert_eq!(format_price(0.125), "¥0.13");
/// ```
pub fn format_price(value: f64) -> String {
    match Money::from_decimal(value) {
        Ok(money) => money.to_string(),
        Err(_) => format!("{}{:.2}", CURRENCY_SYMBOL, value),
    }
}

/// Substitutes date tokens in `pattern`.
///
/// | Token  | Value                  |
/// |--------|------------------------|
/// | `YYYY` | four-digit year        |
/// | `MM`   | month, 01-12           |
/// | `DD`   | day of month, 01-31    |
/// | `HH`   | hour, 00-23            |
/// | `mm`   | minute, 00-59          |
/// | `ss`   | second, 00-59          |
///
/// Tokens are substituted in the order above and only the first occurrence
/// of each is replaced; a repeated token stays literal after its first use.
///
/// ```rust
/// use chrono::NaiveDate;
/// use zhisheng_core::format::format_date;
///
/// let dt = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap().and_hms_opt(9, 5, 0).unwrap();
/// assert_eq!(format_date(&dt, "YYYY/MM/DD HH:mm"), "2024/03/07 09:05");
/// ```
pub fn format_date<T>(date: &T, pattern: &str) -> String
where
    T: Datelike + Timelike,
{
    let tokens = [
        ("YYYY", format!("{:04}", date.year())),
        ("MM", format!("{:02}", date.month())),
        ("DD", format!("{:02}", date.day())),
        ("HH", format!("{:02}", date.hour())),
        ("mm", format!("{:02}", date.minute())),
        ("ss", format!("{:02}", date.second())),
    ];

    tokens
        .iter()
        .fold(pattern.to_string(), |out, (token, value)| {
            out.replacen(token, value, 1)
        })
}

/// Formats a millisecond Unix timestamp in local time.
pub fn format_timestamp_millis(millis: i64, pattern: &str) -> CoreResult<String> {
    let date: DateTime<Local> = Local
        .timestamp_millis_opt(millis)
        .single()
        .ok_or(CoreError::InvalidTimestamp(millis))?;
    Ok(format_date(&date, pattern))
}

/// Builds an order number: `YYYYMMDD` plus a 4-digit random suffix.
///
/// The suffix has 10,000 values, so two orders placed the same day can
/// collide; the order service is expected to reject duplicates.
pub fn order_number_for<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..10_000);
    format!(
        "{:04}{:02}{:02}{:04}",
        date.year(),
        date.month(),
        date.day(),
        suffix
    )
}

/// Order number for today's local date.
pub fn generate_order_number() -> String {
    order_number_for(Local::now().date_naive(), &mut rand::thread_rng())
}
