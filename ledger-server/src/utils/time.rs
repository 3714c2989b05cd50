//! Business-day helpers
//!
//! Both temporal axes of an order (order date and settlement date) bucket
//! by calendar day in the configured business timezone.

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::models::Order;

/// Calendar day of the order-date axis
pub fn order_day(order: &Order, tz: Tz) -> NaiveDate {
    shared::util::business_date(order.ordered_at, tz)
}

/// Calendar day of the settlement axis, None while unsettled
pub fn settlement_day(order: &Order, tz: Tz) -> Option<NaiveDate> {
    order.settlement_ts().map(|ts| shared::util::business_date(ts, tz))
}

/// Parse a YYYY-MM-DD date parameter
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Millisecond range [start, end) covering a calendar day in a timezone
pub fn day_range_millis(day: NaiveDate, tz: Tz) -> (i64, i64) {
    use chrono::TimeZone;
    let start = tz
        .from_local_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_default();
    let next = day.succ_opt().unwrap_or(day);
    let end = tz
        .from_local_datetime(&next.and_hms_opt(0, 0, 0).unwrap())
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(start);
    (start, end)
}
