/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms, collision-free at branch scale)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Convert a millisecond timestamp to the business calendar day
/// in the given timezone.
pub fn business_date(millis: i64, tz: chrono_tz::Tz) -> chrono::NaiveDate {
    use chrono::TimeZone;
    chrono::Utc
        .timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(chrono::Utc::now)
        .with_timezone(&tz)
        .date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_ids_are_positive_and_distinct() {
        let a = snowflake_id();
        let b = snowflake_id();
        assert!(a > 0);
        assert!(b > 0);
        // Not guaranteed distinct in theory, but 12 random bits per ms
        // make a collision in two draws effectively impossible.
        assert_ne!(a, b);
    }

    #[test]
    fn test_business_date_respects_timezone() {
        // 2024-03-01 23:30 UTC is already 2024-03-02 in Seoul (UTC+9)
        let millis = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        let day = business_date(millis, chrono_tz::Asia::Seoul);
        assert_eq!(day, chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }
}
