use chrono::{TimeZone, Utc};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms, collision-free at POS scale)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Render a millisecond timestamp as the canonical response date-time string.
pub fn format_timestamp(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_timestamp_is_fixed_format() {
        // 2024-01-01 00:00:00 UTC
        assert_eq!(format_timestamp(1_704_067_200_000), "2024-01-01 00:00:00");
    }

    #[test]
    fn snowflake_ids_are_positive_and_mostly_distinct() {
        let ids: Vec<i64> = (0..32).map(|_| snowflake_id()).collect();
        assert!(ids.iter().all(|&id| id > 0));

        // 12 random bits per millisecond: a batch of 32 draws colliding
        // down to a single value would mean the generator is broken.
        let distinct: std::collections::HashSet<_> = ids.iter().collect();
        assert!(distinct.len() > 1);
    }
}
