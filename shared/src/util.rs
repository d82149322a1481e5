/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 毫秒时间戳 → RFC 3339 字符串 (UTC)
///
/// 无效时间戳返回空字符串，仅用于渲染输出。
pub fn millis_to_rfc3339(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// 两个毫秒时间戳之间的天数 (浮点)
pub fn age_days(from_millis: i64, now_millis: i64) -> f64 {
    (now_millis - from_millis) as f64 / 86_400_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_rfc3339() {
        assert_eq!(millis_to_rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(millis_to_rfc3339(1_700_000_000_000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_age_days() {
        assert_eq!(age_days(0, 86_400_000), 1.0);
        assert_eq!(age_days(0, 43_200_000), 0.5);
    }
}
