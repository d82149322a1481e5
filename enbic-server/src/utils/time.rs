//! 时间工具函数：业务时区转换
//!
//! 日期 → 时间戳的换算在引擎入口完成，repository 层只接收 `i64` Unix millis。

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析时区名称 (IANA)，如 `Africa/Lagos`
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::with_message(super::ErrorCode::ConfigError, format!("Invalid timezone: {name}")))
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期 + 时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
fn local_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    local_millis(date, NaiveTime::MIN, tz)
}

/// 日期结束 → 当天最后一毫秒 (业务时区)，调用方使用 `<= end` 语义
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    match date.succ_opt() {
        Some(next_day) => local_millis(next_day, NaiveTime::MIN, tz) - 1,
        None => local_millis(date, NaiveTime::MIN, tz) + 86_400_000 - 1,
    }
}

/// 可选日期区间 → 毫秒区间 (含首尾两天)
pub fn date_range_millis(
    date_from: Option<&str>,
    date_to: Option<&str>,
    tz: Tz,
) -> AppResult<(Option<i64>, Option<i64>)> {
    let from = date_from
        .filter(|s| !s.trim().is_empty())
        .map(parse_date)
        .transpose()?;
    let to = date_to
        .filter(|s| !s.trim().is_empty())
        .map(parse_date)
        .transpose()?;
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(AppError::validation(format!(
            "date_from {} is after date_to {}",
            from, to
        )));
    }
    Ok((
        from.map(|d| day_start_millis(d, tz)),
        to.map(|d| day_end_millis(d, tz)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_day_bounds_utc() {
        let date = parse_date("2024-01-01").unwrap();
        assert_eq!(day_start_millis(date, Tz::UTC), 1_704_067_200_000);
        assert_eq!(day_end_millis(date, Tz::UTC), 1_704_153_600_000 - 1);
    }

    #[test]
    fn test_day_bounds_follow_timezone() {
        let date = parse_date("2024-01-01").unwrap();
        // Lagos is UTC+1
        let tz = parse_timezone("Africa/Lagos").unwrap();
        assert_eq!(day_start_millis(date, tz), 1_704_067_200_000 - 3_600_000);
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        assert!(date_range_millis(Some("2024-02-01"), Some("2024-01-01"), Tz::UTC).is_err());
        let (from, to) = date_range_millis(None, Some(""), Tz::UTC).unwrap();
        assert!(from.is_none() && to.is_none());
    }

    #[test]
    fn test_parse_timezone_rejects_unknown() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
