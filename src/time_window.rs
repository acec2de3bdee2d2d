use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::error::{Error, Result};

/// CLIから受け取る日付と、日付キーのフォーマット
pub const DAY_LAYOUT: &str = "%m/%d/%Y";

/// JIRAが返すタイムスタンプのフォーマット（例: 2024-03-15T23:59:59.999-0700）
pub const JIRA_TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// JQLの日付条件で使うフォーマット
const JQL_DATE_LAYOUT: &str = "%Y-%m-%d";

/// 集計対象の期間（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// 任意の時刻から期間を作成
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// MM/DD/YYYY形式の開始日・終了日から、両日を丸ごと含む期間を作成
    ///
    /// 開始は 00:00:00.000000000、終了はその日の 23:59:59.999999999 (UTC) になる。
    pub fn from_input_dates(start: &str, end: &str) -> Result<Self> {
        let start_date = parse_input_date(start)?;
        let end_date = parse_input_date(end)?;

        let start = start_date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| Error::InvalidInput(format!("invalid start date: {}", start)))?;
        let end = end_date
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| Error::InvalidInput(format!("invalid end date: {}", end)))?;

        Self::new(start, end)
    }

    /// タイムスタンプが期間内（境界を含む）かどうか
    pub fn contains<Tz: TimeZone>(&self, timestamp: &DateTime<Tz>) -> bool {
        let ts = timestamp.with_timezone(&Utc);
        ts >= self.start && ts <= self.end
    }

    /// JQLで使う開始日（YYYY-MM-DD）
    pub fn jql_start(&self) -> String {
        self.start.format(JQL_DATE_LAYOUT).to_string()
    }

    /// JQLで使う終了日（YYYY-MM-DD）
    pub fn jql_end(&self) -> String {
        self.end.format(JQL_DATE_LAYOUT).to_string()
    }
}

fn parse_input_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DAY_LAYOUT)
        .map_err(|e| Error::InvalidInput(format!("invalid date '{}' (expected MM/DD/YYYY): {}", s, e)))
}

/// JIRAのタイムスタンプ文字列をパース
///
/// オフセットは保持したまま返す。日付キーはそのオフセットでの暦日になる。
pub fn parse_jira_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, JIRA_TIMESTAMP_LAYOUT).map_err(|source| Error::TimestampParse {
        value: s.to_string(),
        source,
    })
}

/// タイムスタンプの日付キー（MM/DD/YYYY）
///
/// 日付はタイムスタンプ自身のオフセットでの暦日。期間判定はUTCで行うため、
/// 期間内のイベントでも期間外の日付キーになることがある
/// （例: 期間 03/01〜 に対し `2024-02-29T22:00:00.000-0500` は `02/29/2024`）。
pub fn day_key<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.format(DAY_LAYOUT).to_string()
}

/// 日付キーを日付に戻す
pub fn parse_day_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_LAYOUT)
        .map_err(|e| Error::InvalidInput(format!("invalid day key '{}': {}", key, e)))
}

/// 日付キーの曜日名（例: "Friday"）
pub fn day_of_week(key: &str) -> Result<String> {
    Ok(parse_day_key(key)?.format("%A").to_string())
}
