//! 日期时间类型模块
//!
//! 本模块定义了日期、时间、日期时间和持续时间类型，以及它们的 ISO-8601
//! 文本形式（解析与输出）。输出格式与 Neo4j 驱动的 `iso_format` 保持一致：
//! 秒的小数部分固定为 9 位纳秒，带时区的值追加 `±HH:MM` 偏移。

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// 日期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateValue {
    pub date: NaiveDate,
}

impl DateValue {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }

    /// 解析 `YYYY-MM-DD`
    pub fn parse_iso(text: &str) -> Option<Self> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .ok()
            .map(Self::new)
    }

    pub fn iso_format(&self) -> String {
        format_date(&self.date)
    }
}

/// 时间（可带固定偏移）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    pub time: NaiveTime,
    pub offset: Option<FixedOffset>,
}

impl TimeValue {
    pub fn new(time: NaiveTime, offset: Option<FixedOffset>) -> Self {
        Self { time, offset }
    }

    pub fn from_hms_nano(hour: u32, minute: u32, sec: u32, nano: u32) -> Option<Self> {
        NaiveTime::from_hms_nano_opt(hour, minute, sec, nano).map(|time| Self::new(time, None))
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 解析 `HH:MM[:SS[.fffffffff]][Z|±HH:MM][[Zone/Id]]`
    pub fn parse_iso(text: &str) -> Option<Self> {
        let (body, offset) = split_offset(text.trim())?;
        Some(Self::new(parse_time(body)?, offset))
    }

    pub fn iso_format(&self) -> String {
        let mut text = format_time(&self.time);
        if let Some(offset) = self.offset {
            text.push_str(&offset.to_string());
        }
        text
    }
}

/// 日期时间（可带固定偏移）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeValue {
    pub datetime: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl DateTimeValue {
    pub fn new(datetime: NaiveDateTime, offset: Option<FixedOffset>) -> Self {
        Self { datetime, offset }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 解析 `YYYY-MM-DDTHH:MM:SS[.f][Z|±HH:MM][[Zone/Id]]`
    ///
    /// 区域名（方括号部分）只用于服务端换算偏移，这里丢弃，仅保留偏移量。
    pub fn parse_iso(text: &str) -> Option<Self> {
        let (date_part, time_part) = text.trim().split_once('T')?;
        let date = DateValue::parse_iso(date_part)?;
        let time = TimeValue::parse_iso(time_part)?;
        Some(Self::new(date.date.and_time(time.time), time.offset))
    }

    pub fn iso_format(&self) -> String {
        let mut text = format!(
            "{}T{}",
            format_date(&self.datetime.date()),
            format_time(&self.datetime.time())
        );
        if let Some(offset) = self.offset {
            text.push_str(&offset.to_string());
        }
        text
    }
}

/// 持续时间
///
/// 与 Cypher 的 duration 一样按 月 / 日 / 秒 / 纳秒 四个分量存储，分量之间不做换算。
/// 秒与纳秒在构造时归一化为同号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DurationValue {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanoseconds: i64,
}

impl DurationValue {
    pub fn new(months: i64, days: i64, seconds: i64, nanoseconds: i64) -> Self {
        let total = i128::from(seconds) * i128::from(NANOS_PER_SECOND) + i128::from(nanoseconds);
        let nanos = i128::from(NANOS_PER_SECOND);
        Self {
            months,
            days,
            seconds: (total / nanos) as i64,
            nanoseconds: (total % nanos) as i64,
        }
    }

    /// 解析 ISO-8601 周期文本，例如 `P1Y2M3DT4H5M6.7S`、`P2W`、`PT-1.5S`
    pub fn parse_iso(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negated, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let rest = rest.strip_prefix('P')?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (rest, None),
        };

        let (mut months, mut days, mut seconds, mut nanos) = (0i64, 0i64, 0i64, 0i64);
        for (amount, unit) in duration_components(date_part)? {
            let whole = parse_whole(amount)?;
            match unit {
                'Y' => months = months.checked_add(whole.checked_mul(12)?)?,
                'M' => months = months.checked_add(whole)?,
                'W' => days = days.checked_add(whole.checked_mul(7)?)?,
                'D' => days = days.checked_add(whole)?,
                _ => return None,
            }
        }
        if let Some(time_part) = time_part {
            if time_part.is_empty() {
                return None;
            }
            for (amount, unit) in duration_components(time_part)? {
                match unit {
                    'H' => seconds = seconds.checked_add(parse_whole(amount)?.checked_mul(3600)?)?,
                    'M' => seconds = seconds.checked_add(parse_whole(amount)?.checked_mul(60)?)?,
                    'S' => {
                        let (whole, fraction) = parse_seconds(amount)?;
                        seconds = seconds.checked_add(whole)?;
                        nanos = nanos.checked_add(fraction)?;
                    }
                    _ => return None,
                }
            }
        }

        if negated {
            Some(Self::new(
                months.checked_neg()?,
                days.checked_neg()?,
                seconds.checked_neg()?,
                nanos.checked_neg()?,
            ))
        } else {
            Some(Self::new(months, days, seconds, nanos))
        }
    }

    /// 输出 ISO-8601 周期文本，零分量省略，全零时为 `PT0S`
    pub fn iso_format(&self) -> String {
        let (years, months) = (self.months / 12, self.months % 12);
        let (total_minutes, seconds) = (self.seconds / 60, self.seconds % 60);
        let (hours, minutes) = (total_minutes / 60, total_minutes % 60);

        let mut time = String::new();
        if hours != 0 {
            time.push_str(&format!("{}H", hours));
        }
        if minutes != 0 {
            time.push_str(&format!("{}M", minutes));
        }
        if self.nanoseconds != 0 {
            let fraction = format!("{:09}", self.nanoseconds.abs());
            let fraction = fraction.trim_end_matches('0');
            if seconds >= 0 && self.nanoseconds >= 0 {
                time.push_str(&format!("{}.{}S", seconds, fraction));
            } else {
                time.push_str(&format!("-{}.{}S", seconds.abs(), fraction));
            }
        } else if seconds != 0 {
            time.push_str(&format!("{}S", seconds));
        }

        let mut text = String::new();
        if years != 0 {
            text.push_str(&format!("{}Y", years));
        }
        if months != 0 {
            text.push_str(&format!("{}M", months));
        }
        if self.days != 0 {
            text.push_str(&format!("{}D", self.days));
        }
        if !time.is_empty() {
            text.push('T');
            text.push_str(&time);
        }

        if text.is_empty() {
            "PT0S".to_string()
        } else {
            format!("P{}", text)
        }
    }
}

fn format_date(date: &NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn format_time(time: &NaiveTime) -> String {
    // chrono 用 >= 1e9 的纳秒表示闰秒
    let nanos = time.nanosecond().min(999_999_999);
    format!(
        "{:02}:{:02}:{:02}.{:09}",
        time.hour(),
        time.minute(),
        time.second(),
        nanos
    )
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

/// 拆出尾部的 `Z` / `±HH:MM[:SS]` 偏移和 `[Zone/Id]` 区域名
fn split_offset(text: &str) -> Option<(&str, Option<FixedOffset>)> {
    let text = match text.find('[') {
        Some(index) => &text[..index],
        None => text,
    };
    if let Some(body) = text.strip_suffix('Z') {
        return Some((body, FixedOffset::east_opt(0)));
    }
    match text.rfind(['+', '-']) {
        Some(index) => Some((&text[..index], Some(parse_offset(&text[index..])?))),
        None => Some((text, None)),
    }
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let sign = match text.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: Vec<i32> = text[1..]
        .split(':')
        .map(|part| part.parse::<i32>().ok())
        .collect::<Option<_>>()?;
    let seconds = match digits.as_slice() {
        [hours] if text.len() == 5 => (hours / 100) * 3600 + (hours % 100) * 60,
        [hours] => hours * 3600,
        [hours, minutes] => hours * 3600 + minutes * 60,
        [hours, minutes, seconds] => hours * 3600 + minutes * 60 + seconds,
        _ => return None,
    };
    FixedOffset::east_opt(sign * seconds)
}

/// 把 `1Y2M3D` 拆成 `[("1", 'Y'), ("2", 'M'), ("3", 'D')]`
fn duration_components(text: &str) -> Option<Vec<(&str, char)>> {
    let mut components = Vec::new();
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        if ch.is_ascii_alphabetic() {
            if index == start {
                return None;
            }
            components.push((&text[start..index], ch.to_ascii_uppercase()));
            start = index + ch.len_utf8();
        }
    }
    if start != text.len() {
        return None;
    }
    Some(components)
}

fn parse_whole(amount: &str) -> Option<i64> {
    amount.parse::<i64>().ok()
}

/// 解析带小数的秒，返回同号的 (秒, 纳秒)
fn parse_seconds(amount: &str) -> Option<(i64, i64)> {
    let (negative, digits) = match amount.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, amount.strip_prefix('+').unwrap_or(amount)),
    };
    let (whole, fraction) = match digits.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if fraction.len() > 9 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().ok()? };
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse::<i64>().ok()?
    };
    Some(if negative { (-whole, -nanos) } else { (whole, nanos) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_iso_format() {
        let date = DateValue::from_ymd(1999, 3, 7).expect("valid date");
        assert_eq!(date.iso_format(), "1999-03-07");
        assert_eq!(DateValue::parse_iso("1999-03-07"), Some(date));
    }

    #[test]
    fn test_time_iso_format_pads_nanoseconds() {
        let time = TimeValue::from_hms_nano(9, 5, 3, 120_000_000).expect("valid time");
        assert_eq!(time.iso_format(), "09:05:03.120000000");

        let zoned = time.with_offset(FixedOffset::east_opt(3600).expect("valid offset"));
        assert_eq!(zoned.iso_format(), "09:05:03.120000000+01:00");
    }

    #[test]
    fn test_time_parse_with_utc_suffix() {
        let time = TimeValue::parse_iso("12:50:35.556Z").expect("parse time");
        assert_eq!(time.iso_format(), "12:50:35.556000000+00:00");
    }

    #[test]
    fn test_datetime_parse_and_format() {
        let local = DateTimeValue::parse_iso("2015-07-04T19:32:24").expect("parse local datetime");
        assert_eq!(local.offset, None);
        assert_eq!(local.iso_format(), "2015-07-04T19:32:24.000000000");

        let zoned = DateTimeValue::parse_iso("2015-06-24T12:50:35.556-05:00[America/Chicago]")
            .expect("parse zoned datetime");
        assert_eq!(zoned.iso_format(), "2015-06-24T12:50:35.556000000-05:00");
    }

    #[test]
    fn test_duration_parse_components() {
        let duration = DurationValue::parse_iso("P1Y2M3DT4H5M6.5S").expect("parse duration");
        assert_eq!(duration.months, 14);
        assert_eq!(duration.days, 3);
        assert_eq!(duration.seconds, 4 * 3600 + 5 * 60 + 6);
        assert_eq!(duration.nanoseconds, 500_000_000);
        assert_eq!(duration.iso_format(), "P1Y2M3DT4H5M6.5S");
    }

    #[test]
    fn test_duration_zero_and_weeks() {
        assert_eq!(DurationValue::default().iso_format(), "PT0S");
        let weeks = DurationValue::parse_iso("P2W").expect("parse weeks");
        assert_eq!(weeks.iso_format(), "P14D");
    }

    #[test]
    fn test_duration_negative_fraction() {
        let duration = DurationValue::new(0, 0, -1, -500_000_000);
        assert_eq!(duration.iso_format(), "PT-1.5S");
        assert_eq!(DurationValue::parse_iso("PT-1.5S"), Some(duration));
    }

    #[test]
    fn test_duration_normalizes_nanoseconds() {
        let duration = DurationValue::new(0, 0, 1, 1_500_000_000);
        assert_eq!(duration.seconds, 2);
        assert_eq!(duration.nanoseconds, 500_000_000);
    }

    #[test]
    fn test_duration_rejects_garbage() {
        assert!(DurationValue::parse_iso("14 days").is_none());
        assert!(DurationValue::parse_iso("PT").is_none());
        assert!(DurationValue::parse_iso("P1X").is_none());
    }

    #[test]
    fn test_duration_overflow_is_rejected() {
        assert!(DurationValue::parse_iso("PT1H9223372036854775807S").is_none());
        assert!(DurationValue::parse_iso("P9223372036854775807Y").is_none());
        assert!(DurationValue::parse_iso("P9223372036854775807M1Y").is_none());
        assert!(DurationValue::parse_iso("P1W9223372036854775807D").is_none());
        assert!(DurationValue::parse_iso("-PT-9223372036854775808S").is_none());
        // 边界值本身仍可解析
        let max = DurationValue::parse_iso("PT9223372036854775807S").expect("parse max seconds");
        assert_eq!(max.seconds, i64::MAX);
    }
}
