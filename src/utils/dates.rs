use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

use crate::error::{AppError, AppResult};

/// Collapse a date or RFC 3339 timestamp to its calendar day. The day is the
/// canonical key for completions and scores; any time-of-day is discarded.
pub fn normalize_day(value: &str) -> AppResult<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(day);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc).date_naive())
        .map_err(|err| AppError::validation(format!("无效的日期格式 '{value}': {err}")))
}

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::validation_with_details(
            format!("结束日期 {end} 早于开始日期 {start}"),
            serde_json::json!({
                "startDate": start.to_string(),
                "endDate": end.to_string(),
            }),
        ));
    }
    Ok(())
}

/// First and last calendar day of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (start, end)
}

/// Ascending walk over every calendar day in `[start, end]`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

pub fn days_in_month(year: i32, month: u32) -> AppResult<i64> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation(format!("无效的年月: {year}-{month}")))?;
    let (_, last) = month_bounds(first);
    Ok((last - first).num_days() + 1)
}
