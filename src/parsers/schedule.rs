use crate::error::{Result, ScraperError};
use crate::models::{ScheduleTime, Weekday};
use chrono::NaiveTime;

/// Parses a schedule code such as `"3.1330-3 / CTC-CTC108"`:
/// weekday digit, start time as `HHMM`, duration in class hours, then the room.
pub fn parse_schedule(text: &str) -> Result<ScheduleTime> {
    let malformed = |reason: &str| ScraperError::MalformedSchedule(format!("{:?}: {}", text, reason));

    let (code, room) = text
        .trim()
        .split_once(" / ")
        .ok_or_else(|| malformed("missing \" / \" before the room"))?;
    let (weekday, rest) = code
        .split_once('.')
        .ok_or_else(|| malformed("missing \".\" after the weekday"))?;
    let (hhmm, duration) = rest
        .split_once('-')
        .ok_or_else(|| malformed("missing \"-\" before the duration"))?;

    let weekday = match weekday.as_bytes() {
        [d] if d.is_ascii_digit() => Weekday::from_number(d - b'0'),
        _ => None,
    }
    .ok_or_else(|| malformed("weekday must be a digit from 1 to 7"))?;

    if hhmm.len() != 4 || !hhmm.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("start time must be four digits (HHMM)"));
    }
    let hour = hhmm[..2].parse::<u32>().map_err(|_| malformed("bad hour"))?;
    let minute = hhmm[2..].parse::<u32>().map_err(|_| malformed("bad minute"))?;
    let time =
        NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| malformed("start time out of range"))?;

    let duration = duration.trim_end();
    if duration.is_empty() || !duration.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("duration is not a number"));
    }
    let duration = duration
        .parse::<u32>()
        .map_err(|_| malformed("duration is out of range"))?;

    Ok(ScheduleTime {
        weekday,
        time,
        duration,
        room: room.trim().to_string(),
    })
}
