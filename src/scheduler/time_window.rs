use anyhow::bail;
use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

static TIME_OF_DAY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("Time-of-day regex is valid.")
});

/// Parses a `HH:mm` time-of-day string into seconds since local midnight.
pub fn parse_time_of_day(value: &str) -> anyhow::Result<u32> {
    let Some(captures) = TIME_OF_DAY_REGEX.captures(value.trim()) else {
        bail!("Invalid time format: {value}");
    };

    // The regex guarantees two numeric capture groups in range.
    let hours: u32 = captures[1].parse()?;
    let minutes: u32 = captures[2].parse()?;
    Ok(hours * 3600 + minutes * 60)
}

/// Picks a uniformly random target within the inclusive `[start, end]` window,
/// in seconds since local midnight. A window whose end precedes its start wraps
/// past midnight, e.g. `23:50..00:10` may yield a small-hours target.
pub fn random_target_seconds(start_seconds: u32, end_seconds: u32) -> u32 {
    let span = if end_seconds >= start_seconds {
        end_seconds - start_seconds
    } else {
        SECONDS_PER_DAY - start_seconds + end_seconds
    };

    let offset = rand::rng().random_range(0..=span);
    (start_seconds + offset) % SECONDS_PER_DAY
}

/// Resolves a local wall-clock datetime to a UTC instant. A nonexistent time
/// (spring-forward DST gap) is shifted forward by an hour; an ambiguous time
/// (fall-back overlap) resolves to its earlier occurrence.
fn resolve_local(
    time_zone: Tz,
    date: chrono::NaiveDate,
    time: NaiveTime,
) -> Option<DateTime<Utc>> {
    match time_zone.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match time_zone.from_local_datetime(&(date.and_time(time) + Duration::hours(1))) {
            LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => {
                Some(instant.with_timezone(&Utc))
            }
            LocalResult::None => None,
        },
    }
}

/// Projects a seconds-since-midnight target onto the next occurrence in the
/// given timezone that is strictly after `reference`.
pub fn project_target_seconds(
    target_seconds: u32,
    reference: DateTime<Utc>,
    time_zone: Tz,
) -> anyhow::Result<DateTime<Utc>> {
    let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(target_seconds, 0) else {
        bail!("Invalid target time: {target_seconds} seconds since midnight.");
    };

    let local_date = reference.with_timezone(&time_zone).date_naive();
    for days_ahead in 0..3 {
        let date = local_date + Duration::days(days_ahead);
        if let Some(instant) = resolve_local(time_zone, date, time)
            && instant > reference
        {
            return Ok(instant);
        }
    }

    bail!(
        "Unable to project target time ({target_seconds}s) after {reference} in {}.",
        time_zone.name()
    );
}
