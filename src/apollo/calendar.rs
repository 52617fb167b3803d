use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Working/holiday/leave status of a single day in the user's Apollo shift
/// calendar. Derived from the vendor response, cached only for the lifetime of
/// one batch run.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_working_day: bool,
    pub is_holiday: bool,
    pub has_leave: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_on_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_off_time: Option<String>,
    /// Minutes the user is scheduled to work, net of rest minutes. Only set for
    /// working days with a known shift window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_minutes: Option<u32>,
    /// Total minutes covered by approved leave sheets for this day.
    pub leave_minutes: u32,
}

impl CalendarDay {
    /// Whether approved leave covers the entire scheduled shift. Partial leave
    /// doesn't make a day non-working.
    pub fn is_fully_on_leave(&self) -> bool {
        match self.scheduled_minutes {
            Some(scheduled) if scheduled > 0 => self.leave_minutes >= scheduled,
            _ => false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawCalendarResponse {
    pub data: Option<RawCalendarData>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawCalendarData {
    #[serde(default)]
    pub calendars: Vec<RawCalendarEntry>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawCalendarEntry {
    #[serde(default)]
    pub date: String,
    pub calendar_event: Option<RawCalendarEvent>,
    pub shift_schedule: Option<RawShiftSchedule>,
    #[serde(default)]
    pub employees: Vec<RawEmployee>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawCalendarEvent {
    pub event_status: Option<i64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawShiftSchedule {
    pub cycle_status: Option<i64>,
    pub work_on_time: Option<String>,
    pub work_off_time: Option<String>,
    pub rest_minutes: Option<i64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawEmployee {
    #[serde(default)]
    pub leave_sheets: Vec<RawLeaveSheet>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RawLeaveSheet {
    pub total_hours: Option<f64>,
}

// The calendar endpoint marks company holidays with this event status.
const HOLIDAY_EVENT_STATUS: i64 = 2;
// A shift cycle in this status means the day carries a regular work shift.
const WORKING_CYCLE_STATUS: i64 = 1;

/// Normalizes a vendor shift boundary into `HH:MM`. The portal reports shift
/// boundaries as full timestamps, but older responses carry bare times.
fn normalize_time(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.format("%H:%M").to_string());
    }

    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
        .map(|time| time.format("%H:%M").to_string())
}

fn window_minutes(work_on: &str, work_off: &str) -> Option<u32> {
    let on = NaiveTime::parse_from_str(work_on, "%H:%M").ok()?;
    let off = NaiveTime::parse_from_str(work_off, "%H:%M").ok()?;

    let minutes = (off - on).num_minutes();
    // Overnight shifts wrap past midnight.
    let minutes = if minutes <= 0 { minutes + 24 * 60 } else { minutes };
    u32::try_from(minutes).ok()
}

impl RawCalendarEntry {
    /// Translates a vendor calendar entry into a neutral `CalendarDay`,
    /// discarding entries without a parseable date.
    pub(super) fn into_calendar_day(self) -> Option<CalendarDay> {
        let date_key = self.date.get(0..10)?;
        let date = NaiveDate::parse_from_str(date_key, "%Y-%m-%d").ok()?;

        let is_holiday = self
            .calendar_event
            .as_ref()
            .and_then(|event| event.event_status)
            == Some(HOLIDAY_EVENT_STATUS);

        let shift = self.shift_schedule.as_ref();
        let work_on_time = normalize_time(shift.and_then(|s| s.work_on_time.as_deref()));
        let work_off_time = normalize_time(shift.and_then(|s| s.work_off_time.as_deref()));
        let is_working_day = shift.and_then(|s| s.cycle_status) == Some(WORKING_CYCLE_STATUS)
            && work_on_time.is_some()
            && work_off_time.is_some();

        let scheduled_minutes = if is_working_day {
            match (work_on_time.as_deref(), work_off_time.as_deref()) {
                (Some(on), Some(off)) => window_minutes(on, off).map(|minutes| {
                    let rest = shift
                        .and_then(|s| s.rest_minutes)
                        .and_then(|rest| u32::try_from(rest).ok())
                        .unwrap_or_default();
                    minutes.saturating_sub(rest)
                }),
                _ => None,
            }
        } else {
            None
        };

        let leave_hours = self
            .employees
            .iter()
            .flat_map(|employee| employee.leave_sheets.iter())
            .filter_map(|sheet| sheet.total_hours)
            .filter(|hours| *hours > 0.0)
            .sum::<f64>();
        let leave_minutes = (leave_hours * 60.0).round() as u32;

        Some(CalendarDay {
            date,
            is_working_day,
            is_holiday,
            has_leave: leave_minutes > 0,
            work_on_time,
            work_off_time,
            scheduled_minutes,
            leave_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarDay, RawCalendarResponse};
    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use std::collections::HashMap;

    fn parse_days(json: &str) -> HashMap<NaiveDate, CalendarDay> {
        serde_json::from_str::<RawCalendarResponse>(json)
            .unwrap()
            .data
            .into_iter()
            .flat_map(|data| data.calendars)
            .filter_map(|entry| entry.into_calendar_day())
            .map(|day| (day.date, day))
            .collect()
    }

    #[test]
    fn translates_working_day_with_shift() {
        let days = parse_days(
            r#"{
  "Data": {
    "Calendars": [{
      "Date": "2024-09-02T00:00:00+08:00",
      "ShiftSchedule": {
        "CycleStatus": 1,
        "WorkOnTime": "2024-09-02T08:30:00+08:00",
        "WorkOffTime": "2024-09-02T17:30:00+08:00",
        "RestMinutes": 60
      },
      "Employees": []
    }]
  }
}"#,
        );

        let day = &days[&NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()];
        assert!(day.is_working_day);
        assert!(!day.is_holiday);
        assert!(!day.has_leave);
        assert_eq!(day.work_on_time.as_deref(), Some("08:30"));
        assert_eq!(day.work_off_time.as_deref(), Some("17:30"));
        assert_eq!(day.scheduled_minutes, Some(480));
        assert!(!day.is_fully_on_leave());
    }

    #[test]
    fn translates_holiday_and_day_off() {
        let days = parse_days(
            r#"{
  "Data": {
    "Calendars": [
      {
        "Date": "2024-09-07T00:00:00+08:00",
        "CalendarEvent": { "EventStatus": 2 },
        "ShiftSchedule": { "CycleStatus": 2 }
      },
      {
        "Date": "2024-09-08T00:00:00+08:00",
        "ShiftSchedule": { "CycleStatus": 1 }
      }
    ]
  }
}"#,
        );

        let holiday = &days[&NaiveDate::from_ymd_opt(2024, 9, 7).unwrap()];
        assert!(holiday.is_holiday);
        assert!(!holiday.is_working_day);

        // A working cycle without shift boundaries is not a working day.
        let day_off = &days[&NaiveDate::from_ymd_opt(2024, 9, 8).unwrap()];
        assert!(!day_off.is_holiday);
        assert!(!day_off.is_working_day);
        assert!(day_off.scheduled_minutes.is_none());
    }

    #[test]
    fn detects_full_day_leave() {
        let days = parse_days(
            r#"{
  "Data": {
    "Calendars": [
      {
        "Date": "2024-09-03T00:00:00+08:00",
        "ShiftSchedule": {
          "CycleStatus": 1,
          "WorkOnTime": "08:30",
          "WorkOffTime": "17:30",
          "RestMinutes": 60
        },
        "Employees": [{ "LeaveSheets": [{ "TotalHours": 8 }] }]
      },
      {
        "Date": "2024-09-04T00:00:00+08:00",
        "ShiftSchedule": {
          "CycleStatus": 1,
          "WorkOnTime": "08:30",
          "WorkOffTime": "17:30",
          "RestMinutes": 60
        },
        "Employees": [{ "LeaveSheets": [{ "TotalHours": 2 }, { "TotalHours": 1.5 }] }]
      }
    ]
  }
}"#,
        );

        let full = &days[&NaiveDate::from_ymd_opt(2024, 9, 3).unwrap()];
        assert!(full.has_leave);
        assert_eq!(full.leave_minutes, 480);
        assert!(full.is_fully_on_leave());

        let partial = &days[&NaiveDate::from_ymd_opt(2024, 9, 4).unwrap()];
        assert!(partial.has_leave);
        assert_eq!(partial.leave_minutes, 210);
        assert!(!partial.is_fully_on_leave());
    }

    #[test]
    fn skips_entries_without_date() {
        let days = parse_days(r#"{ "Data": { "Calendars": [{ "Date": "" }, {}] } }"#);
        assert!(days.is_empty());
    }

    #[test]
    fn serialization() {
        let day = CalendarDay {
            date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
            is_working_day: true,
            is_holiday: false,
            has_leave: false,
            work_on_time: Some("08:30".to_string()),
            work_off_time: Some("17:30".to_string()),
            scheduled_minutes: Some(480),
            leave_minutes: 0,
        };

        assert_snapshot!(
            serde_json::to_string(&day).unwrap(),
            @r###"{"date":"2024-09-02","isWorkingDay":true,"isHoliday":false,"hasLeave":false,"workOnTime":"08:30","workOffTime":"17:30","scheduledMinutes":480,"leaveMinutes":0}"###
        );
    }
}
