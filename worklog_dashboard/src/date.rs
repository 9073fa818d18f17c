use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use std::error;
use std::fmt::{Display, Formatter};

/// Format of dates on the wire
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";
/// Format of dates shown to the user, i.e. `Wednesday, January 10, 2024`
pub const DISPLAY_DATE_FORMAT: &str = "%A, %B %-d, %Y";

#[derive(Debug, PartialEq)]
pub enum Error {
    InvalidDate(String),
    InvalidTime(String),
    InvalidTimeZone(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidDate(s) => write!(f, "Invalid date '{s}', expected YYYY-MM-DD"),
            Error::InvalidTime(s) => write!(f, "Invalid time of day '{s}', expected HH:MM"),
            Error::InvalidTimeZone(s) => write!(f, "Unknown time zone '{s}'"),
        }
    }
}

impl error::Error for Error {}

/// The day whose work logs are of interest when nothing else has been said:
/// Friday if `today` is a Monday, otherwise yesterday. Holidays are not considered.
#[must_use]
pub fn previous_working_day(today: NaiveDate) -> NaiveDate {
    let days_back = if today.weekday() == Weekday::Mon { 3 } else { 1 };
    today - Days::new(days_back)
}

/// Previous working day, relative to the current date in the supplied time zone
#[must_use]
pub fn default_worklog_date(tz: Tz) -> NaiveDate {
    previous_working_day(Utc::now().with_timezone(&tz).date_naive())
}

/// Parses a `YYYY-MM-DD` date, nothing else is accepted.
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub fn parse_worklog_date(s: &str) -> Result<NaiveDate, Error> {
    lazy_static! {
        static ref DATE_EXPR: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    let s = s.trim();
    if !DATE_EXPR.is_match(s) {
        return Err(Error::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, WIRE_DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Parses an optional date parameter, where a missing or blank value means
/// the previous working day.
#[allow(clippy::missing_errors_doc)]
pub fn worklog_date_or_default(s: Option<&str>, tz: Tz) -> Result<NaiveDate, Error> {
    match s.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_worklog_date(s),
        None => Ok(default_worklog_date(tz)),
    }
}

#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parses a wall clock time like `09:00`
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, Error> {
    lazy_static! {
        static ref TIME_EXPR: Regex = Regex::new(r"^\d{1,2}:\d{2}$").unwrap();
    }
    let s = s.trim();
    if !TIME_EXPR.is_match(s) {
        return Err(Error::InvalidTime(s.to_string()));
    }
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| Error::InvalidTime(s.to_string()))
}

#[allow(clippy::missing_errors_doc)]
pub fn parse_time_zone(s: &str) -> Result<Tz, Error> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| Error::InvalidTimeZone(s.to_string()))
}

/// Resolves a local date and time into UTC.
/// Ambiguous times resolve to the earliest instant, times inside a DST gap are
/// moved forward by an hour.
fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + chrono::Duration::hours(1))).earliest())
        .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// The instant the supplied date starts in the supplied time zone
#[must_use]
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN), tz)
}

/// Does `instant` fall on `date` in the supplied time zone?
#[must_use]
pub fn is_on_date(instant: DateTime<Utc>, date: NaiveDate, tz: Tz) -> bool {
    instant.with_timezone(&tz).date_naive() == date
}

/// Computes the next point in time, strictly after `from`, at which the wall clock
/// in `tz` shows `at`.
#[must_use]
pub fn next_daily_run(at: NaiveTime, tz: Tz, from: DateTime<Utc>) -> DateTime<Utc> {
    let local_today = from.with_timezone(&tz).date_naive();
    let candidate = local_to_utc(local_today.and_time(at), tz);
    if candidate > from {
        candidate
    } else {
        // Today's window has passed, advance to tomorrow
        let tomorrow = local_today + Days::new(1);
        local_to_utc(tomorrow.and_time(at), tz)
    }
}
