use std::{cell::Cell, rc::Rc, str::FromStr};

use chrono::{
    DateTime, Datelike, Days, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::CalendarError;

const DATE_FORMAT: &str = "%d/%m/%Y - %H:%M";

/// Source of the current instant.
///
/// Filters never cache "now": the store asks the clock on every recompute so
/// that a long-running session follows the wall clock across midnight.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// The zone in which calendar days and months are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Calendar {
    /// The host's local zone.
    #[default]
    Local,
    Zone(Tz),
}

impl FromStr for Calendar {
    type Err = CalendarError;

    /// An empty name (or `local`) selects the host zone; anything else must be
    /// an IANA name.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        name.parse::<Tz>()
            .map(Self::Zone)
            .map_err(|_| CalendarError::UnknownTimezone(name.to_string()))
    }
}

impl Calendar {
    /// Calendar date of `now` in this zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => now.with_timezone(&Local).date_naive(),
            Self::Zone(tz) => now.with_timezone(tz).date_naive(),
        }
    }

    /// Local midnight of the day containing `now`.
    pub fn start_of_today(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of_day(self.today(now))
    }

    /// Local midnight `days` calendar days before today.
    pub fn start_of_days_ago(&self, now: DateTime<Utc>, days: u64) -> DateTime<Utc> {
        let today = self.today(now);
        let day = today.checked_sub_days(Days::new(days)).unwrap_or(today);
        self.start_of_day(day)
    }

    pub fn start_of_day(&self, day: NaiveDate) -> DateTime<Utc> {
        match self {
            Self::Local => local_midnight(&Local, day),
            Self::Zone(tz) => local_midnight(tz, day),
        }
    }

    /// Calendar month (1-12) of an epoch-millisecond timestamp in this zone.
    pub fn month_of(&self, millis: i64) -> Option<u32> {
        let instant = DateTime::<Utc>::from_timestamp_millis(millis)?;
        let month = match self {
            Self::Local => instant.with_timezone(&Local).month(),
            Self::Zone(tz) => instant.with_timezone(tz).month(),
        };
        Some(month)
    }

    /// Formats a timestamp as `dd/mm/yyyy - hh:mm`. Out-of-range values render
    /// as an empty string.
    pub fn format_millis(&self, millis: i64) -> String {
        let Some(instant) = DateTime::<Utc>::from_timestamp_millis(millis) else {
            return String::new();
        };
        match self {
            Self::Local => instant.with_timezone(&Local).format(DATE_FORMAT).to_string(),
            Self::Zone(tz) => instant.with_timezone(tz).format(DATE_FORMAT).to_string(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Local => "local".to_string(),
            Self::Zone(tz) => tz.name().to_string(),
        }
    }
}

/// First instant of `day` in `tz`. When midnight falls into a DST gap the
/// first valid local minute after it is used.
fn local_midnight<Z: TimeZone>(tz: &Z, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=180)
        .find_map(|minutes| {
            tz.from_local_datetime(&(midnight + TimeDelta::minutes(minutes)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
