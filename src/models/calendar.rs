//! Work calendars.
//!
//! Defines worker availability on a per-day basis: the weekly set of
//! working days, public holidays shared by an organization, and personal
//! holidays of a single worker.
//!
//! # Time Model
//! All times are calendar dates (`chrono::NaiveDate`). A task occupies whole
//! work-dates; there is no intra-day resolution.
//!
//! # Precedence
//! Holidays override the work week. A date is a work-date iff:
//! - Its weekday is in the worker's `WorkWeek`, AND
//! - It is neither a public holiday nor a personal holiday.

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::error::{ForecastError, ForecastResult};

/// The set of weekdays on which a worker works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWeek {
    // bit i set = Weekday with num_days_from_monday() == i
    mask: u8,
}

impl WorkWeek {
    /// Monday through Friday.
    pub fn standard() -> Self {
        Self::from_days(&[
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ])
    }

    /// Builds a work week from explicit weekdays.
    pub fn from_days(days: &[Weekday]) -> Self {
        let mask = days
            .iter()
            .fold(0u8, |m, d| m | (1 << d.num_days_from_monday()));
        Self { mask }
    }

    /// Parses workday identifiers such as `["Mon", "wednesday", "FRI"]`.
    ///
    /// Identifiers are matched case-insensitively on their first three
    /// letters. An empty list yields the standard Monday–Friday week.
    pub fn parse<S: AsRef<str>>(worker: &str, identifiers: &[S]) -> ForecastResult<Self> {
        if identifiers.is_empty() {
            return Ok(Self::standard());
        }
        let mut days = Vec::with_capacity(identifiers.len());
        for raw in identifiers {
            let raw = raw.as_ref();
            days.push(parse_weekday(raw).ok_or_else(|| ForecastError::InvalidWorkday {
                worker: worker.to_string(),
                value: raw.to_string(),
            })?);
        }
        Ok(Self::from_days(&days))
    }

    /// Whether the given weekday is a working day.
    #[inline]
    pub fn contains(&self, day: Weekday) -> bool {
        self.mask & (1 << day.num_days_from_monday()) != 0
    }

    /// Whether no day of the week is a working day.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }
}

impl Default for WorkWeek {
    fn default() -> Self {
        Self::standard()
    }
}

fn parse_weekday(raw: &str) -> Option<Weekday> {
    let normalized: String = raw.trim().chars().take(3).collect::<String>().to_lowercase();
    match normalized.as_str() {
        "sun" => Some(Weekday::Sun),
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        _ => None,
    }
}

/// A holiday recurring on the same month/day every year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnualHoliday {
    /// Holiday name.
    pub name: String,
    /// Month (1-12).
    pub month: u32,
    /// Day of month (1-31).
    pub day: u32,
}

impl AnnualHoliday {
    /// Whether the month/day exists in at least a leap year.
    pub fn is_valid(&self) -> bool {
        NaiveDate::from_ymd_opt(2000, self.month, self.day).is_some()
    }

    #[inline]
    fn matches(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.day() == self.day
    }
}

/// Organization-wide public holidays.
///
/// Combines explicit one-off dates with annually recurring rules.
/// An empty calendar has no holidays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayCalendar {
    /// Calendar identifier.
    pub name: String,
    /// One-off holiday dates.
    pub dates: BTreeSet<NaiveDate>,
    /// Holidays recurring every year.
    pub annual: Vec<AnnualHoliday>,
}

impl HolidayCalendar {
    /// Creates an empty calendar.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a one-off holiday.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.dates.insert(date);
        self
    }

    /// Adds several one-off holidays.
    pub fn with_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.dates.extend(dates);
        self
    }

    /// Adds a holiday recurring every year on `month`/`day`.
    pub fn with_annual(mut self, name: impl Into<String>, month: u32, day: u32) -> Self {
        self.annual.push(AnnualHoliday {
            name: name.into(),
            month,
            day,
        });
        self
    }

    /// Rejects annual rules that can never match a date.
    pub fn validate(&self) -> ForecastResult<()> {
        match self.annual.iter().find(|h| !h.is_valid()) {
            Some(h) => Err(ForecastError::InvalidHoliday {
                name: h.name.clone(),
                month: h.month,
                day: h.day,
            }),
            None => Ok(()),
        }
    }

    /// Whether the date is a public holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date) || self.annual.iter().any(|h| h.matches(date))
    }
}

/// Forward-only generator of one worker's work-dates.
///
/// Produces, lazily and without end, the dates on which the worker is
/// available. Once a date is produced it is never produced again; the
/// generator cannot be rewound.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_forecast::models::WorkDateIter;
///
/// let monday = NaiveDate::from_ymd_opt(2019, 6, 3).unwrap();
/// let mut dates = WorkDateIter::standard("dev", monday);
/// let week: Vec<_> = dates.by_ref().take(6).collect();
/// assert_eq!(week[5], NaiveDate::from_ymd_opt(2019, 6, 10).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct WorkDateIter {
    worker: String,
    holidays: Arc<HolidayCalendar>,
    personal: HashSet<NaiveDate>,
    week: WorkWeek,
    current: NaiveDate,
}

impl WorkDateIter {
    /// Creates a generator for `worker`.
    ///
    /// `workdays` of `None` (or an empty list) means Monday–Friday.
    /// `start` of `None` means today (UTC). The first produced date is
    /// `start` itself if it qualifies.
    pub fn new<S: AsRef<str>>(
        worker: impl Into<String>,
        holidays: Arc<HolidayCalendar>,
        personal: impl IntoIterator<Item = NaiveDate>,
        workdays: Option<&[S]>,
        start: Option<NaiveDate>,
    ) -> ForecastResult<Self> {
        let worker = worker.into();
        let week = match workdays {
            Some(ids) => WorkWeek::parse(&worker, ids)?,
            None => WorkWeek::standard(),
        };
        let start = start.unwrap_or_else(|| Utc::now().date_naive());
        Ok(Self::with_week(worker, holidays, personal, week, start))
    }

    /// Creates a generator from an already parsed work week.
    pub fn with_week(
        worker: impl Into<String>,
        holidays: Arc<HolidayCalendar>,
        personal: impl IntoIterator<Item = NaiveDate>,
        week: WorkWeek,
        start: NaiveDate,
    ) -> Self {
        Self {
            worker: worker.into(),
            holidays,
            personal: personal.into_iter().collect(),
            // `current` is the last produced date; nothing produced yet.
            current: start.pred_opt().unwrap_or(start),
            week: if week.is_empty() { WorkWeek::standard() } else { week },
        }
    }

    /// Monday–Friday generator without holidays.
    pub fn standard(worker: impl Into<String>, start: NaiveDate) -> Self {
        Self::with_week(
            worker,
            Arc::new(HolidayCalendar::default()),
            std::iter::empty(),
            WorkWeek::standard(),
            start,
        )
    }

    /// Worker identifier.
    pub fn worker(&self) -> &str {
        &self.worker
    }

    /// The last produced date (the day before start if none produced yet).
    #[inline]
    pub fn current(&self) -> NaiveDate {
        self.current
    }

    /// Whether the worker works on `date`.
    pub fn is_work_date(&self, date: NaiveDate) -> bool {
        self.week.contains(date.weekday())
            && !self.personal.contains(&date)
            && !self.holidays.is_holiday(date)
    }

    /// Advances to and returns the next work-date.
    ///
    /// Returns `None` only when chrono's date range is exhausted.
    pub fn next_work_date(&mut self) -> Option<NaiveDate> {
        let mut candidate = self.current.succ_opt()?;
        while !self.is_work_date(candidate) {
            candidate = candidate.succ_opt()?;
        }
        self.current = candidate;
        Some(candidate)
    }

    /// Like [`next_work_date`](Self::next_work_date), as a scheduling error.
    pub fn advance(&mut self) -> ForecastResult<NaiveDate> {
        let last = self.current;
        self.next_work_date()
            .ok_or_else(|| ForecastError::CalendarExhausted {
                worker: self.worker.clone(),
                last,
            })
    }
}

impl Iterator for WorkDateIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        self.next_work_date()
    }
}
