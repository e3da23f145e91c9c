//! Holiday calendar and per-day properties.
//!
//! The public-holiday calendar is an external collaborator: the engine
//! asks it for the holiday name of a date and nothing else. It is passed
//! into each generation run explicitly, so runs stay reproducible.
//!
//! # In-lieu observance
//! A holiday falling on a non-working day is observed on a later working
//! day. The observed day is flagged `is_in_lieu` and counts as a holiday
//! for every rule that looks at holidays. Observance is resolved when the
//! calendar is built, before any constraint sees the day.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Number of days before the roster start scanned for holidays whose
/// observance spills into the window.
const LOOKBACK_DAYS: i64 = 7;

/// Source of public holidays for one jurisdiction.
pub trait HolidayCalendar: Send + Sync {
    /// Jurisdiction code (e.g., "SG").
    fn jurisdiction(&self) -> &str;

    /// Holiday name for a date, or `None` on ordinary days.
    fn holiday_name(&self, date: NaiveDate) -> Option<String>;

    /// Whether the date is a public holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}

/// In-memory holiday table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidayTable {
    /// Jurisdiction code.
    pub jurisdiction: String,
    holidays: BTreeMap<NaiveDate, String>,
}

impl HolidayTable {
    /// Creates an empty table for a jurisdiction.
    pub fn new(jurisdiction: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            holidays: BTreeMap::new(),
        }
    }

    /// Adds a holiday.
    pub fn with_holiday(mut self, date: NaiveDate, name: impl Into<String>) -> Self {
        self.insert(date, name);
        self
    }

    /// Adds or replaces a holiday.
    pub fn insert(&mut self, date: NaiveDate, name: impl Into<String>) {
        self.holidays.insert(date, name.into());
    }

    /// Number of holidays in the table.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

impl HolidayCalendar for HolidayTable {
    fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        self.holidays.get(&date).cloned()
    }
}

/// Calendar without any holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn jurisdiction(&self) -> &str {
        ""
    }

    fn holiday_name(&self, _date: NaiveDate) -> Option<String> {
        None
    }
}

/// Where a holiday on a non-working day is observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InLieuPolicy {
    /// Sunday holidays are observed on the following Monday.
    #[default]
    SundayToMonday,
    /// Saturday and Sunday holidays are observed on the next weekday
    /// that is not itself a holiday.
    NextWorkingDay,
}

/// Derived properties of one roster day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayInfo {
    /// Calendar date.
    pub date: NaiveDate,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Public holiday, actual or observed in lieu.
    pub is_holiday: bool,
    /// Holiday name (empty on ordinary days).
    pub holiday_name: String,
    /// Holiday observed here in place of a non-working day.
    pub is_in_lieu: bool,
}

impl DayInfo {
    /// An ordinary day with only the weekend flag derived.
    pub fn plain(date: NaiveDate) -> Self {
        Self {
            date,
            is_weekend: is_weekend(date),
            is_holiday: false,
            holiday_name: String::new(),
            is_in_lieu: false,
        }
    }
}

/// Whether a date falls on Saturday or Sunday.
#[inline]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Day-by-day calendar for a roster window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterCalendar {
    days: Vec<DayInfo>,
}

impl RosterCalendar {
    /// Builds the calendar for the inclusive window `[start, end]`.
    ///
    /// Returns an empty calendar when `end < start`.
    pub fn build(
        calendar: &dyn HolidayCalendar,
        start: NaiveDate,
        end: NaiveDate,
        policy: InLieuPolicy,
    ) -> Self {
        let mut days: Vec<DayInfo> = date_range(start, end)
            .into_iter()
            .map(|date| {
                let mut info = DayInfo::plain(date);
                if let Some(name) = calendar.holiday_name(date) {
                    info.is_holiday = true;
                    info.holiday_name = name;
                }
                info
            })
            .collect();

        match policy {
            InLieuPolicy::SundayToMonday => {
                for day in &mut days {
                    if day.date.weekday() != Weekday::Mon {
                        continue;
                    }
                    let sunday = day.date.pred_opt();
                    if let Some(name) = sunday.and_then(|prev| calendar.holiday_name(prev)) {
                        day.is_holiday = true;
                        day.is_in_lieu = true;
                        day.holiday_name = format!("{name} (In Lieu)");
                    }
                }
            }
            InLieuPolicy::NextWorkingDay => {
                let mut taken: HashSet<NaiveDate> = HashSet::new();
                let scan_from = start
                    .checked_sub_signed(Duration::days(LOOKBACK_DAYS))
                    .unwrap_or(NaiveDate::MIN);
                for date in date_range(scan_from, end) {
                    if !is_weekend(date) {
                        continue;
                    }
                    let Some(name) = calendar.holiday_name(date) else {
                        continue;
                    };
                    let mut next = date.succ_opt();
                    while let Some(candidate) = next {
                        if !is_weekend(candidate)
                            && !calendar.is_holiday(candidate)
                            && !taken.contains(&candidate)
                        {
                            break;
                        }
                        next = candidate.succ_opt();
                    }
                    // Observance past the last representable date is dropped
                    let Some(observed) = next else {
                        continue;
                    };
                    taken.insert(observed);
                    if let Some(day) = days.iter_mut().find(|d| d.date == observed) {
                        day.is_holiday = true;
                        day.is_in_lieu = true;
                        day.holiday_name = format!("{name} (In Lieu)");
                    }
                }
            }
        }

        Self { days }
    }

    /// Calendar of plain days (no holidays).
    pub fn plain(start: NaiveDate, end: NaiveDate) -> Self {
        Self::build(&NoHolidays, start, end, InLieuPolicy::default())
    }

    /// All days, in date order.
    pub fn days(&self) -> &[DayInfo] {
        &self.days
    }

    /// Consumes the calendar, returning its days.
    pub fn into_days(self) -> Vec<DayInfo> {
        self.days
    }

    /// Number of days in the window.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Every date in `[start, end]`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}
