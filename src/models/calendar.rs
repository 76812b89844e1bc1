//! Calendar models: teacher availability and school closures.
//!
//! # Precedence
//! Availability is resolved from the most specific entry to the least:
//! - a dated entry for the exact `(date, period)`,
//! - a dated entry covering the whole day,
//! - a weekly entry for `(weekday, period)`,
//! - the teacher's default flag.
//!
//! Dated entries override the weekly pattern, the way blocked periods
//! override working windows.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::TimeSlot;

/// Recurring weekly availability for one teaching period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub weekday: Weekday,
    /// Teaching period (1-based).
    pub period: u8,
    pub available: bool,
}

/// Availability override for a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedAvailability {
    pub date: NaiveDate,
    /// Teaching period (1-based). `None` = the whole day.
    pub period: Option<u8>,
    pub available: bool,
}

/// Availability function `(date, period) -> available?` of one teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    /// Answer when no entry matches.
    pub default_available: bool,
    /// Recurring weekly pattern.
    pub weekly: Vec<WeeklyAvailability>,
    /// Date-specific overrides.
    pub dated: Vec<DatedAvailability>,
}

impl Default for Availability {
    fn default() -> Self {
        Self::always()
    }
}

impl Availability {
    /// Available at every slot unless overridden.
    pub fn always() -> Self {
        Self {
            default_available: true,
            weekly: Vec::new(),
            dated: Vec::new(),
        }
    }

    /// Unavailable at every slot unless overridden.
    pub fn never() -> Self {
        Self {
            default_available: false,
            ..Self::always()
        }
    }

    /// Marks a recurring weekly period as available.
    pub fn with_available(self, weekday: Weekday, period: u8) -> Self {
        self.with_weekly(weekday, period, true)
    }

    /// Marks a recurring weekly period as unavailable.
    pub fn with_unavailable(self, weekday: Weekday, period: u8) -> Self {
        self.with_weekly(weekday, period, false)
    }

    /// Sets a recurring weekly entry.
    pub fn with_weekly(mut self, weekday: Weekday, period: u8, available: bool) -> Self {
        self.weekly.push(WeeklyAvailability {
            weekday,
            period,
            available,
        });
        self
    }

    /// Overrides one period on a given date.
    pub fn with_dated(mut self, date: NaiveDate, period: u8, available: bool) -> Self {
        self.dated.push(DatedAvailability {
            date,
            period: Some(period),
            available,
        });
        self
    }

    /// Overrides a whole day (e.g. leave, training).
    pub fn with_day(mut self, date: NaiveDate, available: bool) -> Self {
        self.dated.push(DatedAvailability {
            date,
            period: None,
            available,
        });
        self
    }

    /// Whether the teacher is available at the given slot.
    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        if let Some(entry) = self
            .dated
            .iter()
            .rev()
            .find(|d| d.date == slot.date && d.period == Some(slot.period))
        {
            return entry.available;
        }

        if let Some(entry) = self
            .dated
            .iter()
            .rev()
            .find(|d| d.date == slot.date && d.period.is_none())
        {
            return entry.available;
        }

        let weekday = slot.date.weekday();
        self.weekly
            .iter()
            .rev()
            .find(|w| w.weekday == weekday && w.period == slot.period)
            .map(|w| w.available)
            .unwrap_or(self.default_available)
    }
}

/// School closure dates. A closed date never yields a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureSet {
    pub dates: BTreeSet<NaiveDate>,
}

impl ClosureSet {
    /// Creates an empty closure set (school always open).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single closed date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.dates.insert(date);
        self
    }

    /// Adds an inclusive range of closed dates (holidays).
    ///
    /// An inverted range adds nothing.
    pub fn with_range(mut self, first: NaiveDate, last: NaiveDate) -> Self {
        self.dates.extend(first.iter_days().take_while(|d| *d <= last));
        self
    }

    /// Whether the school is closed on `date`.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Number of closed dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether no date is closed.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_always_available() {
        let av = Availability::always();
        assert!(av.is_available(&TimeSlot::new(date(2024, 10, 14), 1)));
        assert!(av.is_available(&TimeSlot::new(date(2025, 3, 3), 6)));
    }

    #[test]
    fn test_weekly_pattern() {
        // 2024-10-14 is a Monday
        let av = Availability::never()
            .with_available(Weekday::Mon, 2)
            .with_available(Weekday::Wed, 4);

        assert!(av.is_available(&TimeSlot::new(date(2024, 10, 14), 2)));
        assert!(!av.is_available(&TimeSlot::new(date(2024, 10, 14), 3)));
        assert!(av.is_available(&TimeSlot::new(date(2024, 10, 16), 4)));
        assert!(!av.is_available(&TimeSlot::new(date(2024, 10, 15), 2)));
    }

    #[test]
    fn test_dated_overrides_weekly() {
        let av = Availability::always()
            .with_unavailable(Weekday::Mon, 1)
            .with_dated(date(2024, 10, 14), 1, true)
            .with_day(date(2024, 10, 21), false);

        assert!(av.is_available(&TimeSlot::new(date(2024, 10, 14), 1)));
        assert!(!av.is_available(&TimeSlot::new(date(2024, 10, 28), 1)));
        assert!(!av.is_available(&TimeSlot::new(date(2024, 10, 21), 3)));
    }

    #[test]
    fn test_dated_period_beats_whole_day() {
        let av = Availability::always()
            .with_dated(date(2024, 10, 21), 2, true)
            .with_day(date(2024, 10, 21), false);

        assert!(av.is_available(&TimeSlot::new(date(2024, 10, 21), 2)));
        assert!(!av.is_available(&TimeSlot::new(date(2024, 10, 21), 1)));
    }

    #[test]
    fn test_closure_range_inclusive() {
        let closures = ClosureSet::new().with_range(date(2024, 12, 23), date(2025, 1, 6));
        assert_eq!(closures.len(), 15);
        assert!(closures.contains(date(2024, 12, 23)));
        assert!(closures.contains(date(2025, 1, 6)));
        assert!(!closures.contains(date(2025, 1, 7)));
    }

    #[test]
    fn test_closure_inverted_range_is_empty() {
        let closures = ClosureSet::new().with_range(date(2025, 1, 6), date(2024, 12, 23));
        assert!(closures.is_empty());
    }
}
