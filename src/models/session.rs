//! Time slots and sessions.
//!
//! A [`Session`] is one required hour of civic-education coverage for a
//! class at a concrete [`TimeSlot`]. Sessions are derived once per run by
//! the session space builder and then shared read-only.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A concrete teaching period on a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    /// Teaching period (1-based).
    pub period: u8,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub fn new(date: NaiveDate, period: u8) -> Self {
        Self { date, period }
    }

    /// Day of the week of this slot.
    #[inline]
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// ISO `(year, week)` of this slot.
    #[inline]
    pub fn iso_week(&self) -> (i32, u32) {
        let week = self.date.iso_week();
        (week.year(), week.week())
    }
}

/// One required hour of coverage: `(class, date, period)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Position in the session list (= gene index).
    pub index: usize,
    /// Class receiving the hour.
    pub class_id: String,
    /// When the hour takes place.
    pub slot: TimeSlot,
    /// Regular teacher whose hour is given up. `None` if the timetable
    /// does not name one.
    pub replaced_teacher: Option<String>,
}

impl Session {
    /// Creates a session.
    pub fn new(
        index: usize,
        class_id: impl Into<String>,
        slot: TimeSlot,
        replaced_teacher: Option<String>,
    ) -> Self {
        Self {
            index,
            class_id: class_id.into(),
            slot,
            replaced_teacher,
        }
    }

    /// Whether `teacher_id` is the regular teacher of this hour.
    pub fn replaces(&self, teacher_id: &str) -> bool {
        self.replaced_teacher.as_deref() == Some(teacher_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_ordering_is_chronological() {
        let d1 = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        let mut slots = vec![TimeSlot::new(d2, 1), TimeSlot::new(d1, 3), TimeSlot::new(d1, 1)];
        slots.sort();
        assert_eq!(
            slots,
            vec![TimeSlot::new(d1, 1), TimeSlot::new(d1, 3), TimeSlot::new(d2, 1)]
        );
    }

    #[test]
    fn test_iso_week_crosses_year() {
        // 2024-12-30 belongs to ISO week 1 of 2025
        let slot = TimeSlot::new(NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(), 1);
        assert_eq!(slot.iso_week(), (2025, 1));
        assert_eq!(slot.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_replaces() {
        let slot = TimeSlot::new(NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(), 2);
        let s = Session::new(0, "1A", slot, Some("ROSSI".into()));
        assert!(s.replaces("ROSSI"));
        assert!(!s.replaces("BIANCHI"));
        assert!(!Session::new(1, "1A", slot, None).replaces("ROSSI"));
    }
}
