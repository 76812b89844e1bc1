//! Class model.
//!
//! A class has a recurring weekly timetable. Each timetable entry may name
//! the regular teacher of that hour: when a civic-education session is
//! placed there, that teacher "loses" the hour.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// One recurring entry of a weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub weekday: Weekday,
    /// Teaching period (1-based).
    pub period: u8,
    /// Regular teacher of this hour.
    pub teacher: Option<String>,
}

/// A class (form) that must receive civic-education hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntity {
    /// Unique class identifier (e.g. "1A").
    pub id: String,
    /// Recurring weekly timetable.
    pub timetable: Vec<WeeklySlot>,
    /// Required hours for the term. `None` = the run-wide default.
    pub required_hours: Option<u32>,
}

impl ClassEntity {
    /// Creates a class with an empty timetable.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timetable: Vec::new(),
            required_hours: None,
        }
    }

    /// Adds a timetable hour taught by `teacher`.
    pub fn with_lesson(mut self, weekday: Weekday, period: u8, teacher: impl Into<String>) -> Self {
        self.timetable.push(WeeklySlot {
            weekday,
            period,
            teacher: Some(teacher.into()),
        });
        self
    }

    /// Adds a timetable hour with no named teacher.
    pub fn with_slot(mut self, weekday: Weekday, period: u8) -> Self {
        self.timetable.push(WeeklySlot {
            weekday,
            period,
            teacher: None,
        });
        self
    }

    /// Overrides the required hours for this class.
    pub fn with_required_hours(mut self, hours: u32) -> Self {
        self.required_hours = Some(hours);
        self
    }

    /// Required hours, falling back to `default_hours`.
    #[inline]
    pub fn required_hours_or(&self, default_hours: u32) -> u32 {
        self.required_hours.unwrap_or(default_hours)
    }

    /// Timetable entries held on `weekday`, in period order.
    pub fn slots_on(&self, weekday: Weekday) -> Vec<&WeeklySlot> {
        let mut slots: Vec<&WeeklySlot> = self
            .timetable
            .iter()
            .filter(|s| s.weekday == weekday)
            .collect();
        slots.sort_by_key(|s| s.period);
        slots
    }

    /// Whether `teacher_id` teaches this class in any timetable hour.
    pub fn is_taught_by(&self, teacher_id: &str) -> bool {
        self.timetable
            .iter()
            .any(|s| s.teacher.as_deref() == Some(teacher_id))
    }
}
