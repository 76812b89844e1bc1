//! Civic-education teacher model.
//!
//! Teachers are the resources assigned to sessions. Each one is eligible
//! for a set of classes and carries an availability calendar.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Availability, TimeSlot};

/// A teacher on the civic-education roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherEntity {
    /// Unique teacher identifier (the name used in timetables).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Classes this teacher may cover.
    pub eligible_classes: BTreeSet<String>,
    /// When the teacher is free to cover.
    pub availability: Availability,
    /// Expected number of covered hours for the term, if agreed.
    pub expected_hours: Option<u32>,
}

impl TeacherEntity {
    /// Creates a teacher with no eligible classes, always available.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            eligible_classes: BTreeSet::new(),
            availability: Availability::always(),
            expected_hours: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an eligible class.
    pub fn with_class(mut self, class_id: impl Into<String>) -> Self {
        self.eligible_classes.insert(class_id.into());
        self
    }

    /// Adds several eligible classes.
    pub fn with_classes<I, S>(mut self, class_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_classes
            .extend(class_ids.into_iter().map(Into::into));
        self
    }

    /// Sets the availability calendar.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Sets the expected covered hours.
    pub fn with_expected_hours(mut self, hours: u32) -> Self {
        self.expected_hours = Some(hours);
        self
    }

    /// Whether this teacher may cover `class_id`.
    #[inline]
    pub fn is_eligible_for(&self, class_id: &str) -> bool {
        self.eligible_classes.contains(class_id)
    }

    /// Whether this teacher is available at `slot`.
    #[inline]
    pub fn is_available_at(&self, slot: &TimeSlot) -> bool {
        self.availability.is_available(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn test_teacher_builder() {
        let t = TeacherEntity::new("ROSSI")
            .with_name("Mario Rossi")
            .with_class("1A")
            .with_classes(["2B", "3C"])
            .with_expected_hours(20);

        assert_eq!(t.id, "ROSSI");
        assert_eq!(t.name, "Mario Rossi");
        assert!(t.is_eligible_for("1A"));
        assert!(t.is_eligible_for("3C"));
        assert!(!t.is_eligible_for("4D"));
        assert_eq!(t.expected_hours, Some(20));
    }

    #[test]
    fn test_teacher_availability_delegates_to_calendar() {
        let monday = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
        let t = TeacherEntity::new("VERDI")
            .with_availability(Availability::never().with_available(Weekday::Mon, 3));

        assert!(t.is_available_at(&TimeSlot::new(monday, 3)));
        assert!(!t.is_available_at(&TimeSlot::new(monday, 4)));
    }
}
