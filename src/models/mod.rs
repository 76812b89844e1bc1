//! Civic-education cover domain models.
//!
//! Plain data describing the planning problem and its inputs. No search
//! logic lives here.
//!
//! | Model | Meaning |
//! |-------|---------|
//! | `ClassEntity` | A class with its weekly timetable and hour quota |
//! | `TeacherEntity` | A roster teacher with eligible classes and availability |
//! | `ClosureSet` | Dates on which the school is closed |
//! | `Session` | One required hour for a class at a `TimeSlot` |

mod calendar;
mod class;
mod session;
mod teacher;

pub use calendar::{Availability, ClosureSet, DatedAvailability, WeeklyAvailability};
pub use class::{ClassEntity, WeeklySlot};
pub use session::{Session, TimeSlot};
pub use teacher::TeacherEntity;

use serde::{Deserialize, Serialize};

/// The input datasets of one planning run.
///
/// Teacher availability travels inside each [`TeacherEntity`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverInputs {
    /// Class timetables.
    pub classes: Vec<ClassEntity>,
    /// Civic-education roster.
    pub teachers: Vec<TeacherEntity>,
    /// School closures.
    #[serde(default)]
    pub closures: ClosureSet,
}

impl CoverInputs {
    /// Creates empty inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class.
    pub fn with_class(mut self, class: ClassEntity) -> Self {
        self.classes.push(class);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: TeacherEntity) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Sets the closures.
    pub fn with_closures(mut self, closures: ClosureSet) -> Self {
        self.closures = closures;
        self
    }
}
