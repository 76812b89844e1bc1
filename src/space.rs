//! Session space construction.
//!
//! Derives the fixed, ordered list of [`Session`]s (one per required hour
//! of coverage) from class timetables, the term and school closures.
//!
//! # Selection policy
//!
//! Sundays and closures are never school days. Candidate slots of a class
//! are grouped by ISO week. Selection runs in passes over the weeks that
//! still have an unused slot:
//! - a pass takes `min(remaining, open_weeks)` weeks at evenly spaced,
//!   centered positions, so hours spread over the whole term;
//! - a week first picked as the class's `k`-th pick starts at timetable
//!   entry `k % slots_in_week` and moves one entry forward on each later
//!   pick, so consecutive picks rotate through the weekly timetable.
//!
//! The result is deterministic for identical inputs. Sessions are listed
//! class by class (input order), chronologically within a class.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, info};

use crate::config::CoverParams;
use crate::error::ConfigError;
use crate::models::{ClassEntity, ClosureSet, CoverInputs, Session, TimeSlot};

/// The immutable session list of a run, plus per-class teaching totals.
#[derive(Debug, Clone)]
pub struct ScheduleSpace {
    sessions: Vec<Session>,
    taught_hours: BTreeMap<(String, String), u32>,
}

impl ScheduleSpace {
    /// All sessions, in gene order.
    #[inline]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of sessions (= chromosome length).
    #[inline]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is required.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Hours `teacher_id` teaches `class_id` over the open days of the term.
    pub fn taught_hours(&self, class_id: &str, teacher_id: &str) -> u32 {
        self.taught_hours
            .get(&(class_id.to_string(), teacher_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Regular teachers of `class_id` with their term totals, sorted by ID.
    pub fn regular_teachers(&self, class_id: &str) -> Vec<(&str, u32)> {
        self.taught_hours
            .iter()
            .filter(|((c, _), _)| c == class_id)
            .map(|((_, t), &h)| (t.as_str(), h))
            .collect()
    }
}

/// Builds a [`ScheduleSpace`].
///
/// # Example
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use u_civics::models::{ClassEntity, ClosureSet};
/// use u_civics::space::ScheduleSpaceBuilder;
///
/// let classes = vec![ClassEntity::new("1A").with_lesson(Weekday::Mon, 1, "ROSSI")];
/// let closures = ClosureSet::new();
/// let space = ScheduleSpaceBuilder::new(
///     &classes,
///     &closures,
///     NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 10, 27).unwrap(),
/// )
/// .with_default_hours(2)
/// .build()
/// .unwrap();
///
/// assert_eq!(space.len(), 2);
/// ```
pub struct ScheduleSpaceBuilder<'a> {
    classes: &'a [ClassEntity],
    closures: &'a ClosureSet,
    start: NaiveDate,
    end: NaiveDate,
    default_hours: u32,
}

impl<'a> ScheduleSpaceBuilder<'a> {
    /// Creates a builder over the inclusive term `[start, end]`.
    pub fn new(
        classes: &'a [ClassEntity],
        closures: &'a ClosureSet,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            classes,
            closures,
            start,
            end,
            default_hours: 1,
        }
    }

    /// Creates a builder from run inputs and parameters.
    pub fn from_params(inputs: &'a CoverInputs, params: &CoverParams) -> Self {
        Self::new(
            &inputs.classes,
            &inputs.closures,
            params.start_date,
            params.end_date,
        )
        .with_default_hours(params.hours_per_class)
    }

    /// Sets the hours required from classes without their own quota.
    pub fn with_default_hours(mut self, hours: u32) -> Self {
        self.default_hours = hours;
        self
    }

    /// Builds the session list.
    ///
    /// # Errors
    /// [`ConfigError::InsufficientSlots`] if a class has fewer open
    /// timetable slots in the term than hours required.
    pub fn build(&self) -> Result<ScheduleSpace, ConfigError> {
        let open_days: Vec<NaiveDate> = self
            .start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .filter(|d| d.weekday() != Weekday::Sun && !self.closures.contains(*d))
            .collect();

        let mut sessions = Vec::new();
        let mut taught_hours: BTreeMap<(String, String), u32> = BTreeMap::new();

        for class in self.classes {
            let weeks = candidate_weeks(class, &open_days);

            for (_, teacher) in weeks.iter().flatten() {
                if let Some(teacher) = teacher {
                    *taught_hours
                        .entry((class.id.clone(), teacher.to_string()))
                        .or_insert(0) += 1;
                }
            }

            let required = class.required_hours_or(self.default_hours);
            let available: usize = weeks.iter().map(Vec::len).sum();
            if available < required as usize {
                return Err(ConfigError::InsufficientSlots {
                    class_id: class.id.clone(),
                    required,
                    available,
                    start: self.start,
                    end: self.end,
                });
            }

            let sizes: Vec<usize> = weeks.iter().map(Vec::len).collect();
            let mut picked: Vec<(TimeSlot, Option<&str>)> =
                spread_picks(&sizes, required as usize)
                    .into_iter()
                    .map(|(w, s)| weeks[w][s])
                    .collect();
            picked.sort_by_key(|(slot, _)| *slot);

            debug!(
                class = %class.id,
                required,
                available,
                weeks = weeks.len(),
                "sessions selected"
            );

            for (slot, teacher) in picked {
                let index = sessions.len();
                sessions.push(Session::new(
                    index,
                    class.id.clone(),
                    slot,
                    teacher.map(str::to_string),
                ));
            }
        }

        info!(
            event = "space_built",
            classes = self.classes.len(),
            open_days = open_days.len(),
            sessions = sessions.len()
        );

        Ok(ScheduleSpace {
            sessions,
            taught_hours,
        })
    }
}

/// Candidate slots of `class` on the open days, grouped by ISO week.
fn candidate_weeks<'c>(
    class: &'c ClassEntity,
    open_days: &[NaiveDate],
) -> Vec<Vec<(TimeSlot, Option<&'c str>)>> {
    let mut weeks: Vec<Vec<(TimeSlot, Option<&str>)>> = Vec::new();
    let mut current_week = None;

    for &day in open_days {
        let entries = class.slots_on(day.weekday());
        if entries.is_empty() {
            continue;
        }
        let slot_week = TimeSlot::new(day, 1).iso_week();
        if current_week != Some(slot_week) {
            weeks.push(Vec::new());
            current_week = Some(slot_week);
        }
        if let Some(week) = weeks.last_mut() {
            week.extend(
                entries
                    .into_iter()
                    .map(|e| (TimeSlot::new(day, e.period), e.teacher.as_deref())),
            );
        }
    }

    weeks
}

/// Picks `required` `(week, slot)` positions from weeks of the given sizes.
///
/// Caller guarantees `sizes.iter().sum() >= required`.
fn spread_picks(sizes: &[usize], required: usize) -> Vec<(usize, usize)> {
    let mut picks = Vec::with_capacity(required);
    let mut used = vec![0usize; sizes.len()];
    let mut offset = vec![0usize; sizes.len()];

    while picks.len() < required {
        let open: Vec<usize> = (0..sizes.len()).filter(|&w| used[w] < sizes[w]).collect();
        if open.is_empty() {
            break;
        }
        let take = (required - picks.len()).min(open.len());
        for i in 0..take {
            let week = open[(2 * i + 1) * open.len() / (2 * take)];
            if used[week] == 0 {
                offset[week] = picks.len();
            }
            picks.push((week, (offset[week] + used[week]) % sizes[week]));
            used[week] += 1;
        }
    }

    picks
}
