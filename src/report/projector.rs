//! Projection of the best candidate into report tables.
//!
//! No search logic lives here: every table is a pure function of the
//! session space, the roster and the winning gene vector.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::kpi::CoverageKpi;
use crate::error::EngineError;
use crate::ga::{
    CoverChromosome, EngineOutcome, FitnessBreakdown, Gene, GenerationStats, TerminationReason,
};
use crate::models::{ClassEntity, TeacherEntity};
use crate::space::ScheduleSpace;

/// One session of the final plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAssignment {
    pub class_id: String,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub period: u8,
    /// Regular teacher whose hour is given up.
    pub replaced_teacher: Option<String>,
    /// Covering teacher, `None` if uncovered.
    pub assigned_teacher: Option<String>,
}

impl SessionAssignment {
    /// Whether somebody covers the session.
    pub fn is_covered(&self) -> bool {
        self.assigned_teacher.is_some()
    }
}

/// Assigned versus expected hours of one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherLoad {
    pub teacher_id: String,
    pub assigned_hours: u32,
    /// Configured load, or the fair share `sessions / roster size`.
    pub expected_hours: f64,
    /// `expected_hours - assigned_hours`; negative when over-assigned.
    pub shortfall: f64,
}

/// Hours a class loses from one of its regular teachers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostHours {
    pub class_id: String,
    pub teacher_id: String,
    /// Covered sessions that take this teacher's hour.
    pub lost_hours: u32,
    /// Hours the teacher teaches the class over the open term.
    pub total_hours: u32,
    /// `lost / total * 100`, 0 when `total` is 0.
    pub percentage: f64,
}

impl LostHours {
    /// Percentage with two decimals, e.g. `"33.33"`.
    pub fn percentage_label(&self) -> String {
        format!("{:.2}", self.percentage)
    }
}

/// Complete result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverResult {
    pub assignments: Vec<SessionAssignment>,
    pub teacher_loads: Vec<TeacherLoad>,
    pub lost_hours: Vec<LostHours>,
    pub kpi: CoverageKpi,
    /// Final fitness of the best candidate.
    pub fitness: f64,
    pub breakdown: FitnessBreakdown,
    pub generations_run: usize,
    pub termination: TerminationReason,
    pub history: Vec<GenerationStats>,
}

/// Builds report tables from the best candidate.
pub struct ResultProjector<'a> {
    space: &'a ScheduleSpace,
    classes: &'a [ClassEntity],
    teachers: &'a [TeacherEntity],
}

impl<'a> ResultProjector<'a> {
    pub fn new(
        space: &'a ScheduleSpace,
        classes: &'a [ClassEntity],
        teachers: &'a [TeacherEntity],
    ) -> Self {
        Self {
            space,
            classes,
            teachers,
        }
    }

    /// Session-by-session assignment list, in session order.
    pub fn assignments(&self, best: &CoverChromosome) -> Result<Vec<SessionAssignment>, EngineError> {
        let sessions = self.space.sessions();
        if best.len() != sessions.len() {
            return Err(EngineError::Internal(format!(
                "best candidate has {} genes for {} sessions",
                best.len(),
                sessions.len()
            )));
        }

        sessions
            .iter()
            .zip(&best.genes)
            .map(|(session, gene)| {
                let assigned_teacher = match *gene {
                    Gene::Uncovered => None,
                    Gene::Teacher(t) => Some(
                        self.teachers
                            .get(t)
                            .ok_or_else(|| {
                                EngineError::Internal(format!("unknown roster index {t}"))
                            })?
                            .id
                            .clone(),
                    ),
                };
                Ok(SessionAssignment {
                    class_id: session.class_id.clone(),
                    date: session.slot.date,
                    weekday: session.slot.weekday(),
                    period: session.slot.period,
                    replaced_teacher: session.replaced_teacher.clone(),
                    assigned_teacher,
                })
            })
            .collect()
    }

    /// Per-teacher load table, in roster order.
    pub fn teacher_loads(&self, assignments: &[SessionAssignment]) -> Vec<TeacherLoad> {
        let totals = totals_from_assignments(assignments);
        let fair_share = if self.teachers.is_empty() {
            0.0
        } else {
            assignments.len() as f64 / self.teachers.len() as f64
        };

        self.teachers
            .iter()
            .map(|teacher| {
                let assigned_hours = totals.get(&teacher.id).copied().unwrap_or(0);
                let expected_hours = teacher.expected_hours.map_or(fair_share, f64::from);
                TeacherLoad {
                    teacher_id: teacher.id.clone(),
                    assigned_hours,
                    expected_hours,
                    shortfall: expected_hours - assigned_hours as f64,
                }
            })
            .collect()
    }

    /// Lost-hours table per class and regular teacher, in class order.
    pub fn lost_hours(&self, assignments: &[SessionAssignment]) -> Vec<LostHours> {
        let totals = self.classes.iter().flat_map(|class| {
            self.space
                .regular_teachers(&class.id)
                .into_iter()
                .map(move |(teacher, hours)| (class.id.as_str(), teacher, hours))
        });
        lost_hours_table(totals, assignments)
    }

    /// Builds the complete result of a finished search.
    pub fn project(&self, outcome: EngineOutcome) -> Result<CoverResult, EngineError> {
        let assignments = self.assignments(&outcome.best)?;
        let teacher_loads = self.teacher_loads(&assignments);
        let lost_hours = self.lost_hours(&assignments);
        let kpi = CoverageKpi::calculate(&assignments, &teacher_loads, &lost_hours);

        Ok(CoverResult {
            assignments,
            teacher_loads,
            lost_hours,
            kpi,
            fitness: outcome.breakdown.score,
            breakdown: outcome.breakdown,
            generations_run: outcome.generations_run,
            termination: outcome.termination,
            history: outcome.history,
        })
    }
}

/// Lost-hours rows for `(class, teacher, total_hours)` triples.
///
/// Lost hours count the covered sessions of the class whose replaced
/// teacher is that teacher.
pub fn lost_hours_table<'s>(
    totals: impl IntoIterator<Item = (&'s str, &'s str, u32)>,
    assignments: &[SessionAssignment],
) -> Vec<LostHours> {
    let mut lost: HashMap<(&str, &str), u32> = HashMap::new();
    for a in assignments.iter().filter(|a| a.is_covered()) {
        if let Some(replaced) = a.replaced_teacher.as_deref() {
            *lost.entry((a.class_id.as_str(), replaced)).or_insert(0) += 1;
        }
    }

    totals
        .into_iter()
        .map(|(class_id, teacher_id, total_hours)| {
            let lost_hours = lost.get(&(class_id, teacher_id)).copied().unwrap_or(0);
            let percentage = if total_hours > 0 {
                lost_hours as f64 / total_hours as f64 * 100.0
            } else {
                0.0
            };
            LostHours {
                class_id: class_id.to_string(),
                teacher_id: teacher_id.to_string(),
                lost_hours,
                total_hours,
                percentage,
            }
        })
        .collect()
}

/// Re-derives assigned hours per teacher ID from an assignment list.
pub fn totals_from_assignments(assignments: &[SessionAssignment]) -> BTreeMap<String, u32> {
    let mut totals = BTreeMap::new();
    for teacher in assignments.iter().filter_map(|a| a.assigned_teacher.as_ref()) {
        *totals.entry(teacher.clone()).or_insert(0) += 1;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClosureSet;
    use crate::space::ScheduleSpaceBuilder;

    fn row(class: &str, replaced: &str, covered: bool) -> SessionAssignment {
        SessionAssignment {
            class_id: class.into(),
            date: NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(),
            weekday: Weekday::Mon,
            period: 1,
            replaced_teacher: Some(replaced.into()),
            assigned_teacher: covered.then(|| "COVER".to_string()),
        }
    }

    #[test]
    fn test_lost_hours_half() {
        let stats = lost_hours_table([("1A", "Docente1", 2)], &[row("1A", "Docente1", true)]);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].lost_hours, 1);
        assert_eq!(stats[0].total_hours, 2);
        assert_eq!(stats[0].percentage_label(), "50.00");
    }

    #[test]
    fn test_lost_hours_empty_plan() {
        let stats = lost_hours_table([("1A", "Docente1", 1)], &[]);
        assert_eq!(stats[0].lost_hours, 0);
        assert_eq!(stats[0].percentage_label(), "0.00");
    }

    #[test]
    fn test_lost_hours_all_lost() {
        let stats = lost_hours_table([("1A", "Docente1", 1)], &[row("1A", "Docente1", true)]);
        assert_eq!(stats[0].percentage_label(), "100.00");
    }

    #[test]
    fn test_lost_hours_multiple_classes_and_teachers() {
        let stats = lost_hours_table(
            [("1A", "T1", 2), ("1A", "T2", 1), ("2B", "T3", 1)],
            &[row("1A", "T1", true), row("2B", "T3", true)],
        );
        assert_eq!(stats.len(), 3);
        let find = |c: &str, t: &str| {
            stats
                .iter()
                .find(|s| s.class_id == c && s.teacher_id == t)
                .unwrap()
                .percentage_label()
        };
        assert_eq!(find("1A", "T1"), "50.00");
        assert_eq!(find("1A", "T2"), "0.00");
        assert_eq!(find("2B", "T3"), "100.00");
    }

    #[test]
    fn test_lost_hours_rounding() {
        let stats = lost_hours_table([("1A", "Docente1", 3)], &[row("1A", "Docente1", true)]);
        assert_eq!(stats[0].percentage_label(), "33.33");
    }

    #[test]
    fn test_uncovered_sessions_are_not_lost() {
        let stats = lost_hours_table([("1A", "T1", 2)], &[row("1A", "T1", false)]);
        assert_eq!(stats[0].lost_hours, 0);
    }

    #[test]
    fn test_zero_total_hours() {
        let stats = lost_hours_table([("1A", "T1", 0)], &[]);
        assert_eq!(stats[0].percentage, 0.0);
    }

    fn fixture() -> (ScheduleSpace, Vec<ClassEntity>, Vec<TeacherEntity>) {
        let classes = vec![ClassEntity::new("1A")
            .with_lesson(Weekday::Mon, 1, "ROSSI")
            .with_lesson(Weekday::Wed, 2, "BIANCHI")];
        let space = ScheduleSpaceBuilder::new(
            &classes,
            &ClosureSet::new(),
            NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, 8).unwrap(),
        )
        .with_default_hours(4)
        .build()
        .unwrap();
        let teachers = vec![
            TeacherEntity::new("NERI").with_class("1A"),
            TeacherEntity::new("VERDI").with_class("1A").with_expected_hours(3),
        ];
        (space, classes, teachers)
    }

    #[test]
    fn test_assignments_and_round_trip_totals() {
        let (space, classes, teachers) = fixture();
        let projector = ResultProjector::new(&space, &classes, &teachers);
        let best = CoverChromosome::new(vec![
            Gene::Teacher(0),
            Gene::Teacher(1),
            Gene::Uncovered,
            Gene::Teacher(1),
        ]);

        let rows = projector.assignments(&best).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(!rows[2].is_covered());

        let totals = totals_from_assignments(&rows);
        let hours = best.teacher_hours(teachers.len());
        for (t, teacher) in teachers.iter().enumerate() {
            assert_eq!(totals.get(&teacher.id).copied().unwrap_or(0), hours[t]);
        }
    }

    #[test]
    fn test_teacher_loads() {
        let (space, classes, teachers) = fixture();
        let projector = ResultProjector::new(&space, &classes, &teachers);
        let best = CoverChromosome::new(vec![Gene::Teacher(0); 4]);
        let rows = projector.assignments(&best).unwrap();
        let loads = projector.teacher_loads(&rows);

        // NERI: fair share 4 / 2
        assert_eq!(loads[0].assigned_hours, 4);
        assert!((loads[0].expected_hours - 2.0).abs() < 1e-9);
        assert!((loads[0].shortfall + 2.0).abs() < 1e-9);
        // VERDI: configured 3
        assert_eq!(loads[1].assigned_hours, 0);
        assert!((loads[1].shortfall - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_lost_hours_from_space() {
        let (space, classes, teachers) = fixture();
        let projector = ResultProjector::new(&space, &classes, &teachers);
        let best = CoverChromosome::new(vec![Gene::Teacher(0); 4]);
        let rows = projector.assignments(&best).unwrap();
        let lost = projector.lost_hours(&rows);

        // four Mondays and four Wednesdays in the term
        assert_eq!(lost.len(), 2);
        assert!(lost.iter().all(|l| l.total_hours == 4));
        let total: u32 = lost.iter().map(|l| l.lost_hours).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_length_mismatch_is_internal_error() {
        let (space, classes, teachers) = fixture();
        let projector = ResultProjector::new(&space, &classes, &teachers);
        assert!(matches!(
            projector.assignments(&CoverChromosome::uncovered(1)),
            Err(EngineError::Internal(_))
        ));
    }
}
