//! Run facade.
//!
//! [`CoverSolver`] owns the inputs and parameters of one run. It checks
//! them up front, then [`CoverSolver::solve`] builds the session space,
//! runs the genetic search and projects the best plan into report tables.

use tracing::info;

use crate::config::CoverParams;
use crate::error::{ConfigError, EngineError};
use crate::ga::{CoverProblem, GeneticEngine};
use crate::models::CoverInputs;
use crate::progress::{Milestone, ProgressEvent, ProgressSink};
use crate::report::{CoverResult, ResultProjector};
use crate::space::ScheduleSpaceBuilder;
use crate::validation::validate_inputs;

/// One cover-planning run.
#[derive(Debug, Clone)]
pub struct CoverSolver {
    inputs: CoverInputs,
    params: CoverParams,
}

impl CoverSolver {
    /// Validates parameters and inputs.
    ///
    /// # Errors
    /// [`ConfigError::InvalidParameter`] or [`ConfigError::Validation`].
    pub fn new(inputs: CoverInputs, params: CoverParams) -> Result<Self, ConfigError> {
        params.validate()?;
        validate_inputs(&inputs).map_err(ConfigError::Validation)?;
        Ok(Self { inputs, params })
    }

    pub fn inputs(&self) -> &CoverInputs {
        &self.inputs
    }

    pub fn params(&self) -> &CoverParams {
        &self.params
    }

    /// Runs the search and returns the best plan found.
    ///
    /// `sink` receives the lifecycle milestones and one generation event
    /// per generation.
    pub fn solve(&self, sink: &mut dyn ProgressSink) -> Result<CoverResult, EngineError> {
        sink.notify(ProgressEvent::Status(Milestone::Initializing));
        info!(
            event = "solve_start",
            classes = self.inputs.classes.len(),
            teachers = self.inputs.teachers.len(),
            start = %self.params.start_date,
            end = %self.params.end_date
        );

        sink.notify(ProgressEvent::Status(Milestone::PreparingData));
        let space = ScheduleSpaceBuilder::from_params(&self.inputs, &self.params).build()?;
        let problem = CoverProblem::new(
            &space,
            &self.inputs.classes,
            &self.inputs.teachers,
            self.params.allow_teacher_replace_self,
        );

        sink.notify(ProgressEvent::Status(Milestone::Searching));
        let outcome = GeneticEngine::new(&problem, &self.params)?.run(sink)?;

        let result = ResultProjector::new(&space, &self.inputs.classes, &self.inputs.teachers)
            .project(outcome)?;

        info!(
            event = "solve_end",
            sessions = result.kpi.sessions,
            covered = result.kpi.covered,
            fitness = result.fitness,
            generations = result.generations_run
        );
        sink.notify(ProgressEvent::Status(Milestone::Completed));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassEntity, TeacherEntity};
    use crate::progress::{NoProgress, ProgressLog};
    use crate::validation::ValidationErrorKind;
    use chrono::{NaiveDate, Weekday};

    fn two_week_term() -> CoverParams {
        CoverParams::new(
            NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(),
            NaiveDate::from_ymd_opt(2024, 10, 27).unwrap(),
        )
        .with_hours_per_class(2)
        .with_population_size(20)
        .with_generations(20)
        .with_seed(42)
    }

    /// One Monday lesson over two weeks: exactly two eligible slots.
    fn one_class_inputs() -> CoverInputs {
        CoverInputs::new()
            .with_class(ClassEntity::new("1A").with_lesson(Weekday::Mon, 1, "ROSSI"))
            .with_teacher(TeacherEntity::new("ROSSI").with_class("1A"))
    }

    #[test]
    fn test_single_teacher_covers_everything() {
        let solver = CoverSolver::new(one_class_inputs(), two_week_term()).unwrap();
        let result = solver.solve(&mut NoProgress).unwrap();

        assert_eq!(result.assignments.len(), 2);
        assert!(result
            .assignments
            .iter()
            .all(|a| a.weekday == Weekday::Mon && a.period == 1));
        assert_eq!(result.breakdown.uncovered, 0);
        assert!(result.breakdown.is_feasible());
        assert!((result.kpi.coverage_rate - 1.0).abs() < 1e-10);
        assert!(result
            .assignments
            .iter()
            .all(|a| a.assigned_teacher.as_deref() == Some("ROSSI")));
    }

    #[test]
    fn test_forbidden_self_cover_leaves_sessions_uncovered() {
        let params = two_week_term().with_allow_teacher_replace_self(false);
        let solver = CoverSolver::new(one_class_inputs(), params).unwrap();
        let result = solver.solve(&mut NoProgress).unwrap();

        assert_eq!(result.breakdown.uncovered, 2);
        assert!(result.breakdown.is_feasible());
        assert!((result.fitness + 200.0).abs() < 1e-9);
        assert!(result.assignments.iter().all(|a| !a.is_covered()));
        assert!(result.lost_hours.iter().all(|l| l.lost_hours == 0));
    }

    #[test]
    fn test_too_many_hours_is_config_error() {
        let params = two_week_term().with_hours_per_class(3);
        let solver = CoverSolver::new(one_class_inputs(), params).unwrap();
        let err = solver.solve(&mut NoProgress).unwrap_err();

        assert!(matches!(
            err,
            EngineError::Config(ConfigError::InsufficientSlots {
                required: 3,
                available: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_forbidden_self_cover_excludes_other_teachers_hours() {
        let inputs = CoverInputs::new()
            .with_class(
                ClassEntity::new("1A")
                    .with_lesson(Weekday::Mon, 1, "ROSSI")
                    .with_lesson(Weekday::Wed, 2, "BIANCHI"),
            )
            .with_teacher(TeacherEntity::new("ROSSI").with_class("1A"));
        let params = two_week_term()
            .with_hours_per_class(4)
            .with_allow_teacher_replace_self(false);
        let result = CoverSolver::new(inputs, params)
            .unwrap()
            .solve(&mut NoProgress)
            .unwrap();

        assert!(result.breakdown.is_feasible());
        assert_eq!(result.breakdown.uncovered, 4);
        assert!(result.assignments.iter().all(|a| !a.is_covered()));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let inputs = one_class_inputs().with_teacher(TeacherEntity::new("ROSSI"));
        let err = CoverSolver::new(inputs, two_week_term()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = two_week_term().with_population_size(0);
        assert!(matches!(
            CoverSolver::new(one_class_inputs(), params),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_progress_milestones_and_generations() {
        let params = two_week_term().with_early_stopping(0).with_generations(5);
        let solver = CoverSolver::new(one_class_inputs(), params).unwrap();
        let mut log = ProgressLog::new();
        let result = solver.solve(&mut log).unwrap();

        assert_eq!(
            log.milestones(),
            vec![
                Milestone::Initializing,
                Milestone::PreparingData,
                Milestone::Searching,
                Milestone::Completed,
            ]
        );
        assert_eq!(log.generations(), (1..=5).map(|g| (g, 5)).collect::<Vec<_>>());
        assert_eq!(result.generations_run, 5);
        assert_eq!(result.history.len(), 6);
    }

    #[test]
    fn test_load_spread_across_two_teachers() {
        let inputs = CoverInputs::new()
            .with_class(
                ClassEntity::new("1A")
                    .with_lesson(Weekday::Mon, 1, "ROSSI")
                    .with_lesson(Weekday::Tue, 1, "ROSSI"),
            )
            .with_class(
                ClassEntity::new("2B")
                    .with_lesson(Weekday::Mon, 1, "BIANCHI")
                    .with_lesson(Weekday::Thu, 3, "BIANCHI"),
            )
            .with_teacher(TeacherEntity::new("NERI").with_classes(["1A", "2B"]))
            .with_teacher(TeacherEntity::new("VERDI").with_classes(["1A", "2B"]));
        let params = two_week_term().with_generations(60).with_population_size(40);

        let result = CoverSolver::new(inputs, params)
            .unwrap()
            .solve(&mut NoProgress)
            .unwrap();

        assert!(result.breakdown.is_feasible());
        assert_eq!(result.breakdown.uncovered, 0);
        let hours: Vec<u32> = result.teacher_loads.iter().map(|l| l.assigned_hours).collect();
        assert_eq!(hours.iter().sum::<u32>(), 4);
    }
}
