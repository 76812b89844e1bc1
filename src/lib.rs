//! Civic-education cover planning.
//!
//! Given class timetables, a teacher roster with eligibility and
//! availability, and a term, decides which concrete hours each class
//! devotes to civic education and which roster teacher covers each one.
//! The assignment is searched with a genetic algorithm whose fitness puts
//! feasibility first, then coverage, then fair load and weekly spread.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ClassEntity`, `TeacherEntity`,
//!   `Availability`, `ClosureSet`, `Session`, `TimeSlot`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown classes, periods)
//! - **`space`**: Term calendar to session list
//! - **`ga`**: Encoding, fitness, operators and the generational engine
//! - **`report`**: Assignment list, load and lost-hours tables, KPIs
//! - **`progress`**: Per-generation and milestone notifications
//! - **`config`**: Run parameters (TOML / JSON)
//! - **`solver`**: One-call facade
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, Weekday};
//! use u_civics::{CoverInputs, CoverParams, CoverSolver, NoProgress};
//! use u_civics::models::{ClassEntity, TeacherEntity};
//!
//! let inputs = CoverInputs::new()
//!     .with_class(ClassEntity::new("1A").with_lesson(Weekday::Mon, 1, "ROSSI"))
//!     .with_teacher(TeacherEntity::new("NERI").with_class("1A"));
//! let params = CoverParams::new(
//!     NaiveDate::from_ymd_opt(2024, 10, 14).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 11, 10).unwrap(),
//! )
//! .with_hours_per_class(3)
//! .with_population_size(10)
//! .with_generations(10)
//! .with_seed(1);
//!
//! let result = CoverSolver::new(inputs, params).unwrap().solve(&mut NoProgress).unwrap();
//! assert_eq!(result.assignments.len(), 3);
//! assert_eq!(result.kpi.uncovered, 0);
//! ```
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod error;
pub mod ga;
pub mod models;
pub mod progress;
pub mod report;
pub mod solver;
pub mod space;
pub mod validation;

pub use config::CoverParams;
pub use error::{ConfigError, EngineError};
pub use models::CoverInputs;
pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use report::CoverResult;
pub use solver::CoverSolver;
