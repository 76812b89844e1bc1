//! Result projection and quality metrics.
//!
//! - [`ResultProjector`]: best candidate to assignment list, per-teacher
//!   load table and lost-hours table
//! - [`CoverageKpi`]: aggregate quality indicators

mod kpi;
mod projector;

pub use kpi::CoverageKpi;
pub use projector::{
    CoverResult, LostHours, ResultProjector, SessionAssignment, TeacherLoad, lost_hours_table,
    totals_from_assignments,
};
