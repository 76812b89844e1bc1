//! Cover quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Coverage rate | Covered sessions / sessions |
//! | Max lost percentage | Largest share of hours a class loses from one teacher |
//! | Load std-dev | Population standard deviation of assigned hours over the roster |

use serde::{Deserialize, Serialize};

use super::projector::{LostHours, SessionAssignment, TeacherLoad};

/// Cover plan performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageKpi {
    pub sessions: usize,
    pub covered: usize,
    pub uncovered: usize,
    /// Fraction of sessions covered (0.0..1.0). 1.0 when there are none.
    pub coverage_rate: f64,
    /// Largest lost-hours percentage (0.0..100.0).
    pub max_lost_percentage: f64,
    /// Standard deviation of assigned hours per teacher.
    pub load_std_dev: f64,
}

impl CoverageKpi {
    /// Computes KPIs from the report tables.
    pub fn calculate(
        assignments: &[SessionAssignment],
        loads: &[TeacherLoad],
        lost: &[LostHours],
    ) -> Self {
        let sessions = assignments.len();
        let covered = assignments.iter().filter(|a| a.is_covered()).count();

        let coverage_rate = if sessions == 0 {
            1.0
        } else {
            covered as f64 / sessions as f64
        };

        let max_lost_percentage = lost.iter().map(|l| l.percentage).fold(0.0, f64::max);

        let load_std_dev = if loads.is_empty() {
            0.0
        } else {
            let n = loads.len() as f64;
            let mean = loads.iter().map(|l| l.assigned_hours as f64).sum::<f64>() / n;
            let var = loads
                .iter()
                .map(|l| (l.assigned_hours as f64 - mean).powi(2))
                .sum::<f64>()
                / n;
            var.sqrt()
        };

        Self {
            sessions,
            covered,
            uncovered: sessions - covered,
            coverage_rate,
            max_lost_percentage,
            load_std_dev,
        }
    }
}
