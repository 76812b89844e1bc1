//! Fitness evaluation.
//!
//! A candidate's score is the negated weighted sum of its penalties, so
//! higher is better and a perfect plan scores 0.
//!
//! Hard constraints:
//! - a teacher covers two sessions in the same slot (double booking)
//! - a teacher covers a class they are not eligible for
//! - a teacher covers a slot they are not available for
//! - a teacher covers their own hour while self-cover is forbidden
//!
//! Soft objectives:
//! - uncovered sessions, `weights.uncovered` each
//! - load imbalance, `var(load) * T / n²` in `[0, 1]` over the `T` teachers
//!   admissible for at least one session
//! - week clustering, `Σ(hours_t - distinct_weeks_t) / n` in `[0, 1)`
//!
//! Every hard violation costs [`FitnessWeights::hard_penalty`], which
//! exceeds the largest possible soft total. A plan with a hard violation
//! therefore always scores below every plan without one.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::chromosome::Gene;
use super::problem::CoverProblem;
use crate::error::{ConfigError, EngineError};

/// Weights of the soft objectives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Cost of one uncovered session.
    pub uncovered: f64,
    /// Cost of fully concentrated load.
    pub load_balance: f64,
    /// Cost of every covered hour sharing a week.
    pub week_spread: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            uncovered: 100.0,
            load_balance: 10.0,
            week_spread: 1.0,
        }
    }
}

impl FitnessWeights {
    /// Checks that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, w) in [
            ("weights.uncovered", self.uncovered),
            ("weights.load_balance", self.load_balance),
            ("weights.week_spread", self.week_spread),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::invalid(name, format!("{w} must be finite and >= 0")));
            }
        }
        Ok(())
    }

    /// Cost of one hard violation for `sessions` sessions.
    pub fn hard_penalty(&self, sessions: usize) -> f64 {
        (sessions as f64 + 1.0) * self.uncovered + self.load_balance + self.week_spread + 1.0
    }
}

/// Detailed evaluation of one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    /// Extra sessions booked on an already-booked teacher slot.
    pub double_bookings: u32,
    /// Assignments to non-eligible teachers.
    pub ineligible: u32,
    /// Assignments to unavailable teachers.
    pub unavailable: u32,
    /// Forbidden self-cover assignments.
    pub self_replacements: u32,
    /// Sessions nobody covers.
    pub uncovered: u32,
    /// Normalized load variance in `[0, 1]`.
    pub load_balance: f64,
    /// Normalized week clustering in `[0, 1)`.
    pub week_clustering: f64,
    /// Final score (higher is better, 0 is perfect).
    pub score: f64,
}

impl FitnessBreakdown {
    /// Total hard violations.
    pub fn hard_violations(&self) -> u32 {
        self.double_bookings + self.ineligible + self.unavailable + self.self_replacements
    }

    /// Whether no hard constraint is broken.
    pub fn is_feasible(&self) -> bool {
        self.hard_violations() == 0
    }
}

/// Scores candidates of one problem.
pub struct FitnessEvaluator<'a> {
    problem: &'a CoverProblem<'a>,
    weights: FitnessWeights,
    hard_penalty: f64,
}

impl<'a> FitnessEvaluator<'a> {
    /// Creates an evaluator.
    pub fn new(problem: &'a CoverProblem<'a>, weights: FitnessWeights) -> Self {
        let hard_penalty = weights.hard_penalty(problem.session_count());
        Self {
            problem,
            weights,
            hard_penalty,
        }
    }

    /// Score of a gene vector.
    pub fn evaluate(&self, genes: &[Gene]) -> Result<f64, EngineError> {
        Ok(self.breakdown(genes)?.score)
    }

    /// Full evaluation of a gene vector.
    ///
    /// # Errors
    /// [`EngineError::Internal`] if the vector length differs from the
    /// session count or a gene names an unknown roster index.
    pub fn breakdown(&self, genes: &[Gene]) -> Result<FitnessBreakdown, EngineError> {
        let n = self.problem.session_count();
        let n_teachers = self.problem.teacher_count();
        if genes.len() != n {
            return Err(EngineError::Internal(format!(
                "candidate has {} genes for {} sessions",
                genes.len(),
                n
            )));
        }

        let mut out = FitnessBreakdown::default();
        let mut load = vec![0u32; n_teachers];
        let mut booked: HashMap<(usize, usize), u32> = HashMap::new();
        let mut weeks: HashSet<(usize, usize)> = HashSet::new();
        let mut assigned = 0usize;

        for (s, gene) in genes.iter().enumerate() {
            let t = match *gene {
                Gene::Uncovered => {
                    out.uncovered += 1;
                    continue;
                }
                Gene::Teacher(t) if t < n_teachers => t,
                Gene::Teacher(t) => {
                    return Err(EngineError::Internal(format!(
                        "session {s} assigned to roster index {t} of {n_teachers}"
                    )));
                }
            };

            let flags = self.problem.flags(s, t);
            out.ineligible += flags.ineligible as u32;
            out.unavailable += flags.unavailable as u32;
            out.self_replacements += flags.self_cover as u32;

            load[t] += 1;
            assigned += 1;
            *booked.entry((t, self.problem.slot_id(s))).or_insert(0) += 1;
            weeks.insert((t, self.problem.week_id(s)));
        }

        out.double_bookings = booked.values().map(|c| c - 1).sum();

        if n > 0 {
            out.load_balance = self.load_balance(&load, n);
            out.week_clustering = (assigned - weeks.len()) as f64 / n as f64;
        }

        let soft = out.uncovered as f64 * self.weights.uncovered
            + out.load_balance * self.weights.load_balance
            + out.week_clustering * self.weights.week_spread;
        out.score = -(out.hard_violations() as f64 * self.hard_penalty + soft);
        Ok(out)
    }

    fn load_balance(&self, load: &[u32], sessions: usize) -> f64 {
        let balanced = self.problem.balanced_count();
        if balanced == 0 {
            return 0.0;
        }
        let loads: Vec<f64> = load
            .iter()
            .enumerate()
            .filter(|(t, _)| self.problem.is_balanced(*t))
            .map(|(_, &h)| h as f64)
            .collect();
        let t = balanced as f64;
        let mean = loads.iter().sum::<f64>() / t;
        let variance = loads.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / t;
        (variance * t / (sessions as f64).powi(2)).min(1.0)
    }
}
