//! Assignment-vector chromosome for cover planning.
//!
//! # Encoding
//!
//! One gene per session, in session order. A gene is either the roster
//! index of the covering teacher or [`Gene::Uncovered`]. Operators never
//! modify a candidate in place once it has been scored: crossover and
//! mutation work on fresh, unscored copies.
//!
//! # Reference
//! Syswerda (1989), "Uniform crossover in genetic algorithms"

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::problem::CoverProblem;

/// Assignment of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gene {
    /// Roster index of the covering teacher.
    Teacher(usize),
    /// Nobody covers the session.
    Uncovered,
}

impl Gene {
    /// Roster index, if covered.
    #[inline]
    pub fn teacher(&self) -> Option<usize> {
        match self {
            Gene::Teacher(t) => Some(*t),
            Gene::Uncovered => None,
        }
    }

    /// Whether the session is covered.
    #[inline]
    pub fn is_covered(&self) -> bool {
        matches!(self, Gene::Teacher(_))
    }
}

/// A candidate cover plan.
///
/// Higher fitness = better plan (maximization convention). `None` until
/// the candidate has been evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverChromosome {
    /// One gene per session.
    pub genes: Vec<Gene>,
    /// Cached fitness.
    pub fitness: Option<f64>,
}

impl CoverChromosome {
    /// Creates an unscored chromosome.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Creates a chromosome leaving every session uncovered.
    pub fn uncovered(sessions: usize) -> Self {
        Self::new(vec![Gene::Uncovered; sessions])
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether there are no genes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Fitness for ranking; unscored candidates rank last.
    #[inline]
    pub fn score(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Unscored copy of this chromosome.
    pub fn offspring(&self) -> Self {
        Self::new(self.genes.clone())
    }

    /// Number of covered sessions.
    pub fn covered_count(&self) -> usize {
        self.genes.iter().filter(|g| g.is_covered()).count()
    }

    /// Assigned hours per roster teacher.
    pub fn teacher_hours(&self, teachers: usize) -> Vec<u32> {
        let mut hours = vec![0u32; teachers];
        for t in self.genes.iter().filter_map(Gene::teacher) {
            if let Some(h) = hours.get_mut(t) {
                *h += 1;
            }
        }
        hours
    }

    /// Checks that the chromosome has one gene per session and that every
    /// covered session is assigned to a teacher eligible for its class.
    pub fn is_valid(&self, problem: &CoverProblem<'_>) -> bool {
        if self.genes.len() != problem.session_count() {
            return false;
        }
        self.genes.iter().enumerate().all(|(s, gene)| match gene {
            Gene::Uncovered => true,
            Gene::Teacher(t) => *t < problem.teacher_count() && !problem.flags(s, *t).ineligible,
        })
    }
}

/// Uniform crossover: each gene of the first child comes from either
/// parent with probability 0.5; the second child takes the other gene.
pub fn uniform_crossover<R: Rng>(
    p1: &CoverChromosome,
    p2: &CoverChromosome,
    rng: &mut R,
) -> (CoverChromosome, CoverChromosome) {
    debug_assert_eq!(p1.len(), p2.len());
    let mut c1 = Vec::with_capacity(p1.len());
    let mut c2 = Vec::with_capacity(p2.len());
    for (&a, &b) in p1.genes.iter().zip(&p2.genes) {
        if rng.random_bool(0.5) {
            c1.push(a);
            c2.push(b);
        } else {
            c1.push(b);
            c2.push(a);
        }
    }
    (CoverChromosome::new(c1), CoverChromosome::new(c2))
}

/// Block crossover: positions are shuffled and split into blocks of
/// `max(1, n / 10)` genes; each block is swapped between the children
/// with probability 0.5.
pub fn block_crossover<R: Rng>(
    p1: &CoverChromosome,
    p2: &CoverChromosome,
    rng: &mut R,
) -> (CoverChromosome, CoverChromosome) {
    debug_assert_eq!(p1.len(), p2.len());
    let n = p1.len().min(p2.len());
    let mut c1 = p1.genes[..n].to_vec();
    let mut c2 = p2.genes[..n].to_vec();

    let mut positions: Vec<usize> = (0..n).collect();
    positions.shuffle(rng);
    let block = (n / 10).max(1);

    for chunk in positions.chunks(block) {
        if rng.random_bool(0.5) {
            for &i in chunk {
                std::mem::swap(&mut c1[i], &mut c2[i]);
            }
        }
    }
    (CoverChromosome::new(c1), CoverChromosome::new(c2))
}

/// Gene mutation: each gene is resampled from its session's admissible
/// teachers with probability `rate`. Returns the number of resampled
/// genes and clears the cached fitness if any.
pub fn gene_mutation<R: Rng>(
    chromosome: &mut CoverChromosome,
    problem: &CoverProblem<'_>,
    rate: f64,
    rng: &mut R,
) -> usize {
    if rate <= 0.0 {
        return 0;
    }
    let mut mutated = 0;
    for (s, gene) in chromosome.genes.iter_mut().enumerate() {
        if rng.random_bool(rate) {
            *gene = problem.sample_gene(s, rng);
            mutated += 1;
        }
    }
    if mutated > 0 {
        chromosome.fitness = None;
    }
    mutated
}
