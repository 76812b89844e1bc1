//! Configurable genetic operators for cover planning.
//!
//! Provides runtime-selectable parent selection and crossover strategies
//! via [`GeneticOperators`]. Mutation is always per-gene resampling.
//!
//! # Usage
//!
//! ```
//! use u_civics::ga::operators::{CrossoverType, GeneticOperators, SelectionType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.selection, SelectionType::Tournament(3));
//! assert_eq!(ops.crossover_type, CrossoverType::Uniform);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{CoverChromosome, block_crossover, gene_mutation, uniform_crossover};
use super::problem::CoverProblem;

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionType {
    /// Best of `k` uniformly drawn candidates.
    Tournament(usize),
    /// Linear rank weighting: the best of `N` candidates has weight `N`,
    /// the worst weight 1.
    Rank,
}

impl Default for SelectionType {
    fn default() -> Self {
        SelectionType::Tournament(3)
    }
}

/// Crossover strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverType {
    /// Gene-wise coin flip.
    #[default]
    Uniform,
    /// Shuffled blocks of `max(1, n / 10)` genes.
    Block,
}

/// Runtime-selectable genetic operators.
#[derive(Debug, Clone, Default)]
pub struct GeneticOperators {
    /// Parent selection strategy.
    pub selection: SelectionType,
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
}

impl GeneticOperators {
    /// Creates operators with the given strategies.
    pub fn new(selection: SelectionType, crossover_type: CrossoverType) -> Self {
        Self {
            selection,
            crossover_type,
        }
    }

    /// Prepares parent selection over a scored population.
    pub fn selector<'p>(&self, population: &'p [CoverChromosome]) -> ParentSelector<'p> {
        ParentSelector::new(self.selection, population)
    }

    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &CoverChromosome,
        p2: &CoverChromosome,
        rng: &mut R,
    ) -> (CoverChromosome, CoverChromosome) {
        match self.crossover_type {
            CrossoverType::Uniform => uniform_crossover(p1, p2, rng),
            CrossoverType::Block => block_crossover(p1, p2, rng),
        }
    }

    /// Resamples each gene with probability `rate`.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut CoverChromosome,
        problem: &CoverProblem<'_>,
        rate: f64,
        rng: &mut R,
    ) -> usize {
        gene_mutation(chromosome, problem, rate, rng)
    }
}

/// Parent selector over one generation.
///
/// Rank ordering is computed once when the selector is built.
pub struct ParentSelector<'p> {
    population: &'p [CoverChromosome],
    selection: SelectionType,
    /// Indices sorted by ascending fitness (rank selection only).
    ascending: Vec<usize>,
}

impl<'p> ParentSelector<'p> {
    fn new(selection: SelectionType, population: &'p [CoverChromosome]) -> Self {
        let ascending = match selection {
            SelectionType::Rank => {
                let mut idx: Vec<usize> = (0..population.len()).collect();
                idx.sort_by(|&a, &b| population[a].score().total_cmp(&population[b].score()));
                idx
            }
            SelectionType::Tournament(_) => Vec::new(),
        };
        Self {
            population,
            selection,
            ascending,
        }
    }

    /// Picks one parent. `None` only for an empty population.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&'p CoverChromosome> {
        let n = self.population.len();
        if n == 0 {
            return None;
        }
        let idx = match self.selection {
            SelectionType::Tournament(k) => {
                let mut best = rng.random_range(0..n);
                for _ in 1..k.max(1) {
                    let challenger = rng.random_range(0..n);
                    if self.population[challenger].score() > self.population[best].score() {
                        best = challenger;
                    }
                }
                best
            }
            SelectionType::Rank => {
                let total = n * (n + 1) / 2;
                let mut ticket = rng.random_range(0..total);
                let mut chosen = self.ascending[n - 1];
                for (rank, &i) in self.ascending.iter().enumerate() {
                    let weight = rank + 1;
                    if ticket < weight {
                        chosen = i;
                        break;
                    }
                    ticket -= weight;
                }
                chosen
            }
        };
        Some(&self.population[idx])
    }
}
