//! Generational GA loop.
//!
//! Each generation the engine:
//! 1. carries the `elite_count` best candidates over unchanged
//! 2. selects parent pairs and applies crossover with `crossover_rate`
//! 3. resamples child genes with the (possibly adaptive) mutation rate
//! 4. scores the children and replaces the population
//!
//! The best-so-far candidate is only replaced on a strict improvement.
//! The search stops after `generations` generations, or earlier once
//! `early_stopping` consecutive generations brought no improvement.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::chromosome::CoverChromosome;
use super::fitness::{FitnessBreakdown, FitnessEvaluator};
use super::operators::GeneticOperators;
use super::problem::CoverProblem;
use crate::config::CoverParams;
use crate::error::{ConfigError, EngineError};
use crate::progress::{ProgressEvent, ProgressSink};

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    Initializing,
    Evaluating,
    Selecting,
    Recombining,
    Mutating,
    Replacing,
    Terminated,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The generation cap was reached.
    MaxGenerations,
    /// The stagnation limit was reached.
    EarlyStopped,
}

/// Statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number (0 = initial population).
    pub generation: usize,
    /// Best score in the population.
    pub best: f64,
    /// Mean score of the population.
    pub mean: f64,
    /// Consecutive generations without improvement of the best-so-far.
    pub stagnant: usize,
}

/// Result of a finished search.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    /// Best candidate found.
    pub best: CoverChromosome,
    /// Evaluation of `best`.
    pub breakdown: FitnessBreakdown,
    /// Generations run after the initial population.
    pub generations_run: usize,
    pub termination: TerminationReason,
    /// One entry per generation, starting with generation 0.
    pub history: Vec<GenerationStats>,
}

/// Generational genetic search over cover plans.
pub struct GeneticEngine<'a> {
    problem: &'a CoverProblem<'a>,
    evaluator: FitnessEvaluator<'a>,
    operators: GeneticOperators,
    params: CoverParams,
    rng: StdRng,
    phase: EnginePhase,
    population: Vec<CoverChromosome>,
    best: Option<CoverChromosome>,
    generation: usize,
    stagnant: usize,
    termination: Option<TerminationReason>,
    history: Vec<GenerationStats>,
}

impl<'a> GeneticEngine<'a> {
    /// Creates an engine.
    ///
    /// # Errors
    /// [`ConfigError::InvalidParameter`] if `params` fail validation.
    pub fn new(problem: &'a CoverProblem<'a>, params: &CoverParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            problem,
            evaluator: FitnessEvaluator::new(problem, params.weights),
            operators: GeneticOperators::new(params.selection, params.crossover),
            params: params.clone(),
            rng,
            phase: EnginePhase::Idle,
            population: Vec::new(),
            best: None,
            generation: 0,
            stagnant: 0,
            termination: None,
            history: Vec::new(),
        })
    }

    /// Current phase.
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Generations completed after the initial population.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current population.
    pub fn population(&self) -> &[CoverChromosome] {
        &self.population
    }

    /// Best candidate so far.
    pub fn best(&self) -> Option<&CoverChromosome> {
        self.best.as_ref()
    }

    /// Consecutive generations without improvement.
    pub fn stagnant(&self) -> usize {
        self.stagnant
    }

    /// Per-generation statistics so far.
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Mutation rate for the next generation.
    ///
    /// With adaptive mutation the base rate grows by 10% per stagnant
    /// generation, capped at 0.5 (never below the base rate).
    pub fn mutation_rate(&self) -> f64 {
        let base = self.params.mutation_rate;
        if self.params.adaptive_mutation {
            let boosted = (base * (1.0 + self.stagnant as f64 / 10.0)).min(0.5);
            base.max(boosted)
        } else {
            base
        }
    }

    /// Seeds and scores the initial population (generation 0).
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        self.phase = EnginePhase::Initializing;
        info!(
            event = "search_start",
            sessions = self.problem.session_count(),
            teachers = self.problem.teacher_count(),
            population = self.params.population_size,
            generations = self.params.generations,
            "seeding initial population"
        );

        self.population = self
            .problem
            .seed_population(self.params.population_size, &mut self.rng);
        self.evaluate_population()?;

        self.generation = 0;
        self.stagnant = 0;
        self.termination = None;
        self.history.clear();
        self.best = self.population_best().cloned();
        self.record();
        Ok(())
    }

    /// Runs one generation. Returns the termination reason once the
    /// search is over; further calls are no-ops.
    pub fn step(&mut self) -> Result<Option<TerminationReason>, EngineError> {
        if let Some(reason) = self.termination {
            return Ok(Some(reason));
        }
        if self.population.is_empty() {
            self.initialize()?;
        }

        let size = self.params.population_size;
        let rate = self.mutation_rate();
        let crossover_rate = self.params.crossover_rate;

        self.phase = EnginePhase::Selecting;
        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| {
            self.population[b]
                .score()
                .total_cmp(&self.population[a].score())
        });
        let mut next: Vec<CoverChromosome> = order
            .iter()
            .take(self.params.elite_count())
            .map(|&i| self.population[i].clone())
            .collect();

        let selector = self.operators.selector(&self.population);
        while next.len() < size {
            self.phase = EnginePhase::Selecting;
            let (Some(p1), Some(p2)) = (selector.pick(&mut self.rng), selector.pick(&mut self.rng))
            else {
                return Err(EngineError::Internal("empty population".into()));
            };

            self.phase = EnginePhase::Recombining;
            let (mut c1, mut c2) = if self.rng.random_bool(crossover_rate) {
                self.operators.crossover(p1, p2, &mut self.rng)
            } else {
                (p1.offspring(), p2.offspring())
            };

            self.phase = EnginePhase::Mutating;
            self.operators.mutate(&mut c1, self.problem, rate, &mut self.rng);
            self.operators.mutate(&mut c2, self.problem, rate, &mut self.rng);

            next.push(c1);
            if next.len() < size {
                next.push(c2);
            }
        }

        self.phase = EnginePhase::Replacing;
        self.population = next;
        self.evaluate_population()?;
        self.generation += 1;

        let improved = match (self.population_best(), &self.best) {
            (Some(candidate), Some(best)) => candidate.score() > best.score(),
            (Some(_), None) => true,
            (None, _) => false,
        };
        if improved {
            self.best = self.population_best().cloned();
            self.stagnant = 0;
        } else {
            self.stagnant += 1;
        }
        self.record();

        let early = self.params.early_stopping;
        if early > 0 && self.stagnant >= early {
            info!(
                event = "early_stop",
                generation = self.generation,
                stagnant = self.stagnant,
                "no improvement, stopping"
            );
            self.termination = Some(TerminationReason::EarlyStopped);
        } else if self.generation >= self.params.generations {
            self.termination = Some(TerminationReason::MaxGenerations);
        }
        if self.termination.is_some() {
            self.phase = EnginePhase::Terminated;
        }
        Ok(self.termination)
    }

    /// Runs the whole search, notifying `sink` after every generation.
    pub fn run(mut self, sink: &mut dyn ProgressSink) -> Result<EngineOutcome, EngineError> {
        self.initialize()?;
        let total = self.params.generations;
        let termination = loop {
            let reason = self.step()?;
            sink.notify(ProgressEvent::Generation {
                current: self.generation,
                total,
            });
            if let Some(reason) = reason {
                break reason;
            }
        };

        let best = self
            .best
            .take()
            .ok_or_else(|| EngineError::Internal("search finished without a candidate".into()))?;
        let breakdown = self.evaluator.breakdown(&best.genes)?;
        info!(
            event = "search_end",
            generations = self.generation,
            best = breakdown.score,
            uncovered = breakdown.uncovered,
            hard_violations = breakdown.hard_violations(),
            "search finished"
        );

        Ok(EngineOutcome {
            best,
            breakdown,
            generations_run: self.generation,
            termination,
            history: self.history,
        })
    }

    fn evaluate_population(&mut self) -> Result<(), EngineError> {
        self.phase = EnginePhase::Evaluating;
        for candidate in self.population.iter_mut().filter(|c| c.fitness.is_none()) {
            candidate.fitness = Some(self.evaluator.evaluate(&candidate.genes)?);
        }
        Ok(())
    }

    fn population_best(&self) -> Option<&CoverChromosome> {
        self.population
            .iter()
            .max_by(|a, b| a.score().total_cmp(&b.score()))
    }

    fn record(&mut self) {
        let n = self.population.len().max(1) as f64;
        let best = self.population_best().map_or(f64::NEG_INFINITY, |c| c.score());
        let mean = self.population.iter().map(|c| c.score()).sum::<f64>() / n;
        let stats = GenerationStats {
            generation: self.generation,
            best,
            mean,
            stagnant: self.stagnant,
        };
        debug!(
            generation = stats.generation,
            best = stats.best,
            mean = stats.mean,
            stagnant = stats.stagnant,
            "generation finished"
        );
        self.history.push(stats);
    }
}
