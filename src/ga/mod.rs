//! GA-based cover optimization.
//!
//! A candidate plan is a vector with one gene per session; each gene is a
//! roster index or "uncovered". The engine evolves a population of such
//! vectors under a fitness that makes every hard violation cost more than
//! any combination of soft objectives.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable selection and crossover strategies
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Syswerda (1989), "Uniform crossover in genetic algorithms"

mod chromosome;
mod engine;
mod fitness;
pub mod operators;
mod problem;

pub use chromosome::{CoverChromosome, Gene, block_crossover, gene_mutation, uniform_crossover};
pub use engine::{EngineOutcome, EnginePhase, GenerationStats, GeneticEngine, TerminationReason};
pub use fitness::{FitnessBreakdown, FitnessEvaluator, FitnessWeights};
pub use operators::{CrossoverType, GeneticOperators, ParentSelector, SelectionType};
pub use problem::{CoverProblem, PairFlags, SeedStrategy};
