//! Run configuration.
//!
//! [`CoverParams`] holds every parameter the engine recognizes. Field
//! names are English; the Italian payload keys (`data_inizio`,
//! `num_generazioni`, ...) are accepted as aliases when deserializing.
//!
//! # Examples
//!
//! ```
//! use u_civics::config::CoverParams;
//!
//! let params = CoverParams::from_toml_str(r#"
//!     data_inizio = "2024-10-15"
//!     data_fine = "2025-06-10"
//!     ore_tot_civics = 30
//!     num_generazioni = 400
//!     popolazione_size = 500
//!     probabilita_mutazione = 0.5
//!     allow_teacher_replace_self = false
//! "#).unwrap();
//!
//! assert_eq!(params.hours_per_class, 30);
//! assert_eq!(params.generations, 400);
//! assert!(params.validate().is_ok());
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ga::{CrossoverType, FitnessWeights, SelectionType};

/// Parameters of one cover-planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverParams {
    /// First day of the term (inclusive).
    #[serde(alias = "data_inizio")]
    pub start_date: NaiveDate,

    /// Last day of the term (inclusive).
    #[serde(alias = "data_fine")]
    pub end_date: NaiveDate,

    /// Required civic-education hours per class.
    #[serde(alias = "ore_tot_civics", default = "default_hours_per_class")]
    pub hours_per_class: u32,

    /// Generation cap.
    #[serde(alias = "num_generazioni", default = "default_generations")]
    pub generations: usize,

    /// Number of candidates per generation.
    #[serde(alias = "popolazione_size", default = "default_population_size")]
    pub population_size: usize,

    /// Per-gene mutation probability (0.0–1.0).
    #[serde(alias = "probabilita_mutazione", default = "default_mutation_rate")]
    pub mutation_rate: f64,

    /// Per-pair crossover probability (0.0–1.0).
    #[serde(alias = "probabilita_crossover", default = "default_crossover_rate")]
    pub crossover_rate: f64,

    /// Fraction of the population carried over unchanged (0.0–1.0).
    /// At least one individual is always kept.
    #[serde(alias = "elitismo_rate", default = "default_elite_rate")]
    pub elite_rate: f64,

    /// Stagnant generations before stopping. 0 disables early stopping.
    #[serde(alias = "early_stopping_n", default = "default_early_stopping")]
    pub early_stopping: usize,

    /// Whether a teacher may cover an hour they would teach anyway.
    #[serde(default = "default_true")]
    pub allow_teacher_replace_self: bool,

    /// Random seed. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Parent selection strategy.
    #[serde(default)]
    pub selection: SelectionType,

    /// Crossover strategy.
    #[serde(default)]
    pub crossover: CrossoverType,

    /// Raise the mutation rate while the search stagnates.
    #[serde(default)]
    pub adaptive_mutation: bool,

    /// Soft-objective weights.
    #[serde(default)]
    pub weights: FitnessWeights,
}

fn default_hours_per_class() -> u32 {
    27
}

fn default_generations() -> usize {
    200
}

fn default_population_size() -> usize {
    200
}

fn default_mutation_rate() -> f64 {
    0.2
}

fn default_crossover_rate() -> f64 {
    0.8
}

fn default_elite_rate() -> f64 {
    0.01
}

fn default_early_stopping() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl CoverParams {
    /// Creates parameters for the given term with default search settings.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            hours_per_class: default_hours_per_class(),
            generations: default_generations(),
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            elite_rate: default_elite_rate(),
            early_stopping: default_early_stopping(),
            allow_teacher_replace_self: true,
            seed: None,
            selection: SelectionType::default(),
            crossover: CrossoverType::default(),
            adaptive_mutation: false,
            weights: FitnessWeights::default(),
        }
    }

    /// Loads parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses parameters from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parses parameters from a JSON string (the host payload format).
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Sets the required hours per class.
    pub fn with_hours_per_class(mut self, hours: u32) -> Self {
        self.hours_per_class = hours;
        self
    }

    /// Sets the generation cap.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the per-gene mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the per-pair crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the elite fraction.
    pub fn with_elite_rate(mut self, rate: f64) -> Self {
        self.elite_rate = rate;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_early_stopping(mut self, n: usize) -> Self {
        self.early_stopping = n;
        self
    }

    /// Allows or forbids a teacher covering their own hour.
    pub fn with_allow_teacher_replace_self(mut self, allow: bool) -> Self {
        self.allow_teacher_replace_self = allow;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: SelectionType) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the crossover strategy.
    pub fn with_crossover(mut self, crossover: CrossoverType) -> Self {
        self.crossover = crossover;
        self
    }

    /// Enables or disables adaptive mutation.
    pub fn with_adaptive_mutation(mut self, adaptive: bool) -> Self {
        self.adaptive_mutation = adaptive;
        self
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Number of elite individuals: `floor(elite_rate * population_size)`,
    /// at least one and at most the whole population.
    pub fn elite_count(&self) -> usize {
        let n = (self.elite_rate * self.population_size as f64).floor() as usize;
        n.clamp(1, self.population_size.max(1))
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::invalid(
                "data_fine",
                format!("{} is before {}", self.end_date, self.start_date),
            ));
        }
        if self.hours_per_class == 0 {
            return Err(ConfigError::invalid("ore_tot_civics", "must be at least 1"));
        }
        if self.generations == 0 {
            return Err(ConfigError::invalid("num_generazioni", "must be at least 1"));
        }
        if self.population_size < 2 {
            return Err(ConfigError::invalid("popolazione_size", "must be at least 2"));
        }
        check_probability("probabilita_mutazione", self.mutation_rate)?;
        check_probability("probabilita_crossover", self.crossover_rate)?;
        check_probability("elitismo_rate", self.elite_rate)?;
        if let SelectionType::Tournament(0) = self.selection {
            return Err(ConfigError::invalid("selection", "tournament size must be at least 1"));
        }
        self.weights.validate()?;
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            name,
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(())
}
