//! Cover-planning GA problem definition.
//!
//! Bridges the session space and the teacher roster to the GA: for every
//! session it precomputes the admissible teachers and the hard-constraint
//! flags of every `(session, teacher)` pair, and it seeds candidates.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::warn;

use super::chromosome::{CoverChromosome, Gene};
use crate::models::{ClassEntity, Session, TeacherEntity, TimeSlot};
use crate::space::ScheduleSpace;

/// Hard-constraint flags of assigning one teacher to one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairFlags {
    /// The teacher may not cover this class.
    pub ineligible: bool,
    /// The teacher is not available at this slot.
    pub unavailable: bool,
    /// The teacher would cover a class they teach while that is forbidden.
    pub self_cover: bool,
}

impl PairFlags {
    /// Whether the pair breaks no hard constraint.
    #[inline]
    pub fn is_clear(&self) -> bool {
        !(self.ineligible || self.unavailable || self.self_cover)
    }

    /// Number of hard constraints broken.
    #[inline]
    pub fn count(&self) -> u32 {
        self.ineligible as u32 + self.unavailable as u32 + self.self_cover as u32
    }
}

/// How a seed candidate is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Chronological order, least-loaded admissible teacher.
    Greedy,
    /// Class by class, uniform admissible teacher.
    Batch,
    /// Shuffled order, uniform admissible teacher.
    Random,
}

/// GA problem definition for civic-education cover planning.
///
/// Sessions and teachers are borrowed; the problem itself only stores
/// derived lookup tables.
pub struct CoverProblem<'a> {
    sessions: &'a [Session],
    teachers: &'a [TeacherEntity],
    /// Admissible teacher indices per session.
    candidates: Vec<Vec<usize>>,
    /// `flags[session * teachers + teacher]`.
    flags: Vec<PairFlags>,
    /// Dense id of each session's time slot.
    slot_ids: Vec<usize>,
    /// Dense id of each session's ISO week.
    week_ids: Vec<usize>,
    /// Teachers admissible for at least one session.
    balanced: Vec<bool>,
}

impl<'a> CoverProblem<'a> {
    /// Creates a problem from the session space, the classes and the roster.
    pub fn new(
        space: &'a ScheduleSpace,
        classes: &[ClassEntity],
        teachers: &'a [TeacherEntity],
        allow_self: bool,
    ) -> Self {
        Self::from_sessions(space.sessions(), classes, teachers, allow_self)
    }

    /// Creates a problem from a raw session list.
    ///
    /// `classes` supplies the timetables used to tell who teaches a class.
    /// A session whose class is missing from it only knows its own
    /// replaced teacher.
    pub fn from_sessions(
        sessions: &'a [Session],
        classes: &[ClassEntity],
        teachers: &'a [TeacherEntity],
        allow_self: bool,
    ) -> Self {
        let n_teachers = teachers.len();
        let by_id: HashMap<&str, &ClassEntity> =
            classes.iter().map(|c| (c.id.as_str(), c)).collect();
        let mut flags = Vec::with_capacity(sessions.len() * n_teachers);
        let mut candidates = Vec::with_capacity(sessions.len());
        let mut balanced = vec![false; n_teachers];

        for session in sessions {
            let class = by_id.get(session.class_id.as_str()).copied();
            let mut admissible = Vec::new();
            for (t, teacher) in teachers.iter().enumerate() {
                let f = pair_flags(session, class, teacher, allow_self);
                if f.is_clear() {
                    admissible.push(t);
                    balanced[t] = true;
                }
                flags.push(f);
            }
            candidates.push(admissible);
        }

        let slot_ids = dense_ids(sessions.iter().map(|s| s.slot));
        let week_ids = dense_ids(sessions.iter().map(|s| s.slot.iso_week()));

        let uncoverable = candidates.iter().filter(|c| c.is_empty()).count();
        if uncoverable > 0 {
            warn!(
                uncoverable,
                sessions = sessions.len(),
                "sessions without any admissible teacher"
            );
        }

        Self {
            sessions,
            teachers,
            candidates,
            flags,
            slot_ids,
            week_ids,
            balanced,
        }
    }

    /// Sessions, in gene order.
    #[inline]
    pub fn sessions(&self) -> &'a [Session] {
        self.sessions
    }

    /// Teacher roster, indexed by `Gene::Teacher`.
    #[inline]
    pub fn teachers(&self) -> &'a [TeacherEntity] {
        self.teachers
    }

    /// Number of genes per candidate.
    #[inline]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of roster teachers.
    #[inline]
    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    /// Admissible teachers of `session`.
    #[inline]
    pub fn candidates(&self, session: usize) -> &[usize] {
        &self.candidates[session]
    }

    /// Hard-constraint flags of assigning `teacher` to `session`.
    #[inline]
    pub fn flags(&self, session: usize, teacher: usize) -> PairFlags {
        self.flags[session * self.teachers.len() + teacher]
    }

    #[inline]
    pub(crate) fn slot_id(&self, session: usize) -> usize {
        self.slot_ids[session]
    }

    #[inline]
    pub(crate) fn week_id(&self, session: usize) -> usize {
        self.week_ids[session]
    }

    /// Whether `teacher` takes part in load balancing.
    #[inline]
    pub(crate) fn is_balanced(&self, teacher: usize) -> bool {
        self.balanced[teacher]
    }

    /// Number of teachers taking part in load balancing.
    pub(crate) fn balanced_count(&self) -> usize {
        self.balanced.iter().filter(|b| **b).count()
    }

    /// Samples a gene for `session`: a uniform admissible teacher, or
    /// `Uncovered` when there is none.
    pub fn sample_gene<R: Rng>(&self, session: usize, rng: &mut R) -> Gene {
        self.candidates[session]
            .choose(rng)
            .map(|&t| Gene::Teacher(t))
            .unwrap_or(Gene::Uncovered)
    }

    /// Creates one seed candidate with the given strategy.
    ///
    /// A teacher is never booked twice for the same slot within the
    /// candidate; if every admissible teacher is already booked the
    /// session stays uncovered.
    pub fn create_individual<R: Rng>(&self, strategy: SeedStrategy, rng: &mut R) -> CoverChromosome {
        let n = self.sessions.len();
        let mut order: Vec<usize> = (0..n).collect();
        match strategy {
            SeedStrategy::Greedy => order.sort_by_key(|&s| (self.sessions[s].slot, s)),
            SeedStrategy::Batch => {}
            SeedStrategy::Random => order.shuffle(rng),
        }

        let mut genes = vec![Gene::Uncovered; n];
        let mut booked: HashSet<(usize, TimeSlot)> = HashSet::new();
        let mut load = vec![0u32; self.teachers.len()];

        for s in order {
            let slot = self.sessions[s].slot;
            let free: Vec<usize> = self.candidates[s]
                .iter()
                .copied()
                .filter(|&t| !booked.contains(&(t, slot)))
                .collect();

            let pick = match strategy {
                SeedStrategy::Greedy => {
                    let least = free.iter().map(|&t| load[t]).min();
                    let lightest: Vec<usize> = free
                        .iter()
                        .copied()
                        .filter(|&t| Some(load[t]) == least)
                        .collect();
                    lightest.choose(rng).copied()
                }
                SeedStrategy::Batch | SeedStrategy::Random => free.choose(rng).copied(),
            };

            if let Some(t) = pick {
                genes[s] = Gene::Teacher(t);
                booked.insert((t, slot));
                load[t] += 1;
            }
        }

        CoverChromosome::new(genes)
    }

    /// Creates the initial population: 30% greedy, 30% batch, the rest random.
    pub fn seed_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<CoverChromosome> {
        let greedy = size * 3 / 10;
        let batch = size * 3 / 10;
        (0..size)
            .map(|i| {
                let strategy = if i < greedy {
                    SeedStrategy::Greedy
                } else if i < greedy + batch {
                    SeedStrategy::Batch
                } else {
                    SeedStrategy::Random
                };
                self.create_individual(strategy, rng)
            })
            .collect()
    }
}

fn pair_flags(
    session: &Session,
    class: Option<&ClassEntity>,
    teacher: &TeacherEntity,
    allow_self: bool,
) -> PairFlags {
    let own_hour = session.replaces(&teacher.id);
    let teaches_class = own_hour || class.is_some_and(|c| c.is_taught_by(&teacher.id));
    PairFlags {
        ineligible: !teacher.is_eligible_for(&session.class_id),
        // A teacher covering their own hour is in that room anyway.
        unavailable: !(own_hour && allow_self) && !teacher.is_available_at(&session.slot),
        self_cover: teaches_class && !allow_self,
    }
}

fn dense_ids<K, I>(keys: I) -> Vec<usize>
where
    K: std::hash::Hash + Eq,
    I: Iterator<Item = K>,
{
    let mut ids: HashMap<K, usize> = HashMap::new();
    keys.map(|k| {
        let next = ids.len();
        *ids.entry(k).or_insert(next)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Availability;
    use chrono::{NaiveDate, Weekday};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn slot(d: u32, period: u8) -> TimeSlot {
        TimeSlot::new(NaiveDate::from_ymd_opt(2024, 10, d).unwrap(), period)
    }

    fn sample_sessions() -> Vec<Session> {
        vec![
            Session::new(0, "1A", slot(14, 1), Some("ROSSI".into())),
            Session::new(1, "2B", slot(14, 1), Some("VERDI".into())),
            Session::new(2, "1A", slot(21, 2), Some("BIANCHI".into())),
        ]
    }

    fn sample_teachers() -> Vec<TeacherEntity> {
        vec![
            TeacherEntity::new("ROSSI").with_classes(["1A", "2B"]),
            TeacherEntity::new("NERI")
                .with_class("1A")
                .with_availability(Availability::never().with_available(Weekday::Mon, 1)),
            TeacherEntity::new("GIALLI").with_class("3C"),
        ]
    }

    #[test]
    fn test_candidates_respect_eligibility_and_availability() {
        let sessions = sample_sessions();
        let teachers = sample_teachers();
        let problem = CoverProblem::from_sessions(&sessions, &[], &teachers, true);

        assert_eq!(problem.candidates(0), &[0, 1]);
        assert_eq!(problem.candidates(1), &[0]);
        // NERI is only free on Monday period 1
        assert_eq!(problem.candidates(2), &[0]);
        assert!(problem.flags(0, 2).ineligible);
        assert!(problem.flags(2, 1).unavailable);
    }

    #[test]
    fn test_self_cover_flag() {
        let sessions = sample_sessions();
        let teachers = sample_teachers();

        let allowed = CoverProblem::from_sessions(&sessions, &[], &teachers, true);
        assert!(allowed.flags(0, 0).is_clear());

        let forbidden = CoverProblem::from_sessions(&sessions, &[], &teachers, false);
        assert!(forbidden.flags(0, 0).self_cover);
        assert_eq!(forbidden.candidates(0), &[1]);
    }

    #[test]
    fn test_self_cover_implies_available_when_allowed() {
        let sessions = vec![Session::new(0, "1A", slot(14, 3), Some("ROSSI".into()))];
        let teachers = vec![TeacherEntity::new("ROSSI")
            .with_class("1A")
            .with_availability(Availability::never())];

        let allowed = CoverProblem::from_sessions(&sessions, &[], &teachers, true);
        assert_eq!(allowed.candidates(0), &[0]);

        let forbidden = CoverProblem::from_sessions(&sessions, &[], &teachers, false);
        let f = forbidden.flags(0, 0);
        assert!(f.self_cover && f.unavailable);
        assert_eq!(f.count(), 2);
    }

    #[test]
    fn test_forbidden_self_cover_applies_to_whole_class() {
        // ROSSI teaches 1A on Monday only; the Wednesday hour belongs to BIANCHI
        let classes = vec![ClassEntity::new("1A")
            .with_lesson(Weekday::Mon, 1, "ROSSI")
            .with_lesson(Weekday::Wed, 2, "BIANCHI")];
        let sessions = vec![
            Session::new(0, "1A", slot(14, 1), Some("ROSSI".into())),
            Session::new(1, "1A", slot(16, 2), Some("BIANCHI".into())),
        ];
        let teachers = vec![
            TeacherEntity::new("ROSSI").with_class("1A"),
            TeacherEntity::new("NERI").with_class("1A"),
        ];

        let forbidden = CoverProblem::from_sessions(&sessions, &classes, &teachers, false);
        assert!(forbidden.flags(0, 0).self_cover);
        assert!(forbidden.flags(1, 0).self_cover);
        assert_eq!(forbidden.candidates(0), &[1]);
        assert_eq!(forbidden.candidates(1), &[1]);

        let allowed = CoverProblem::from_sessions(&sessions, &classes, &teachers, true);
        assert_eq!(allowed.candidates(1), &[0, 1]);
    }

    #[test]
    fn test_dense_ids() {
        let sessions = sample_sessions();
        let teachers = sample_teachers();
        let problem = CoverProblem::from_sessions(&sessions, &[], &teachers, true);
        assert_eq!(problem.slot_id(0), problem.slot_id(1));
        assert_ne!(problem.slot_id(0), problem.slot_id(2));
        assert_ne!(problem.week_id(0), problem.week_id(2));
        assert_eq!(problem.balanced_count(), 2);
    }

    #[test]
    fn test_sample_gene() {
        let sessions = sample_sessions();
        let teachers = sample_teachers();
        let problem = CoverProblem::from_sessions(&sessions, &[], &teachers, false);
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..20 {
            // only NERI is admissible for session 0 when self-cover is forbidden
            assert_eq!(problem.sample_gene(0, &mut rng), Gene::Teacher(1));
        }
        let empty = CoverProblem::from_sessions(&sessions, &[], &[], true);
        assert_eq!(empty.sample_gene(0, &mut rng), Gene::Uncovered);
    }

    #[test]
    fn test_seed_never_double_books() {
        let sessions = sample_sessions();
        let teachers = sample_teachers();
        let problem = CoverProblem::from_sessions(&sessions, &[], &teachers, true);
        let mut rng = SmallRng::seed_from_u64(7);

        for strategy in [SeedStrategy::Greedy, SeedStrategy::Batch, SeedStrategy::Random] {
            for _ in 0..20 {
                let ch = problem.create_individual(strategy, &mut rng);
                assert_eq!(ch.len(), 3);
                // sessions 0 and 1 share a slot
                if let (Gene::Teacher(a), Gene::Teacher(b)) = (ch.genes[0], ch.genes[1]) {
                    assert_ne!(a, b);
                }
                for (s, gene) in ch.genes.iter().enumerate() {
                    if let Gene::Teacher(t) = gene {
                        assert!(problem.candidates(s).contains(t));
                    }
                }
            }
        }
    }

    #[test]
    fn test_seed_population_size_and_unscored() {
        let sessions = sample_sessions();
        let teachers = sample_teachers();
        let problem = CoverProblem::from_sessions(&sessions, &[], &teachers, true);
        let mut rng = SmallRng::seed_from_u64(1);

        let population = problem.seed_population(11, &mut rng);
        assert_eq!(population.len(), 11);
        assert!(population.iter().all(|c| c.fitness.is_none()));
    }
}
