//! Builds the fixed question set for one session: filter, shuffle, cap.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use exam_core::category::CategoryConfig;
use exam_core::model::{Question, TopicId, VehicleId};

use crate::error::PoolError;

/// Builds a session pool from raw candidates.
///
/// A candidate is kept only when it matches the vehicle AND one of the
/// selected topics; neither predicate alone is enough. The filtered set is
/// shuffled (Fisher–Yates via `SliceRandom`) and truncated to the category's
/// question limit. The permutation is fully determined by the caller's rng,
/// so a seeded rng reproduces the same exam.
pub struct PoolBuilder<'a> {
    vehicle: &'a VehicleId,
    topics: &'a HashSet<TopicId>,
}

impl<'a> PoolBuilder<'a> {
    #[must_use]
    pub fn new(vehicle: &'a VehicleId, topics: &'a HashSet<TopicId>) -> Self {
        Self { vehicle, topics }
    }

    /// Build the shuffled, size-capped pool.
    ///
    /// When fewer candidates survive the filter than the limit, all of them
    /// are kept; there is no padding.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Empty` when no candidate matches both filters.
    pub fn build<R: Rng>(
        self,
        candidates: impl IntoIterator<Item = Question>,
        config: &CategoryConfig,
        rng: &mut R,
    ) -> Result<Vec<Question>, PoolError> {
        let mut pool: Vec<Question> = candidates
            .into_iter()
            .filter(|question| {
                question.applies_to(self.vehicle) && self.topics.contains(question.topic_id())
            })
            .collect();

        if pool.is_empty() {
            return Err(PoolError::Empty);
        }

        pool.as_mut_slice().shuffle(rng);
        let filtered = pool.len();
        pool.truncate(config.question_limit());

        debug!(filtered, selected = pool.len(), "built exam question pool");
        Ok(pool)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::QuestionId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: u32, topic: &str, vehicles: &[&str]) -> Question {
        Question::new(
            QuestionId::new(format!("q{id}")),
            format!("Question {id}"),
            None,
            vec!["a".into(), "b".into()],
            "a",
            TopicId::new(topic),
            vehicles.iter().map(|v| VehicleId::new(*v)).collect(),
        )
        .unwrap()
    }

    fn ids(pool: &[Question]) -> Vec<String> {
        pool.iter().map(|q| q.id().value().to_string()).collect()
    }

    #[test]
    fn filter_requires_both_vehicle_and_topic() {
        let candidates = vec![
            question(1, "t1", &["v1"]),        // matches both
            question(2, "t1", &["v2"]),        // wrong vehicle
            question(3, "t9", &["v1"]),        // wrong topic
            question(4, "t2", &["v1", "v2"]), // matches both
        ];
        let vehicle = VehicleId::new("v1");
        let topics = HashSet::from([TopicId::new("t1"), TopicId::new("t2")]);
        let config = CategoryConfig::new(30, 1800, 4);

        let pool = PoolBuilder::new(&vehicle, &topics)
            .build(candidates, &config, &mut StdRng::seed_from_u64(7))
            .unwrap();

        let mut got = ids(&pool);
        got.sort();
        assert_eq!(got, ["q1", "q4"]);
    }

    #[test]
    fn shuffle_is_a_permutation_and_seed_reproducible() {
        let candidates: Vec<Question> =
            (1..=20).map(|i| question(i, "t1", &["v1"])).collect();
        let vehicle = VehicleId::new("v1");
        let topics = HashSet::from([TopicId::new("t1")]);
        let config = CategoryConfig::new(100, 1800, 4);

        let first = PoolBuilder::new(&vehicle, &topics)
            .build(candidates.clone(), &config, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let second = PoolBuilder::new(&vehicle, &topics)
            .build(candidates.clone(), &config, &mut StdRng::seed_from_u64(42))
            .unwrap();

        // Same seed, same order.
        assert_eq!(ids(&first), ids(&second));

        // Same multiset of ids as the input.
        let mut got = ids(&first);
        got.sort();
        let mut expected = ids(&candidates);
        expected.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn pool_is_capped_to_question_limit() {
        let candidates: Vec<Question> =
            (1..=50).map(|i| question(i, "t1", &["v1"])).collect();
        let vehicle = VehicleId::new("v1");
        let topics = HashSet::from([TopicId::new("t1")]);
        let config = CategoryConfig::new(30, 1800, 4);

        let pool = PoolBuilder::new(&vehicle, &topics)
            .build(candidates, &config, &mut StdRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(pool.len(), 30);
    }

    #[test]
    fn short_supply_keeps_all_without_padding() {
        let candidates: Vec<Question> =
            (1..=5).map(|i| question(i, "t1", &["v1"])).collect();
        let vehicle = VehicleId::new("v1");
        let topics = HashSet::from([TopicId::new("t1")]);
        let config = CategoryConfig::new(30, 1800, 4);

        let pool = PoolBuilder::new(&vehicle, &topics)
            .build(candidates, &config, &mut StdRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn empty_filter_result_is_an_error() {
        let candidates = vec![question(1, "t1", &["v1"])];
        let vehicle = VehicleId::new("v1");
        let topics = HashSet::from([TopicId::new("other")]);
        let config = CategoryConfig::new(30, 1800, 4);

        let err = PoolBuilder::new(&vehicle, &topics)
            .build(candidates, &config, &mut StdRng::seed_from_u64(1))
            .unwrap_err();

        assert_eq!(err, PoolError::Empty);
    }
}
