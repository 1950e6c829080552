//! Composes the sources into a runnable exam: fetch, classify, build, start.

use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use exam_core::category::CategoryConfig;
use exam_core::model::{TopicId, VehicleId};

use crate::controller::{ControllerSettings, ExamController};
use crate::error::ExamFlowError;
use crate::pool::PoolBuilder;
use crate::sources::{QuestionSource, VehicleSource};

/// Orchestrates exam start and restart against the external sources.
///
/// There is no session state here: an `ExamController` either exists (the
/// exam is running) or it does not (idle, or a start is in flight). A failed
/// start leaves the caller exactly where they were, free to try again; there
/// is no automatic retry.
#[derive(Clone)]
pub struct ExamFlowService {
    questions: Arc<dyn QuestionSource>,
    vehicles: Arc<dyn VehicleSource>,
    settings: ControllerSettings,
    seed: Option<u64>,
}

impl ExamFlowService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionSource>, vehicles: Arc<dyn VehicleSource>) -> Self {
        Self {
            questions,
            vehicles,
            settings: ControllerSettings::default(),
            seed: None,
        }
    }

    /// Settings applied to every controller this flow starts.
    #[must_use]
    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Fix the shuffle seed, producing the same exam for the same inputs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fetch, classify, build the pool, and start a live exam.
    ///
    /// Also the restart-with-new-questions path: drop (or pass in) the old
    /// controller and call this again; its timer is released with it.
    ///
    /// # Errors
    ///
    /// Returns `ExamFlowError::Fetch` for source failures,
    /// `ExamFlowError::Pool` when the filters match nothing, and
    /// `ExamFlowError::Session` if the built pool cannot start.
    pub async fn start_exam(
        &self,
        vehicle: &VehicleId,
        topics: &HashSet<TopicId>,
    ) -> Result<ExamController, ExamFlowError> {
        let candidates = self.questions.fetch_candidates(vehicle, topics).await?;
        let display_name = self.vehicles.display_name(vehicle).await?;
        let config = CategoryConfig::classify(&display_name);
        debug!(%vehicle, candidates = candidates.len(), ?config, "starting exam");

        let builder = PoolBuilder::new(vehicle, topics);
        let pool = match self.seed {
            Some(seed) => builder.build(candidates, &config, &mut StdRng::seed_from_u64(seed))?,
            None => builder.build(candidates, &config, &mut rand::rng())?,
        };

        Ok(ExamController::new(pool, config, self.settings)?)
    }

    /// Restart with freshly fetched questions, consuming the previous
    /// controller first so its timer is released before the fetch begins.
    ///
    /// # Errors
    ///
    /// Same as `start_exam`; on failure the caller is left without a session,
    /// as after any failed start.
    pub async fn restart_exam(
        &self,
        previous: ExamController,
        vehicle: &VehicleId,
        topics: &HashSet<TopicId>,
    ) -> Result<ExamController, ExamFlowError> {
        drop(previous);
        self.start_exam(vehicle, topics).await
    }
}
