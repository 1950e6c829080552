//! Question and vehicle sources: the remote exam API plus an in-memory fake.

use std::collections::{HashMap, HashSet};
use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use exam_core::model::{Question, QuestionId, TopicId, VehicleId};

use crate::error::FetchError;

//
// ─── SOURCE TRAITS ─────────────────────────────────────────────────────────────
//

/// Supplies raw candidate questions for a pool build.
///
/// Implementations may ignore the filters and return a superset; the pool
/// builder applies the vehicle/topic predicate either way.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_candidates(
        &self,
        vehicle: &VehicleId,
        topics: &HashSet<TopicId>,
    ) -> Result<Vec<Question>, FetchError>;
}

/// Resolves a vehicle id to its display name (used for category derivation).
#[async_trait]
pub trait VehicleSource: Send + Sync {
    async fn display_name(&self, vehicle: &VehicleId) -> Result<String, FetchError>;
}

//
// ─── HTTP SOURCE ───────────────────────────────────────────────────────────────
//

const DEFAULT_BASE_URL: &str = "https://traffic-solve-cors-backend.vercel.app/api";

#[derive(Clone, Debug)]
pub struct ExamApiConfig {
    pub base_url: String,
}

impl ExamApiConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("EXAM_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self { base_url }
    }
}

impl Default for ExamApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

/// Client for the remote exam backend.
#[derive(Clone)]
pub struct HttpExamApi {
    client: Client,
    config: ExamApiConfig,
}

impl HttpExamApi {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ExamApiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: ExamApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl QuestionSource for HttpExamApi {
    /// Fetch the full question list from the backend.
    ///
    /// The endpoint has no server-side filters, so the vehicle/topic
    /// arguments are left to the pool builder. Questions that fail domain
    /// validation are skipped with a warning rather than failing the fetch.
    async fn fetch_candidates(
        &self,
        _vehicle: &VehicleId,
        _topics: &HashSet<TopicId>,
    ) -> Result<Vec<Question>, FetchError> {
        let response = self.client.get(self.url("questions")).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: Vec<QuestionDto> = response.json().await?;
        let total = body.len();
        let questions: Vec<Question> = body
            .into_iter()
            .filter_map(|dto| {
                let id = dto.id.clone();
                match dto.into_question() {
                    Ok(question) => Some(question),
                    Err(err) => {
                        warn!(%id, %err, "skipping invalid question from exam API");
                        None
                    }
                }
            })
            .collect();
        debug!(total, kept = questions.len(), "fetched exam questions");
        Ok(questions)
    }
}

#[async_trait]
impl VehicleSource for HttpExamApi {
    async fn display_name(&self, vehicle: &VehicleId) -> Result<String, FetchError> {
        let url = self.url(&format!("vehicles/{vehicle}"));
        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::VehicleNotFound(vehicle.value().to_string()));
        }
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: VehicleDto = response.json().await?;
        Ok(body.name)
    }
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct QuestionDto {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    photo: Option<String>,
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: String,
    topic: TopicRef,
    vehicles: Vec<VehicleRef>,
}

#[derive(Debug, Deserialize)]
struct TopicRef {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct VehicleRef {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct VehicleDto {
    name: String,
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, exam_core::model::QuestionError> {
        Question::new(
            QuestionId::new(self.id),
            self.title,
            self.photo,
            self.options,
            self.correct_answer,
            TopicId::new(self.topic.id),
            self.vehicles
                .into_iter()
                .map(|vehicle| VehicleId::new(vehicle.id))
                .collect(),
        )
    }
}

//
// ─── IN-MEMORY SOURCE ──────────────────────────────────────────────────────────
//

/// Fixture-backed source for tests and offline demos.
#[derive(Clone, Default)]
pub struct InMemoryExamApi {
    questions: Vec<Question>,
    vehicles: HashMap<VehicleId, String>,
}

impl InMemoryExamApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_vehicle(mut self, id: VehicleId, display_name: impl Into<String>) -> Self {
        self.vehicles.insert(id, display_name.into());
        self
    }

    #[must_use]
    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = questions;
        self
    }
}

#[async_trait]
impl QuestionSource for InMemoryExamApi {
    async fn fetch_candidates(
        &self,
        _vehicle: &VehicleId,
        _topics: &HashSet<TopicId>,
    ) -> Result<Vec<Question>, FetchError> {
        Ok(self.questions.clone())
    }
}

#[async_trait]
impl VehicleSource for InMemoryExamApi {
    async fn display_name(&self, vehicle: &VehicleId) -> Result<String, FetchError> {
        self.vehicles
            .get(vehicle)
            .cloned()
            .ok_or_else(|| FetchError::VehicleNotFound(vehicle.value().to_string()))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_dto_maps_wire_names() {
        let json = r#"{
            "_id": "q1",
            "title": "Who yields?",
            "photo": "https://example.com/q1.png",
            "options": ["the car", "the truck"],
            "correctAnswer": "the truck",
            "topic": { "_id": "t1" },
            "vehicles": [{ "_id": "v1" }, { "_id": "v2" }]
        }"#;

        let dto: QuestionDto = serde_json::from_str(json).unwrap();
        let question = dto.into_question().unwrap();

        assert_eq!(question.id().value(), "q1");
        assert_eq!(question.correct_answer(), "the truck");
        assert_eq!(question.topic_id().value(), "t1");
        assert!(question.applies_to(&VehicleId::new("v2")));
    }

    #[test]
    fn question_dto_allows_missing_photo() {
        let json = r#"{
            "_id": "q2",
            "title": "Speed limit?",
            "photo": null,
            "options": ["50", "60"],
            "correctAnswer": "50",
            "topic": { "_id": "t1" },
            "vehicles": [{ "_id": "v1" }]
        }"#;

        let dto: QuestionDto = serde_json::from_str(json).unwrap();
        let question = dto.into_question().unwrap();
        assert_eq!(question.photo_url(), None);
    }

    #[test]
    fn invalid_dto_is_rejected_by_domain_validation() {
        let json = r#"{
            "_id": "q3",
            "title": "Broken",
            "photo": null,
            "options": ["only one"],
            "correctAnswer": "only one",
            "topic": { "_id": "t1" },
            "vehicles": []
        }"#;

        let dto: QuestionDto = serde_json::from_str(json).unwrap();
        assert!(dto.into_question().is_err());
    }

    #[tokio::test]
    async fn in_memory_source_errors_on_unknown_vehicle() {
        let api = InMemoryExamApi::new().with_vehicle(VehicleId::new("v1"), "B sedan");

        assert_eq!(
            api.display_name(&VehicleId::new("v1")).await.unwrap(),
            "B sedan"
        );
        let err = api.display_name(&VehicleId::new("nope")).await.unwrap_err();
        assert!(matches!(err, FetchError::VehicleNotFound(_)));
    }
}
