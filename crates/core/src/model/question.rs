use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{QuestionId, TopicId, VehicleId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question title cannot be empty")]
    EmptyTitle,

    #[error("question needs at least two options, got {got}")]
    TooFewOptions { got: usize },

    #[error("duplicate option within a question: {option}")]
    DuplicateOption { option: String },

    #[error("correct answer is not one of the options: {answer}")]
    AnswerNotAnOption { answer: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice exam question.
///
/// Immutable once constructed; `new` enforces that the option list is usable
/// (non-empty title, at least two unique options, and a correct answer that is
/// one of them), so session code can trust the data without re-checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    title: String,
    photo_url: Option<String>,
    options: Vec<String>,
    correct_answer: String,
    topic_id: TopicId,
    vehicle_ids: HashSet<VehicleId>,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns a `QuestionError` when the title is blank, fewer than two
    /// options are given, an option repeats, or the correct answer is not
    /// among the options.
    pub fn new(
        id: QuestionId,
        title: impl Into<String>,
        photo_url: Option<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        topic_id: TopicId,
        vehicle_ids: HashSet<VehicleId>,
    ) -> Result<Self, QuestionError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuestionError::EmptyTitle);
        }

        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions { got: options.len() });
        }

        let mut seen = HashSet::new();
        for option in &options {
            if !seen.insert(option.as_str()) {
                return Err(QuestionError::DuplicateOption {
                    option: option.clone(),
                });
            }
        }

        let correct_answer = correct_answer.into();
        if !options.iter().any(|option| *option == correct_answer) {
            return Err(QuestionError::AnswerNotAnOption {
                answer: correct_answer,
            });
        }

        Ok(Self {
            id,
            title,
            photo_url,
            options,
            correct_answer,
            topic_id,
            vehicle_ids,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn vehicle_ids(&self) -> &HashSet<VehicleId> {
        &self.vehicle_ids
    }

    /// Returns true when the given option matches this question's answer.
    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }

    /// Returns true when this question belongs to the given vehicle.
    #[must_use]
    pub fn applies_to(&self, vehicle: &VehicleId) -> bool {
        self.vehicle_ids.contains(vehicle)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
