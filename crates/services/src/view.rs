//! Read-only session snapshot for the presentation layer.

use serde::Serialize;

use exam_core::model::Question;
use exam_core::session::{ExamSession, FailSignal, SessionStatus, SlotStatus};

/// Everything a view needs to render one moment of the exam.
///
/// Rebuilt from the live session after every command; nothing in here is
/// cached across commands (defer reorders questions and answers together, so
/// a stale snapshot would point at the wrong slots).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamSnapshot {
    pub status: SessionStatus,
    pub fail_signal: Option<FailSignal>,
    pub current_index: usize,
    pub current_question: Option<Question>,
    pub answers: Vec<Option<String>>,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub total_questions: usize,
    pub elapsed_secs: u32,
    pub remaining_secs: u32,
    pub review: Vec<SlotStatus>,
}

impl ExamSnapshot {
    #[must_use]
    pub fn of(session: &ExamSession) -> Self {
        let counts = session.counts();
        Self {
            status: session.status(),
            fail_signal: session.fail_signal(),
            current_index: session.current_index(),
            current_question: session.current_question().cloned(),
            answers: session.answers().to_vec(),
            correct_count: counts.correct,
            wrong_count: counts.wrong,
            total_questions: session.total(),
            elapsed_secs: session.elapsed_secs(),
            remaining_secs: session.remaining_secs(),
            review: session.review_index(),
        }
    }

    /// Result-screen percentage, floored like the original display.
    #[must_use]
    pub fn score_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let total = u64::try_from(self.total_questions).unwrap_or(u64::MAX);
        u32::try_from(u64::from(self.correct_count) * 100 / total).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::category::CategoryConfig;
    use exam_core::model::{QuestionId, TopicId, VehicleId};
    use std::collections::HashSet;

    fn question(id: u32) -> Question {
        Question::new(
            QuestionId::new(format!("q{id}")),
            format!("Question {id}"),
            None,
            vec!["right".into(), "wrong".into()],
            "right",
            TopicId::new("t"),
            HashSet::from([VehicleId::new("v")]),
        )
        .unwrap()
    }

    #[test]
    fn snapshot_mirrors_session_state() {
        let mut session = ExamSession::new(
            (1..=3).map(question).collect(),
            CategoryConfig::new(30, 1800, 4),
        )
        .unwrap();
        session.submit_answer("wrong").unwrap();
        session.advance().unwrap();

        let snapshot = ExamSnapshot::of(&session);
        assert_eq!(snapshot.status, SessionStatus::Active);
        assert_eq!(snapshot.current_index, 1);
        assert_eq!(snapshot.wrong_count, 1);
        assert_eq!(snapshot.total_questions, 3);
        assert_eq!(snapshot.remaining_secs, 1800);
        assert_eq!(
            snapshot.review,
            vec![
                SlotStatus::AnsweredWrong,
                SlotStatus::Current,
                SlotStatus::Unanswered,
            ]
        );
    }

    #[test]
    fn score_percent_floors() {
        let mut session = ExamSession::new(
            (1..=3).map(question).collect(),
            CategoryConfig::new(30, 1800, 4),
        )
        .unwrap();
        session.submit_answer("right").unwrap();

        let snapshot = ExamSnapshot::of(&session);
        // 1/3 -> 33, floored.
        assert_eq!(snapshot.score_percent(), 33);
    }
}
