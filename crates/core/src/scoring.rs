use serde::Serialize;

use crate::category::PASS_RATIO;
use crate::model::Question;

/// Running correctness counters for a session.
///
/// Sessions maintain these incrementally; `recount` rebuilds them from
/// scratch so the two can be checked against each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreCounts {
    pub correct: u32,
    pub wrong: u32,
}

impl ScoreCounts {
    /// Recompute both counters from the answer slots.
    ///
    /// A slot counts as correct when it holds exactly the question's answer,
    /// wrong when it holds anything else, and is skipped while unanswered.
    #[must_use]
    pub fn recount(questions: &[Question], answers: &[Option<String>]) -> Self {
        let mut counts = Self::default();
        for (question, answer) in questions.iter().zip(answers) {
            match answer {
                Some(option) if question.is_correct(option) => counts.correct += 1,
                Some(_) => counts.wrong += 1,
                None => {}
            }
        }
        counts
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.correct + self.wrong
    }
}

/// Final pass/fail verdict: `correct / total >= 26/30`.
///
/// Compared by cross-multiplication so the 26-of-30 boundary lands exactly on
/// the threshold without float rounding. An empty exam never passes.
#[must_use]
pub fn passes(correct: u32, total: usize) -> bool {
    let (num, denom) = PASS_RATIO;
    let total = u64::try_from(total).unwrap_or(u64::MAX);
    if total == 0 {
        return false;
    }
    u64::from(correct) * u64::from(denom) >= total * u64::from(num)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
