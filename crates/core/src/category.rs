use serde::Serialize;

/// Minimum fraction of correct answers required to pass, as
/// (numerator, denominator). One global constant for all categories.
pub const PASS_RATIO: (u32, u32) = (26, 30);

/// Difficulty tier derived from the selected vehicle's class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExamCategory {
    /// Truck/bus classes (C or D).
    Heavy,
    /// Everything else.
    Light,
}

impl ExamCategory {
    /// Classify a vehicle by its display name.
    ///
    /// The class token is the first whitespace-separated word, lowercased.
    /// A vehicle is heavy when that token contains a `c` or a `d` anywhere,
    /// not only as the whole class letter. That substring test is a deliberate
    /// port of the upstream behavior: a class named "bcd-hybrid" counts as
    /// heavy.
    #[must_use]
    pub fn from_display_name(display_name: &str) -> Self {
        let token = display_name
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        if token.contains('c') || token.contains('d') {
            Self::Heavy
        } else {
            Self::Light
        }
    }
}

/// Exam parameters for one session, fixed at vehicle selection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryConfig {
    question_limit: usize,
    duration_secs: u32,
    wrong_answer_limit: u32,
}

impl CategoryConfig {
    /// Build an arbitrary configuration. Mostly useful for tests that need
    /// short durations or tight wrong-answer limits.
    #[must_use]
    pub fn new(question_limit: usize, duration_secs: u32, wrong_answer_limit: u32) -> Self {
        Self {
            question_limit,
            duration_secs,
            wrong_answer_limit,
        }
    }

    /// Parameters for a category tier: 40 questions / 2400 s / 5 wrong for
    /// heavy, 30 questions / 1800 s / 4 wrong for light.
    #[must_use]
    pub fn for_category(category: ExamCategory) -> Self {
        match category {
            ExamCategory::Heavy => Self::new(40, 2400, 5),
            ExamCategory::Light => Self::new(30, 1800, 4),
        }
    }

    /// Derive the configuration straight from a vehicle display name.
    #[must_use]
    pub fn classify(display_name: &str) -> Self {
        Self::for_category(ExamCategory::from_display_name(display_name))
    }

    #[must_use]
    pub fn question_limit(&self) -> usize {
        self.question_limit
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn wrong_answer_limit(&self) -> u32 {
        self.wrong_answer_limit
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
