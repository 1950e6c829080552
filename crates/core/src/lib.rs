#![forbid(unsafe_code)]

pub mod category;
pub mod model;
pub mod scoring;
pub mod session;

pub use category::{CategoryConfig, ExamCategory, PASS_RATIO};
pub use model::{Question, QuestionError, QuestionId, TopicId, VehicleId};
pub use scoring::ScoreCounts;
pub use session::{
    AdvanceOutcome, ExamSession, FailPolicy, FailSignal, SessionError, SessionStatus, SlotStatus,
    SubmitOutcome, TickOutcome,
};
