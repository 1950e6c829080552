mod ids;
mod question;

pub use ids::{QuestionId, TopicId, VehicleId};
pub use question::{Question, QuestionError};
