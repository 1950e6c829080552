#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod flow;
pub mod pool;
pub mod sources;
pub mod timer;
pub mod view;

pub use controller::{ControllerSettings, ExamController};
pub use error::{ExamFlowError, FetchError, PoolError};
pub use flow::ExamFlowService;
pub use pool::PoolBuilder;
pub use sources::{ExamApiConfig, HttpExamApi, InMemoryExamApi, QuestionSource, VehicleSource};
pub use view::ExamSnapshot;
