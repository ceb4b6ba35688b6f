pub mod runner;

pub use runner::{CancelToken, ParseOperation, TaskRunner, TaskState};
