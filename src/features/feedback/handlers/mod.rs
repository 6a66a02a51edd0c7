pub mod feedback_handler;

pub use feedback_handler::{__path_submit_feedback, method_not_allowed, submit_feedback};
