mod active;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use active::{ActiveQuiz, SessionView};
pub use workflow::{CompletedQuiz, QuizLoopService, Submission};
