mod config;
mod hooks;
mod persistence;
mod progress;
mod service;
mod timer;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use config::QuizConfig;
pub use hooks::SessionHooks;
pub use persistence::LoadOutcome;
pub use progress::SessionProgress;
pub use service::{QuizSession, QuizSessionBuilder, ReviewItem};
