mod bucket;
mod question;
mod session;

pub use bucket::ScoringBucket;
pub use question::{Choice, Question, questions_from_json};
pub use session::{AnswerRecord, SessionSnapshot, SessionStatus};
