use std::fmt;

use serde::{Deserialize, Serialize};

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session.
///
/// `Started` is transient: `start` resolves it to `InProgress` or `Completed`
/// before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Started,
    InProgress,
    Completed,
}

impl SessionStatus {
    /// Stable label used by callers and in persisted snapshots.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Started => "started",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// One entry per question advanced past, in pool order.
///
/// `choice_index` is the raw submitted index. It may be out of range for the
/// question's choices, in which case `score` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_index: usize,
    pub choice_index: Option<usize>,
    pub score: f64,
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Persisted shape of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub current_question_index: usize,
    #[serde(default)]
    pub review_mode: bool,
    pub total_score: f64,
    pub status: SessionStatus,
    #[serde(default)]
    pub answer_history: Vec<AnswerRecord>,
    #[serde(default)]
    pub start_timestamp: Option<i64>,
    /// Write time in epoch milliseconds; informational only.
    #[serde(default)]
    pub saved_at: i64,
}
