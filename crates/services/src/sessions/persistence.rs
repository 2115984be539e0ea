use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use thiserror::Error;
use tracing::{debug, info, warn};

use quiz_core::model::SessionSnapshot;

use super::service::QuizSession;
use crate::error::SessionError;

/// What `load_state` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No storage key or store is configured.
    Skipped,
    /// The store has no entry under the session key.
    Missing,
    /// The stored entry could not be decoded; the session was left untouched.
    Discarded,
    /// The session now reflects the stored snapshot.
    Restored,
}

#[derive(Debug, Error)]
enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

fn encode_snapshot(snapshot: &SessionSnapshot, encode_text: bool) -> Result<String, SessionError> {
    let json = serde_json::to_string(snapshot).map_err(SessionError::Encode)?;
    if encode_text {
        Ok(BASE64_STANDARD.encode(json))
    } else {
        Ok(json)
    }
}

fn decode_snapshot(raw: &str, encode_text: bool) -> Result<SessionSnapshot, DecodeError> {
    let json = if encode_text {
        String::from_utf8(BASE64_STANDARD.decode(raw)?)?
    } else {
        raw.to_owned()
    };
    Ok(serde_json::from_str(&json)?)
}

impl QuizSession {
    /// Write a snapshot of the session under `namespace:key`.
    ///
    /// Does nothing when no storage key or store is configured.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store rejects the write, or
    /// `SessionError::Encode` if the snapshot cannot be serialized.
    pub async fn save_state(&self) -> Result<(), SessionError> {
        let (Some(key), Some(store)) = (self.config().namespaced_key(), self.store()) else {
            debug!("persistence not configured; save skipped");
            return Ok(());
        };
        let snapshot = self.snapshot(self.clock().now_millis());
        let payload = encode_snapshot(&snapshot, self.config().encrypt_storage)?;
        store.set(&key, payload).await?;
        info!(
            key = %key,
            current = snapshot.current_question_index,
            status = %snapshot.status,
            "quiz session saved"
        );
        Ok(())
    }

    /// Restore progress from the store, then resample the pool.
    ///
    /// A stored entry that cannot be decoded is discarded with a warning and
    /// the in-memory session is left as it was. Timers are not re-armed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store cannot be read.
    pub async fn load_state(&self) -> Result<LoadOutcome, SessionError> {
        let (Some(key), Some(store)) = (self.config().namespaced_key(), self.store()) else {
            debug!("persistence not configured; load skipped");
            return Ok(LoadOutcome::Skipped);
        };
        let Some(raw) = store.get(&key).await? else {
            debug!(key = %key, "no saved quiz session");
            return Ok(LoadOutcome::Missing);
        };
        match decode_snapshot(&raw, self.config().encrypt_storage) {
            Ok(snapshot) => {
                self.restore(snapshot);
                Ok(LoadOutcome::Restored)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "invalid saved quiz session; discarded");
                Ok(LoadOutcome::Discarded)
            }
        }
    }

    /// Remove the stored snapshot, if persistence is configured.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store cannot be written.
    pub async fn clear_saved_state(&self) -> Result<(), SessionError> {
        let (Some(key), Some(store)) = (self.config().namespaced_key(), self.store()) else {
            return Ok(());
        };
        store.remove(&key).await?;
        debug!(key = %key, "saved quiz session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerRecord, SessionStatus};

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            current_question_index: 1,
            review_mode: false,
            total_score: 10.0,
            status: SessionStatus::InProgress,
            answer_history: vec![AnswerRecord {
                question_index: 0,
                choice_index: Some(0),
                score: 10.0,
            }],
            start_timestamp: Some(1_700_000_000_000),
            saved_at: 1_700_000_005_000,
        }
    }

    #[test]
    fn plain_encoding_is_json() {
        let raw = encode_snapshot(&snapshot(), false).unwrap();
        assert!(raw.starts_with('{'));
        assert!(raw.contains("\"currentQuestionIndex\":1"));
        assert!(raw.contains("\"status\":\"in-progress\""));
        assert_eq!(decode_snapshot(&raw, false).unwrap(), snapshot());
    }

    #[test]
    fn encoded_text_is_base64_of_json() {
        let raw = encode_snapshot(&snapshot(), true).unwrap();
        assert!(!raw.contains('{'));
        let json = String::from_utf8(BASE64_STANDARD.decode(&raw).unwrap()).unwrap();
        assert!(json.starts_with('{'));
        assert_eq!(decode_snapshot(&raw, true).unwrap(), snapshot());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_snapshot("not json", false),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_snapshot("%%%", true),
            Err(DecodeError::Base64(_))
        ));
        let plain = encode_snapshot(&snapshot(), false).unwrap();
        assert!(decode_snapshot(&plain, true).is_err());
    }

    #[test]
    fn decode_rejects_unknown_status() {
        let raw = r#"{"currentQuestionIndex":0,"totalScore":0,"status":"paused"}"#;
        assert!(decode_snapshot(raw, false).is_err());
    }
}
