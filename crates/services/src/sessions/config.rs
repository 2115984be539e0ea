use std::time::Duration;

use serde::Deserialize;

use quiz_core::model::{Question, ScoringBucket, questions_from_json};
use quiz_core::pool::QuestionPoolBuilder;

use crate::error::SessionError;

const DEFAULT_NAMESPACE: &str = "quiz";

/// Construction options for a quiz session.
///
/// Every field is optional when deserialized; missing values fall back to the
/// defaults below. Time limits are in seconds and a zero or negative limit
/// means "unbounded".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct QuizConfig {
    pub questions: Vec<Question>,
    pub time_limit_per_question: Option<f64>,
    pub total_time_limit: Option<f64>,
    pub shuffle_questions: bool,
    pub shuffle_choices: bool,
    pub question_tags: Vec<String>,
    pub questions_per_tag: usize,
    pub scoring_buckets: Vec<ScoringBucket>,
    pub storage_key: Option<String>,
    pub storage_namespace: String,
    pub encrypt_storage: bool,
    /// Seed for shuffling and tag sampling; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            time_limit_per_question: None,
            total_time_limit: None,
            shuffle_questions: false,
            shuffle_choices: false,
            question_tags: Vec::new(),
            questions_per_tag: 1,
            scoring_buckets: Vec::new(),
            storage_key: None,
            storage_namespace: DEFAULT_NAMESPACE.to_owned(),
            encrypt_storage: false,
            seed: None,
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        serde_json::from_str(raw).map_err(SessionError::Config)
    }

    /// Replace the authored questions with a JSON question array.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` if the array cannot be parsed.
    pub fn with_questions_json(mut self, raw: &str) -> Result<Self, SessionError> {
        self.questions = questions_from_json(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_time_limit_per_question(mut self, limit: Duration) -> Self {
        self.time_limit_per_question = Some(limit.as_secs_f64());
        self
    }

    #[must_use]
    pub fn with_total_time_limit(mut self, limit: Duration) -> Self {
        self.total_time_limit = Some(limit.as_secs_f64());
        self
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    #[must_use]
    pub fn with_shuffle_choices(mut self, shuffle: bool) -> Self {
        self.shuffle_choices = shuffle;
        self
    }

    #[must_use]
    pub fn with_question_tags<I, S>(mut self, tags: I, questions_per_tag: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.question_tags = tags.into_iter().map(Into::into).collect();
        self.questions_per_tag = questions_per_tag;
        self
    }

    #[must_use]
    pub fn with_scoring_buckets(mut self, buckets: Vec<ScoringBucket>) -> Self {
        self.scoring_buckets = buckets;
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_storage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage_namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_encrypt_storage(mut self, encrypt: bool) -> Self {
        self.encrypt_storage = encrypt;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Per-question limit, if one is configured.
    #[must_use]
    pub fn question_time_limit(&self) -> Option<Duration> {
        positive_duration(self.time_limit_per_question)
    }

    /// Whole-session limit, if one is configured.
    #[must_use]
    pub fn session_time_limit(&self) -> Option<Duration> {
        positive_duration(self.total_time_limit)
    }

    /// Namespaced store key (`namespace:key`), or `None` when persistence is off.
    #[must_use]
    pub fn namespaced_key(&self) -> Option<String> {
        self.storage_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| format!("{}:{key}", self.storage_namespace))
    }

    /// True when rebuilding the pool can change its order or membership.
    #[must_use]
    pub fn resamples_pool(&self) -> bool {
        self.shuffle_questions || self.shuffle_choices || !self.question_tags.is_empty()
    }

    pub(crate) fn pool_builder(&self) -> QuestionPoolBuilder<'_> {
        QuestionPoolBuilder::new(&self.questions)
            .with_tags(&self.question_tags, self.questions_per_tag)
            .with_shuffle_questions(self.shuffle_questions)
            .with_shuffle_choices(self.shuffle_choices)
    }
}

fn positive_duration(secs: Option<f64>) -> Option<Duration> {
    secs.filter(|s| *s > 0.0)
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
}
