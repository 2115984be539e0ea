use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single selectable answer with the points it is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub score: f64,
}

impl Choice {
    #[must_use]
    pub fn new(text: impl Into<String>, score: f64) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// An authored question: prompt text, ordered choices and optional tags.
///
/// Sessions never mutate the authored list; every session works on its own
/// copies produced by the pool builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn new(question: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            question: question.into(),
            choices,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns the choice at `index`, if it exists.
    #[must_use]
    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }
}

/// Parse an authored question list from a JSON array.
///
/// # Errors
///
/// Returns `Error::QuestionSet` if the document is not a valid question array.
pub fn questions_from_json(raw: &str) -> Result<Vec<Question>, Error> {
    Ok(serde_json::from_str(raw)?)
}
