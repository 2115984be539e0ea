//! Helpers for presenting finished sessions.

use std::collections::BTreeMap;

use crate::model::{AnswerRecord, Question};

/// Clamp a score into `[min, max]`.
#[must_use]
pub fn clamp_score(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Render a percentage, clamped to 0..=100, e.g. `"83%"`.
#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{}%", clamp_score(score, 0.0, 100.0))
}

/// Group answers under every tag of the pool question they refer to.
///
/// Records pointing past the end of `pool` are skipped.
#[must_use]
pub fn group_answers_by_tag<'a>(
    pool: &[Question],
    answers: &'a [AnswerRecord],
) -> BTreeMap<String, Vec<&'a AnswerRecord>> {
    let mut grouped: BTreeMap<String, Vec<&AnswerRecord>> = BTreeMap::new();
    for answer in answers {
        let Some(question) = pool.get(answer.question_index) else {
            continue;
        };
        for tag in &question.tags {
            grouped.entry(tag.clone()).or_default().push(answer);
        }
    }
    grouped
}

/// Mean score of the given records, 0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_score<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a AnswerRecord>,
{
    let (sum, count) = records
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), r| (sum + r.score, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
