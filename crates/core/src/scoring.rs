use crate::model::{Question, ScoringBucket};

/// Highest choice score for a question, or 0 when it has no choices.
#[must_use]
pub fn max_choice_score(question: &Question) -> f64 {
    question
        .choices
        .iter()
        .map(|c| c.score)
        .reduce(f64::max)
        .unwrap_or(0.0)
}

/// Sum of the best attainable score for every question in the pool.
#[must_use]
pub fn max_possible_score(pool: &[Question]) -> f64 {
    pool.iter().map(max_choice_score).sum()
}

/// Normalize a raw total to a 0..=100 percentage, rounding halves up.
///
/// A zero maximum yields 0 instead of dividing by zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn final_score(total_score: f64, max_possible_score: f64) -> u32 {
    if max_possible_score == 0.0 {
        return 0;
    }
    let percent = (total_score / max_possible_score * 100.0 + 0.5).floor();
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0) as u32
}

/// Label of the first bucket whose inclusive range contains `final_score`.
#[must_use]
pub fn score_bucket(final_score: u32, buckets: &[ScoringBucket]) -> Option<&str> {
    let score = f64::from(final_score);
    buckets
        .iter()
        .find(|bucket| bucket.contains(score))
        .map(|bucket| bucket.label.as_str())
}
