use rand::Rng;

use crate::model::Question;
use crate::shuffle::shuffle_in_place;

/// Derives the ordered question sequence presented in one session.
///
/// - Without tags, every authored question is used.
/// - With tags, each tag in order contributes up to `questions_per_tag` questions
///   sampled uniformly from the authored questions carrying it. A question with
///   several configured tags can be picked more than once.
/// - The assembled sequence is optionally shuffled as a whole, and each
///   question's choices are optionally shuffled independently.
///
/// Every call returns fresh copies; the authored list is never touched.
#[derive(Debug, Clone, Copy)]
pub struct QuestionPoolBuilder<'a> {
    questions: &'a [Question],
    tags: &'a [String],
    questions_per_tag: usize,
    shuffle_questions: bool,
    shuffle_choices: bool,
}

impl<'a> QuestionPoolBuilder<'a> {
    #[must_use]
    pub fn new(questions: &'a [Question]) -> Self {
        Self {
            questions,
            tags: &[],
            questions_per_tag: 1,
            shuffle_questions: false,
            shuffle_choices: false,
        }
    }

    /// Restrict the pool to a per-tag sample.
    #[must_use]
    pub fn with_tags(mut self, tags: &'a [String], questions_per_tag: usize) -> Self {
        self.tags = tags;
        self.questions_per_tag = questions_per_tag;
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

    pub fn build<R>(&self, rng: &mut R) -> Vec<Question>
    where
        R: Rng,
    {
        let mut base: Vec<&Question> = if self.tags.is_empty() {
            self.questions.iter().collect()
        } else {
            let mut tagged = Vec::new();
            for tag in self.tags {
                let mut tag_pool: Vec<&Question> =
                    self.questions.iter().filter(|q| q.has_tag(tag)).collect();
                shuffle_in_place(&mut tag_pool, rng);
                tagged.extend(tag_pool.into_iter().take(self.questions_per_tag));
            }
            tagged
        };

        if self.shuffle_questions {
            shuffle_in_place(&mut base, rng);
        }

        base.into_iter()
            .map(|question| {
                let mut copy = question.clone();
                if self.shuffle_choices {
                    shuffle_in_place(&mut copy.choices, rng);
                }
                copy
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(text: &str, tags: &[&str]) -> Question {
        Question::new(
            text,
            vec![
                Choice::new("a", 1.0),
                Choice::new("b", 2.0),
                Choice::new("c", 3.0),
                Choice::new("d", 4.0),
            ],
        )
        .with_tags(tags.iter().copied())
    }

    fn texts(pool: &[Question]) -> Vec<&str> {
        pool.iter().map(|q| q.question.as_str()).collect()
    }

    #[test]
    fn untagged_pool_keeps_authored_order() {
        let authored = vec![question("q1", &[]), question("q2", &[]), question("q3", &[])];
        let pool = QuestionPoolBuilder::new(&authored).build(&mut StdRng::seed_from_u64(1));

        assert_eq!(texts(&pool), vec!["q1", "q2", "q3"]);
        assert_eq!(pool, authored);
    }

    #[test]
    fn tag_sampling_follows_tag_order_and_limit() {
        let authored = vec![
            question("math1", &["math"]),
            question("art1", &["art"]),
            question("math2", &["math"]),
            question("art2", &["art"]),
            question("math3", &["math"]),
        ];
        let tags = vec!["art".to_owned(), "math".to_owned()];
        let pool = QuestionPoolBuilder::new(&authored)
            .with_tags(&tags, 2)
            .build(&mut StdRng::seed_from_u64(5));

        assert_eq!(pool.len(), 4);
        assert!(pool[..2].iter().all(|q| q.has_tag("art")));
        assert!(pool[2..].iter().all(|q| q.has_tag("math")));
        assert_ne!(pool[2].question, pool[3].question);
    }

    #[test]
    fn multi_tag_questions_are_not_deduplicated() {
        let authored = vec![question("both", &["a", "b"])];
        let tags = vec!["a".to_owned(), "b".to_owned()];
        let pool = QuestionPoolBuilder::new(&authored)
            .with_tags(&tags, 1)
            .build(&mut StdRng::seed_from_u64(0));

        assert_eq!(texts(&pool), vec!["both", "both"]);
    }

    #[test]
    fn unknown_tag_contributes_nothing() {
        let authored = vec![question("q", &["a"])];
        let tags = vec!["missing".to_owned()];
        let pool = QuestionPoolBuilder::new(&authored)
            .with_tags(&tags, 3)
            .build(&mut StdRng::seed_from_u64(0));
        assert!(pool.is_empty());
    }

    #[test]
    fn shuffling_preserves_membership_and_authored_list() {
        let authored: Vec<Question> = (0..10).map(|i| question(&format!("q{i}"), &[])).collect();
        let snapshot = authored.clone();
        let pool = QuestionPoolBuilder::new(&authored)
            .with_shuffle_questions(true)
            .with_shuffle_choices(true)
            .build(&mut StdRng::seed_from_u64(11));

        assert_eq!(authored, snapshot);
        let mut got: Vec<_> = texts(&pool).into_iter().map(str::to_owned).collect();
        got.sort();
        let mut want: Vec<_> = texts(&authored).into_iter().map(str::to_owned).collect();
        want.sort();
        assert_eq!(got, want);

        for q in &pool {
            let mut scores: Vec<i64> = q.choices.iter().map(|c| c.score as i64).collect();
            scores.sort_unstable();
            assert_eq!(scores, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn choices_keep_order_without_choice_shuffle() {
        let authored = vec![question("q", &[])];
        let pool = QuestionPoolBuilder::new(&authored)
            .with_shuffle_questions(true)
            .build(&mut StdRng::seed_from_u64(2));
        assert_eq!(pool[0].choices, authored[0].choices);
    }
}
