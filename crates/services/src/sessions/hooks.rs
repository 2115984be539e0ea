use std::fmt;
use std::sync::Arc;

use quiz_core::model::Choice;

type StartHook = Arc<dyn Fn() + Send + Sync>;
type IndexHook = Arc<dyn Fn(usize) + Send + Sync>;
type AnswerHook = Arc<dyn Fn(Option<&Choice>, f64) + Send + Sync>;
type CompleteHook = Arc<dyn Fn(u32, Option<&str>) + Send + Sync>;

/// Optional notification slots a caller plugs into a session.
///
/// Hooks run synchronously on the thread that caused the transition (the caller,
/// or a timer task), each at its point in the transition. Their return values
/// are ignored.
#[derive(Clone, Default)]
pub struct SessionHooks {
    on_start: Option<StartHook>,
    on_question_change: Option<IndexHook>,
    on_answer: Option<AnswerHook>,
    on_complete: Option<CompleteHook>,
    on_time_expired: Option<IndexHook>,
    on_total_time_expired: Option<StartHook>,
}

impl SessionHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_start(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(hook));
        self
    }

    /// Called with the index of the question now being shown.
    #[must_use]
    pub fn on_question_change(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_question_change = Some(Arc::new(hook));
        self
    }

    /// Called with the resolved choice (`None` for a skip) and its score.
    #[must_use]
    pub fn on_answer(
        mut self,
        hook: impl Fn(Option<&Choice>, f64) + Send + Sync + 'static,
    ) -> Self {
        self.on_answer = Some(Arc::new(hook));
        self
    }

    /// Called with the final 0..=100 score and bucket label once every question
    /// has been answered. Not called when the session runs out of total time.
    #[must_use]
    pub fn on_complete(mut self, hook: impl Fn(u32, Option<&str>) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_time_expired(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_time_expired = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_total_time_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_total_time_expired = Some(Arc::new(hook));
        self
    }

    pub(crate) fn emit(&self, notification: &Notification) {
        match notification {
            Notification::Started => {
                if let Some(hook) = &self.on_start {
                    hook();
                }
            }
            Notification::QuestionChanged(index) => {
                if let Some(hook) = &self.on_question_change {
                    hook(*index);
                }
            }
            Notification::Answered { choice, score } => {
                if let Some(hook) = &self.on_answer {
                    hook(choice.as_ref(), *score);
                }
            }
            Notification::Completed {
                final_score,
                bucket,
            } => {
                if let Some(hook) = &self.on_complete {
                    hook(*final_score, bucket.as_deref());
                }
            }
            Notification::TimeExpired(index) => {
                if let Some(hook) = &self.on_time_expired {
                    hook(*index);
                }
            }
            Notification::TotalTimeExpired => {
                if let Some(hook) = &self.on_total_time_expired {
                    hook();
                }
            }
        }
    }
}

impl fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_question_change", &self.on_question_change.is_some())
            .field("on_answer", &self.on_answer.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_time_expired", &self.on_time_expired.is_some())
            .field("on_total_time_expired", &self.on_total_time_expired.is_some())
            .finish()
    }
}

/// A transition outcome delivered to the matching hook.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification {
    Started,
    QuestionChanged(usize),
    Answered { choice: Option<Choice>, score: f64 },
    Completed { final_score: u32, bucket: Option<String> },
    TimeExpired(usize),
    TotalTimeExpired,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn emits_to_registered_slots_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let answers = Arc::clone(&seen);
        let completions = Arc::clone(&seen);
        let hooks = SessionHooks::new()
            .on_answer(move |choice, score| {
                let text = choice.map_or("-", |c| c.text.as_str()).to_owned();
                answers.lock().unwrap().push(format!("answer {text} {score}"));
            })
            .on_complete(move |score, bucket| {
                completions
                    .lock()
                    .unwrap()
                    .push(format!("complete {score} {}", bucket.unwrap_or("none")));
            });

        for notification in [
            Notification::Started,
            Notification::Answered {
                choice: Some(Choice::new("Red", 10.0)),
                score: 10.0,
            },
            Notification::Answered {
                choice: None,
                score: 0.0,
            },
            Notification::Completed {
                final_score: 83,
                bucket: None,
            },
        ] {
            hooks.emit(&notification);
        }

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["answer Red 10", "answer - 0", "complete 83 none"]
        );
    }

    #[test]
    fn debug_reports_which_slots_are_set() {
        let hooks = SessionHooks::new().on_start(|| {});
        let rendered = format!("{hooks:?}");
        assert!(rendered.contains("on_start: true"));
        assert!(rendered.contains("on_answer: false"));
    }
}
