/// Answered and remaining counts for a quiz run, as returned by
/// `QuizSession::progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// Questions in the active pool.
    pub total: usize,
    /// Answer records so far, skips included.
    pub answered: usize,
    /// Questions from the current index to the end of the pool.
    pub remaining: usize,
    /// True once the run reached `completed`, by answers or by total timeout.
    pub is_complete: bool,
}
