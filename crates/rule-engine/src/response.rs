use crate::history::History;
use crate::rule::StepId;

/// Outcome of a completed run: the success flag and the run's history.
///
/// Runs that fail return an error instead, so a response handed out by
/// [`RuleEngine`](crate::RuleEngine) is always successful.
#[derive(Debug)]
pub struct RuleEngineResponse<Id: StepId, E: Send + 'static> {
    success: bool,
    history: History<Id, E>,
}

impl<Id: StepId, E: Send + 'static> RuleEngineResponse<Id, E> {
    #[must_use]
    pub fn new(success: bool, history: History<Id, E>) -> Self {
        Self { success, history }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The steps completed by the run, in execution order.
    #[must_use]
    pub fn history(&self) -> &History<Id, E> {
        &self.history
    }

    #[must_use]
    pub fn into_history(self) -> History<Id, E> {
        self.history
    }
}
