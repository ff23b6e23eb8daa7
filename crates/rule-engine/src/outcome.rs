/// Result of a successful [`Rule::execute`](crate::Rule::execute).
///
/// Carries an optional redirection: the step the run continues with instead
/// of the natural next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOutcome<Id> {
    next_rule: Option<Id>,
}

impl<Id> ExecuteOutcome<Id> {
    /// Continue with the next step of the sequence.
    #[must_use]
    pub const fn proceed() -> Self {
        Self { next_rule: None }
    }

    /// Continue with `step`, which must be part of the run's sequence.
    #[must_use]
    pub const fn jump_to(step: Id) -> Self {
        Self {
            next_rule: Some(step),
        }
    }

    /// The redirection target, if any.
    #[must_use]
    pub fn next_rule(&self) -> Option<&Id> {
        self.next_rule.as_ref()
    }
}

impl<Id> Default for ExecuteOutcome<Id> {
    fn default() -> Self {
        Self::proceed()
    }
}
