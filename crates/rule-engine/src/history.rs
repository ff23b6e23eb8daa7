use std::fmt;
use std::sync::Arc;

use crate::rule::{Rule, StepId};

/// A step that completed during a run, paired with the rule that ran it.
pub struct ExecutionRecord<Id: StepId, E: Send + 'static> {
    step: Id,
    rule: Arc<dyn Rule<Id, E>>,
}

impl<Id: StepId, E: Send + 'static> ExecutionRecord<Id, E> {
    fn new(step: Id, rule: Arc<dyn Rule<Id, E>>) -> Self {
        Self { step, rule }
    }

    /// The step identifier the record was executed for.
    #[must_use]
    pub fn step(&self) -> Id {
        self.step
    }

    /// The rule instance that executed the step.
    #[must_use]
    pub fn rule(&self) -> &Arc<dyn Rule<Id, E>> {
        &self.rule
    }
}

impl<Id: StepId, E: Send + 'static> Clone for ExecutionRecord<Id, E> {
    fn clone(&self) -> Self {
        Self {
            step: self.step,
            rule: Arc::clone(&self.rule),
        }
    }
}

impl<Id: StepId, E: Send + 'static> fmt::Debug for ExecutionRecord<Id, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionRecord")
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

/// Ordered record of the steps completed in a run.
///
/// Insertion order is execution order. A step appears once per completed
/// execution, so a step re-entered through a backward redirection appears
/// more than once.
///
/// The engine appends a record after every step that completes. Rules get
/// the run's history mutably in `init` and `execute` and may append records
/// of their own; later steps observe them, and they are reverted like any
/// other record when the run fails. Records are never removed.
pub struct History<Id: StepId, E: Send + 'static> {
    records: Vec<ExecutionRecord<Id, E>>,
}

impl<Id: StepId, E: Send + 'static> History<Id, E> {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record of `step` executed by `rule`.
    pub fn record(&mut self, step: Id, rule: Arc<dyn Rule<Id, E>>) {
        self.records.push(ExecutionRecord::new(step, rule));
    }

    /// Number of completed steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the record at `index`, in execution order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ExecutionRecord<Id, E>> {
        self.records.get(index)
    }

    /// The most recently completed step.
    #[must_use]
    pub fn last(&self) -> Option<&ExecutionRecord<Id, E>> {
        self.records.last()
    }

    /// Whether `step` completed at least once.
    #[must_use]
    pub fn contains(&self, step: Id) -> bool {
        self.records.iter().any(|record| record.step == step)
    }

    /// Iterate over the records in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionRecord<Id, E>> {
        self.records.iter()
    }

    /// The completed step identifiers in execution order.
    #[must_use]
    pub fn steps(&self) -> Vec<Id> {
        self.records.iter().map(ExecutionRecord::step).collect()
    }
}

impl<Id: StepId, E: Send + 'static> Default for History<Id, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: StepId, E: Send + 'static> Clone for History<Id, E> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<Id: StepId, E: Send + 'static> fmt::Debug for History<Id, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.records).finish()
    }
}

impl<'a, Id: StepId, E: Send + 'static> IntoIterator for &'a History<Id, E> {
    type Item = &'a ExecutionRecord<Id, E>;
    type IntoIter = std::slice::Iter<'a, ExecutionRecord<Id, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
