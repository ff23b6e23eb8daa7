use std::fmt::{Debug, Display};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::history::History;
use crate::outcome::ExecuteOutcome;
use crate::request::RuleEngineRequest;

/// Identifier naming the kind of a step.
///
/// Implemented automatically for every small copyable type with a
/// human-readable form. Collaborators normally supply a closed enum.
pub trait StepId: Copy + Eq + Debug + Display + Send + Sync + 'static {}

impl<T> StepId for T where T: Copy + Eq + Debug + Display + Send + Sync + 'static {}

/// A unit of orchestrated work, registered under exactly one step identifier.
///
/// The engine calls [`init`](Rule::init) and then [`execute`](Rule::execute)
/// for every position of the run that resolves to this rule. Both receive the
/// run's shared request, which earlier steps may already have written to, and
/// the history of the steps completed so far. A rule may append records to
/// that history with [`History::record`]; the engine appends the rule's own
/// record once `execute` returns successfully.
///
/// # Type Parameters
///
/// - `Id`: The step identifier type of the engine
/// - `E`: The error type rules report failures with
#[async_trait]
pub trait Rule<Id: StepId, E: Send + 'static>: Send + Sync {
    /// The step identifier this rule handles.
    fn rule_type(&self) -> Id;

    /// Prepare the step before it is executed.
    ///
    /// The default implementation does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the step cannot be prepared. The step is then not
    /// executed and does not appear in the history.
    async fn init(
        &self,
        request: &mut RuleEngineRequest,
        history: &mut History<Id, E>,
        cancel: &CancellationToken,
    ) -> Result<(), E> {
        let _ = (request, history, cancel);
        Ok(())
    }

    /// Execute the step.
    ///
    /// The returned outcome may redirect the run to another step of the
    /// sequence instead of the natural next one.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails to complete.
    async fn execute(
        &self,
        request: &mut RuleEngineRequest,
        history: &mut History<Id, E>,
        cancel: &CancellationToken,
    ) -> Result<ExecuteOutcome<Id>, E>;

    /// The revert capability of this rule, if it has one.
    ///
    /// Rules that can undo their effects return `Some(self)` here. The
    /// default is `None`: the step is skipped when the run is unwound.
    fn as_revertible(&self) -> Option<&dyn RevertRule<Id, E>> {
        None
    }
}

/// Optional capability of a [`Rule`] to undo its effects.
///
/// Called in reverse execution order for every completed step when a later
/// step of the same run fails.
#[async_trait]
pub trait RevertRule<Id: StepId, E: Send + 'static>: Send + Sync {
    /// Undo the effects of the step.
    ///
    /// `history` is the full history of the failed run, including the step
    /// being reverted and any step executed after it.
    ///
    /// # Errors
    ///
    /// Returns an error if the step cannot be reverted.
    async fn revert(
        &self,
        request: &mut RuleEngineRequest,
        history: &History<Id, E>,
        cancel: &CancellationToken,
    ) -> Result<(), E>;
}
