use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::audit::RunAuditLog;
use crate::config::{BackwardJumpPolicy, CompensationFailurePolicy, RuleEngineConfig};
use crate::error::{RuleEngineError, RuleError, StepPhase};
use crate::history::History;
use crate::registry::RuleRegistry;
use crate::request::RuleEngineRequest;
use crate::response::RuleEngineResponse;
use crate::rule::StepId;

/// The rule engine's public operation, for callers that take the engine as a
/// dependency.
#[async_trait]
pub trait RuleEngineManager<Id: StepId, E: Send + 'static>: Send + Sync {
    /// Run `steps` in order against `request`.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the run, after completed steps have
    /// been reverted.
    async fn execute(
        &self,
        request: &mut RuleEngineRequest,
        cancel: &CancellationToken,
        steps: &[Id],
    ) -> Result<RuleEngineResponse<Id, E>, RuleEngineError<Id, E>>;
}

/// Runs step sequences against the rules of a registry.
///
/// Steps run strictly one at a time in sequence order. A rule may redirect
/// the run to any position of the sequence holding its target; the run then
/// continues from there. When a lookup, a redirection or a rule fails, every
/// completed step whose rule is revertible is reverted, last completed first,
/// and the original error is returned.
///
/// The engine holds no per-run state, so concurrent runs on one engine are
/// independent. The cancellation token is handed to every rule call and never
/// checked by the engine itself.
pub struct RuleEngine<Id: StepId, E: Send + 'static> {
    registry: RuleRegistry<Id, E>,
    config: RuleEngineConfig,
}

impl<Id, E> RuleEngine<Id, E>
where
    Id: StepId,
    E: std::error::Error + Send + 'static,
{
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(registry: RuleRegistry<Id, E>) -> Self {
        Self::with_config(registry, RuleEngineConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: RuleRegistry<Id, E>, config: RuleEngineConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &RuleRegistry<Id, E> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &RuleEngineConfig {
        &self.config
    }

    /// Run `steps` in order against `request`, returning the run's history.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::EmptySequence` if `steps` is empty,
    /// `RuleError::NotFound` if a step has no registered rule,
    /// `RuleError::NextRuleNotFound` if a redirection target is not part of
    /// `steps`, and `RuleEngineError::Step` if a rule fails. Completed steps
    /// are reverted before any error other than an empty sequence is returned.
    pub async fn execute(
        &self,
        request: &mut RuleEngineRequest,
        cancel: &CancellationToken,
        steps: &[Id],
    ) -> Result<RuleEngineResponse<Id, E>, RuleEngineError<Id, E>> {
        let mut audit_log = RunAuditLog::new();
        self.execute_internal(request, cancel, steps, &mut audit_log)
            .await
    }

    /// Run the steps and return both the result and an audit log.
    ///
    /// The audit log tracks every step started, failed and reverted.
    pub async fn execute_with_audit(
        &self,
        request: &mut RuleEngineRequest,
        cancel: &CancellationToken,
        steps: &[Id],
    ) -> (
        Result<RuleEngineResponse<Id, E>, RuleEngineError<Id, E>>,
        RunAuditLog,
    ) {
        let mut audit_log = RunAuditLog::new();
        let result = self
            .execute_internal(request, cancel, steps, &mut audit_log)
            .await;
        (result, audit_log)
    }

    /// Build a request from a JSON payload and run the steps against it.
    ///
    /// # Errors
    ///
    /// Returns `RuleEngineError::InvalidArgument` before any rule is looked
    /// up if `payload` is `null` or not a JSON object, otherwise the errors of
    /// [`execute`](Self::execute).
    pub async fn execute_payload(
        &self,
        payload: Value,
        cancel: &CancellationToken,
        steps: &[Id],
    ) -> Result<RuleEngineResponse<Id, E>, RuleEngineError<Id, E>> {
        let mut request = match RuleEngineRequest::try_from(payload) {
            Ok(request) => request,
            Err(invalid) => {
                error!(error = %invalid, "rule engine request rejected");
                return Err(invalid.into());
            }
        };
        self.execute(&mut request, cancel, steps).await
    }

    async fn execute_internal(
        &self,
        request: &mut RuleEngineRequest,
        cancel: &CancellationToken,
        steps: &[Id],
        audit_log: &mut RunAuditLog,
    ) -> Result<RuleEngineResponse<Id, E>, RuleEngineError<Id, E>> {
        if steps.is_empty() {
            let error = RuleEngineError::from(RuleError::EmptySequence);
            error!(error = %error, "rule engine run rejected");
            return Err(error);
        }

        let mut history = History::new();
        match self
            .run_steps(request, cancel, steps, &mut history, audit_log)
            .await
        {
            Ok(()) => {
                info!(steps = history.len(), "rule engine run completed");
                Ok(RuleEngineResponse::new(true, history))
            }
            Err(error) => {
                error!(
                    error = ?error,
                    completed = history.len(),
                    "rule engine run failed"
                );
                self.compensate(request, cancel, &history, audit_log).await;
                Err(error)
            }
        }
    }

    async fn run_steps(
        &self,
        request: &mut RuleEngineRequest,
        cancel: &CancellationToken,
        steps: &[Id],
        history: &mut History<Id, E>,
        audit_log: &mut RunAuditLog,
    ) -> Result<(), RuleEngineError<Id, E>> {
        let mut cursor = 0;

        while let Some(&step) = steps.get(cursor) {
            let rule = self.registry.find(step).ok_or(RuleError::NotFound(step))?;
            audit_log.record_start(&step);

            debug!(%step, position = cursor, "initializing rule");
            if let Err(source) = rule.init(request, history, cancel).await {
                audit_log.record_failure();
                return Err(RuleEngineError::Step {
                    step,
                    phase: StepPhase::Init,
                    source,
                });
            }

            debug!(%step, position = cursor, "executing rule");
            let outcome = match rule.execute(request, history, cancel).await {
                Ok(outcome) => outcome,
                Err(source) => {
                    audit_log.record_failure();
                    return Err(RuleEngineError::Step {
                        step,
                        phase: StepPhase::Execute,
                        source,
                    });
                }
            };

            history.record(step, rule);
            audit_log.record_success(history.len() - 1);

            cursor = match outcome.next_rule() {
                Some(&target) => {
                    audit_log.record_redirect(&target);
                    self.resolve_redirect(steps, cursor, target)?
                }
                None => cursor + 1,
            };
        }

        Ok(())
    }

    fn resolve_redirect(
        &self,
        steps: &[Id],
        cursor: usize,
        target: Id,
    ) -> Result<usize, RuleError<Id>> {
        let position = steps
            .iter()
            .position(|step| *step == target)
            .ok_or(RuleError::NextRuleNotFound(target))?;

        if position > cursor {
            debug!(%target, from = cursor, to = position, "redirecting run");
            return Ok(position);
        }

        match self.config.backward_jumps() {
            BackwardJumpPolicy::Allow => {
                warn!(
                    %target,
                    from = cursor,
                    to = position,
                    "redirecting run to an already executed position"
                );
                Ok(position)
            }
            BackwardJumpPolicy::Reject => Err(RuleError::BackwardJump(target)),
        }
    }

    async fn compensate(
        &self,
        request: &mut RuleEngineRequest,
        cancel: &CancellationToken,
        history: &History<Id, E>,
        audit_log: &mut RunAuditLog,
    ) {
        for (position, record) in history.iter().enumerate().rev() {
            let Some(revertible) = record.rule().as_revertible() else {
                continue;
            };
            let step = record.step();

            debug!(%step, position, "reverting rule");
            match revertible.revert(request, history, cancel).await {
                Ok(()) => audit_log.record_compensated(position),
                Err(error) => {
                    audit_log.record_compensation_failed(position);
                    error!(%step, position, error = %error, "failed to revert rule");
                    if self.config.compensation_failure() == CompensationFailurePolicy::Abort {
                        warn!(remaining = position, "aborting revert of remaining steps");
                        break;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl<Id, E> RuleEngineManager<Id, E> for RuleEngine<Id, E>
where
    Id: StepId,
    E: std::error::Error + Send + 'static,
{
    async fn execute(
        &self,
        request: &mut RuleEngineRequest,
        cancel: &CancellationToken,
        steps: &[Id],
    ) -> Result<RuleEngineResponse<Id, E>, RuleEngineError<Id, E>> {
        RuleEngine::execute(self, request, cancel, steps).await
    }
}
