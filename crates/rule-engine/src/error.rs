use std::fmt;

use thiserror::Error;

/// Configuration and sequencing faults detected by the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RuleError<Id> {
    #[error("Rule should not be empty")]
    EmptySequence,

    #[error("No rule found with name {0}")]
    NotFound(Id),

    #[error("Next Rule {0} not found in the parameters")]
    NextRuleNotFound(Id),

    #[error("Next Rule {0} would re-enter an already executed position")]
    BackwardJump(Id),
}

/// Malformed request payload handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidRequest {
    #[error("request is missing")]
    Missing,

    #[error("request must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Phase of a step in which a rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Init,
    Execute,
}

impl StepPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Execute => "execute",
        }
    }
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from a rule engine run.
///
/// A failed run reports exactly one error: the fault that stopped it.
/// Failures of reverts performed while unwinding are logged and recorded in
/// the audit log, never reported here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuleEngineError<Id, E> {
    /// The request handed to the engine is missing or malformed.
    #[error("invalid argument")]
    InvalidArgument(#[from] InvalidRequest),

    /// The sequence or the registry cannot satisfy the run.
    #[error(transparent)]
    Rule(#[from] RuleError<Id>),

    /// A rule reported an error.
    #[error("rule {step} failed during {phase}")]
    Step {
        /// The step whose rule failed.
        step: Id,
        /// Whether the rule failed in `init` or `execute`.
        phase: StepPhase,
        /// The rule's own error.
        #[source]
        source: E,
    },
}

impl<Id, E> RuleEngineError<Id, E> {
    /// The sequencing fault, if this is one.
    #[must_use]
    pub fn rule_error(&self) -> Option<&RuleError<Id>> {
        match self {
            Self::Rule(error) => Some(error),
            _ => None,
        }
    }

    /// Consume the error, returning the rule's own error if a rule failed.
    #[must_use]
    pub fn into_step_error(self) -> Option<E> {
        match self {
            Self::Step { source, .. } => Some(source),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("database unavailable")]
    struct TestError;

    type EngineError = RuleEngineError<&'static str, TestError>;

    #[test]
    fn rule_error_messages_name_the_step() {
        assert_eq!(
            RuleError::<&str>::EmptySequence.to_string(),
            "Rule should not be empty"
        );
        assert_eq!(
            RuleError::NotFound("GetCustomerById").to_string(),
            "No rule found with name GetCustomerById"
        );
        assert_eq!(
            RuleError::NextRuleNotFound("GetProductsById").to_string(),
            "Next Rule GetProductsById not found in the parameters"
        );
        assert!(
            RuleError::BackwardJump("CreateCustomer")
                .to_string()
                .contains("CreateCustomer")
        );
    }

    #[test]
    fn rule_variant_is_transparent() {
        let err: EngineError = RuleError::NotFound("CreateCustomer").into();

        assert_eq!(err.to_string(), "No rule found with name CreateCustomer");
        assert_eq!(err.rule_error(), Some(&RuleError::NotFound("CreateCustomer")));
    }

    #[test]
    fn step_error_keeps_source() {
        let err: EngineError = RuleEngineError::Step {
            step: "CreateCustomerOrder",
            phase: StepPhase::Execute,
            source: TestError,
        };

        assert_eq!(
            err.to_string(),
            "rule CreateCustomerOrder failed during execute"
        );
        let source = err.source().expect("step error has a source");
        assert_eq!(source.to_string(), "database unavailable");
        assert!(err.into_step_error().is_some());
    }

    #[test]
    fn invalid_argument_converts_from_invalid_request() {
        let err: EngineError = InvalidRequest::Missing.into();

        assert!(err.is_invalid_argument());
        assert!(err.rule_error().is_none());
        let source = err.source().expect("invalid argument has a source");
        assert_eq!(source.to_string(), "request is missing");
    }
}
