//! Ordered rule execution with compensation on failure.
//!
//! A [`RuleEngine`] runs a caller-supplied sequence of step identifiers. Each
//! identifier is resolved to a [`Rule`] through a [`RuleRegistry`], the rule is
//! initialized and executed, and the step is appended to the run's [`History`].
//! A rule may redirect execution to another step of the same sequence. When
//! any step fails, every completed step whose rule implements [`RevertRule`]
//! is reverted in reverse order before the original error is returned.

mod audit;
mod config;
mod engine;
mod error;
mod history;
mod outcome;
mod registry;
mod request;
mod response;
mod rule;

pub use audit::{RunAuditLog, StepRecord, StepStatus};
pub use config::{BackwardJumpPolicy, CompensationFailurePolicy, ConfigError, RuleEngineConfig};
pub use engine::{RuleEngine, RuleEngineManager};
pub use error::{InvalidRequest, RuleEngineError, RuleError, StepPhase};
pub use history::{ExecutionRecord, History};
pub use outcome::ExecuteOutcome;
pub use registry::{RuleRegistry, RuleRegistryBuilder};
pub use request::RuleEngineRequest;
pub use response::RuleEngineResponse;
pub use rule::{RevertRule, Rule, StepId};

pub use tokio_util::sync::CancellationToken;
