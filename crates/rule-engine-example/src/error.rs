use rule_engine::RuleEngineError;
use thiserror::Error;

use crate::rule_type::RuleType;

/// Errors raised by the order workflow's rules.
#[derive(Debug, Error)]
pub enum ExampleError {
    #[error("request parameter '{0}' is missing")]
    MissingParameter(&'static str),

    #[error("request parameter '{key}' is malformed")]
    MalformedParameter {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule {0} failed on request")]
    RequestedFailure(RuleType),
}

/// Customer order input that is missing a required field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{0}' is required")]
    MissingField(&'static str),

    #[error("field 'item_id' is required for item {index}")]
    MissingItemId { index: usize },
}

#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error("invalid customer order")]
    Validation(#[from] ValidationError),

    #[error("failed to build rule engine request")]
    Request(#[source] serde_json::Error),

    #[error("order workflow failed")]
    Engine(#[from] RuleEngineError<RuleType, ExampleError>),
}

pub type Result<T> = std::result::Result<T, PlaceOrderError>;
