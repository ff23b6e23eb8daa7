use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Kinds of steps the order workflow knows about.
///
/// Only some of them have a registered rule; running a step without one
/// fails the run with a lookup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum RuleType {
    GetCustomerById,
    CreateCustomer,
    GetProductsById,
    CreateCustomerOrder,
    NotifyMessageBroker,
}

impl RuleType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetCustomerById => "GetCustomerById",
            Self::CreateCustomer => "CreateCustomer",
            Self::GetProductsById => "GetProductsById",
            Self::CreateCustomerOrder => "CreateCustomerOrder",
            Self::NotifyMessageBroker => "NotifyMessageBroker",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
