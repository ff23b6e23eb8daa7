//! Customer order placement built on the `rule-engine` crate.
//!
//! A placed order runs three steps: the customer is created, the order is
//! created for it, and the message broker is notified. If notification
//! fails, the created order is reverted.

mod error;
mod model;
mod order;
mod rule_type;
mod rules;

pub use error::{ExampleError, PlaceOrderError, ValidationError};
pub use model::{
    CustomerOrderAddressPostModel, CustomerOrderItemPostModel, CustomerOrderPostModel, keys,
};
pub use order::{PLACE_ORDER_STEPS, place_order};
pub use rule_type::RuleType;
pub use rules::{
    CreateCustomerOrderRule, CreateCustomerRule, NotifyMessageBrokerRule, register_rules,
};
