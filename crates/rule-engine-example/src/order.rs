use rule_engine::{CancellationToken, RuleEngineManager};
use tracing::info;

use crate::error::{ExampleError, Result};
use crate::model::CustomerOrderPostModel;
use crate::rule_type::RuleType;

/// Steps run to place a customer order, in order.
pub const PLACE_ORDER_STEPS: [RuleType; 3] = [
    RuleType::CreateCustomer,
    RuleType::CreateCustomerOrder,
    RuleType::NotifyMessageBroker,
];

/// Place `order` through `engine` and report whether the run succeeded.
///
/// # Errors
///
/// Returns `PlaceOrderError::Validation` before the engine is called if the
/// order is missing a required field, and `PlaceOrderError::Engine` if the
/// run fails.
pub async fn place_order(
    engine: &dyn RuleEngineManager<RuleType, ExampleError>,
    order: &CustomerOrderPostModel,
    cancel: &CancellationToken,
) -> Result<bool> {
    let mut request = order.to_request()?;
    let response = engine
        .execute(&mut request, cancel, &PLACE_ORDER_STEPS)
        .await?;
    info!(customer = %order.name, success = response.is_success(), "order placed");
    Ok(response.is_success())
}

#[cfg(test)]
mod tests {
    use rule_engine::RuleEngine;
    use serde_json::json;

    use super::*;
    use crate::error::PlaceOrderError;
    use crate::rules::register_rules;

    fn order() -> CustomerOrderPostModel {
        serde_json::from_value(json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "phone_number": "555-0100",
            "address": { "complete_address": "1 Navy Yard", "landmark": "dry dock" },
            "items": [{ "item_id": 3, "quantity": 1.0 }]
        }))
        .expect("valid order json")
    }

    #[tokio::test]
    async fn valid_order_is_placed() {
        let engine = RuleEngine::new(register_rules());

        let placed = place_order(&engine, &order(), &CancellationToken::new())
            .await
            .expect("order placed");

        assert!(placed);
    }

    #[tokio::test]
    async fn invalid_order_never_reaches_the_engine() {
        let engine = RuleEngine::new(register_rules());
        let order = CustomerOrderPostModel {
            email: String::new(),
            ..order()
        };

        let result = place_order(&engine, &order, &CancellationToken::new()).await;

        assert!(matches!(result, Err(PlaceOrderError::Validation(_))));
    }
}
