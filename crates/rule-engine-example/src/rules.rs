//! The order workflow's rules.
//!
//! Every rule honors the `failAt` request parameter: when it names the
//! rule's own step, the rule fails its execute phase. This makes the
//! compensation path observable from the command line.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rule_engine::{
    CancellationToken, ExecuteOutcome, History, RevertRule, Rule, RuleEngineRequest,
    RuleRegistry,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::ExampleError;
use crate::model::{CustomerOrderItemPostModel, keys};
use crate::rule_type::RuleType;

type OrderHistory = History<RuleType, ExampleError>;

/// Register every rule of the order workflow.
#[must_use]
pub fn register_rules() -> RuleRegistry<RuleType, ExampleError> {
    RuleRegistry::builder()
        .rule(CreateCustomerRule::default())
        .rule(CreateCustomerOrderRule::default())
        .rule(NotifyMessageBrokerRule)
        .build()
}

fn required<T: DeserializeOwned>(
    request: &RuleEngineRequest,
    key: &'static str,
) -> Result<T, ExampleError> {
    request
        .get_as(key)
        .map_err(|source| ExampleError::MalformedParameter { key, source })?
        .ok_or(ExampleError::MissingParameter(key))
}

fn fail_if_requested(
    request: &RuleEngineRequest,
    rule_type: RuleType,
) -> Result<(), ExampleError> {
    let requested: Option<RuleType> = request
        .get_as(keys::FAIL_AT)
        .map_err(|source| ExampleError::MalformedParameter {
            key: keys::FAIL_AT,
            source,
        })?;
    if requested == Some(rule_type) {
        return Err(ExampleError::RequestedFailure(rule_type));
    }
    Ok(())
}

fn next_id(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed) + 1
}

/// Creates the customer and stores its id as `customerId`.
#[derive(Debug, Default)]
pub struct CreateCustomerRule {
    next_id: AtomicU64,
}

#[async_trait]
impl Rule<RuleType, ExampleError> for CreateCustomerRule {
    fn rule_type(&self) -> RuleType {
        RuleType::CreateCustomer
    }

    async fn init(
        &self,
        _request: &mut RuleEngineRequest,
        _history: &mut OrderHistory,
        _cancel: &CancellationToken,
    ) -> Result<(), ExampleError> {
        debug!("customer creation init");
        Ok(())
    }

    async fn execute(
        &self,
        request: &mut RuleEngineRequest,
        _history: &mut OrderHistory,
        _cancel: &CancellationToken,
    ) -> Result<ExecuteOutcome<RuleType>, ExampleError> {
        fail_if_requested(request, self.rule_type())?;
        let name: String = required(request, keys::CUSTOMER_NAME)?;

        let customer_id = format!("customer-{}", next_id(&self.next_id));
        info!(%customer_id, %name, "customer created");
        request.insert(keys::CUSTOMER_ID, customer_id);
        Ok(ExecuteOutcome::proceed())
    }
}

/// Creates the order for `customerId` and stores its id as `orderId`.
///
/// Reverting removes `orderId` again.
#[derive(Debug, Default)]
pub struct CreateCustomerOrderRule {
    next_id: AtomicU64,
}

#[async_trait]
impl Rule<RuleType, ExampleError> for CreateCustomerOrderRule {
    fn rule_type(&self) -> RuleType {
        RuleType::CreateCustomerOrder
    }

    async fn init(
        &self,
        _request: &mut RuleEngineRequest,
        _history: &mut OrderHistory,
        _cancel: &CancellationToken,
    ) -> Result<(), ExampleError> {
        debug!("customer order init");
        Ok(())
    }

    async fn execute(
        &self,
        request: &mut RuleEngineRequest,
        _history: &mut OrderHistory,
        _cancel: &CancellationToken,
    ) -> Result<ExecuteOutcome<RuleType>, ExampleError> {
        fail_if_requested(request, self.rule_type())?;
        let customer_id: String = required(request, keys::CUSTOMER_ID)?;
        let items: Vec<CustomerOrderItemPostModel> = required(request, keys::CUSTOMER_ITEMS)?;

        let order_id = format!("order-{}", next_id(&self.next_id));
        info!(%order_id, %customer_id, items = items.len(), "customer order created");
        request.insert(keys::ORDER_ID, order_id);
        Ok(ExecuteOutcome::proceed())
    }

    fn as_revertible(&self) -> Option<&dyn RevertRule<RuleType, ExampleError>> {
        Some(self)
    }
}

#[async_trait]
impl RevertRule<RuleType, ExampleError> for CreateCustomerOrderRule {
    async fn revert(
        &self,
        request: &mut RuleEngineRequest,
        _history: &OrderHistory,
        _cancel: &CancellationToken,
    ) -> Result<(), ExampleError> {
        if let Some(order_id) = request.remove(keys::ORDER_ID) {
            info!(%order_id, "customer order reverted");
        }
        Ok(())
    }
}

/// Publishes the placed order identified by `orderId`.
#[derive(Debug, Default)]
pub struct NotifyMessageBrokerRule;

#[async_trait]
impl Rule<RuleType, ExampleError> for NotifyMessageBrokerRule {
    fn rule_type(&self) -> RuleType {
        RuleType::NotifyMessageBroker
    }

    async fn execute(
        &self,
        request: &mut RuleEngineRequest,
        _history: &mut OrderHistory,
        _cancel: &CancellationToken,
    ) -> Result<ExecuteOutcome<RuleType>, ExampleError> {
        fail_if_requested(request, self.rule_type())?;
        let order_id: String = required(request, keys::ORDER_ID)?;

        info!(%order_id, "order published");
        Ok(ExecuteOutcome::proceed())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request_with(entries: &[(&str, serde_json::Value)]) -> RuleEngineRequest {
        entries
            .iter()
            .map(|(key, value)| (*key, value.clone()))
            .collect()
    }

    #[test]
    fn registry_holds_one_rule_per_implemented_step() {
        let registry = register_rules();

        assert_eq!(
            registry.step_ids(),
            vec![
                RuleType::CreateCustomer,
                RuleType::CreateCustomerOrder,
                RuleType::NotifyMessageBroker,
            ]
        );
        assert!(registry.find(RuleType::GetCustomerById).is_none());
    }

    #[test]
    fn only_order_creation_is_revertible() {
        let registry = register_rules();

        let revertible: Vec<RuleType> = registry
            .step_ids()
            .into_iter()
            .filter(|step| {
                registry
                    .find(*step)
                    .is_some_and(|rule| rule.as_revertible().is_some())
            })
            .collect();

        assert_eq!(revertible, vec![RuleType::CreateCustomerOrder]);
    }

    #[tokio::test]
    async fn create_customer_stores_sequential_ids() {
        let rule = CreateCustomerRule::default();
        let mut history = OrderHistory::new();
        let cancel = CancellationToken::new();

        for expected in ["customer-1", "customer-2"] {
            let mut request = request_with(&[(keys::CUSTOMER_NAME, json!("Ada"))]);
            rule.execute(&mut request, &mut history, &cancel)
                .await
                .expect("customer created");
            assert_eq!(request.get(keys::CUSTOMER_ID), Some(&json!(expected)));
        }
    }

    #[tokio::test]
    async fn create_customer_requires_a_name() {
        let rule = CreateCustomerRule::default();
        let mut request = RuleEngineRequest::new();

        let result = rule
            .execute(&mut request, &mut OrderHistory::new(), &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ExampleError::MissingParameter(keys::CUSTOMER_NAME))
        ));
    }

    #[tokio::test]
    async fn create_order_rejects_malformed_items() {
        let rule = CreateCustomerOrderRule::default();
        let mut request = request_with(&[
            (keys::CUSTOMER_ID, json!("customer-1")),
            (keys::CUSTOMER_ITEMS, json!("two apples")),
        ]);

        let result = rule
            .execute(&mut request, &mut OrderHistory::new(), &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(ExampleError::MalformedParameter {
                key: keys::CUSTOMER_ITEMS,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn reverting_an_order_removes_its_id() {
        let rule = CreateCustomerOrderRule::default();
        let mut history = OrderHistory::new();
        let cancel = CancellationToken::new();
        let mut request = request_with(&[
            (keys::CUSTOMER_ID, json!("customer-1")),
            (keys::CUSTOMER_ITEMS, json!([{ "item_id": 1, "quantity": 1.0 }])),
        ]);

        rule.execute(&mut request, &mut history, &cancel)
            .await
            .expect("order created");
        assert!(request.contains_key(keys::ORDER_ID));

        rule.revert(&mut request, &history, &cancel)
            .await
            .expect("order reverted");
        assert!(!request.contains_key(keys::ORDER_ID));
    }

    #[tokio::test]
    async fn fail_at_only_affects_the_named_rule() {
        let mut request = request_with(&[
            (keys::ORDER_ID, json!("order-1")),
            (keys::FAIL_AT, json!("NotifyMessageBroker")),
        ]);
        let mut history = OrderHistory::new();
        let cancel = CancellationToken::new();

        let notify = NotifyMessageBrokerRule
            .execute(&mut request, &mut history, &cancel)
            .await;
        let create = CreateCustomerRule::default()
            .execute(&mut request, &mut history, &cancel)
            .await;

        assert!(matches!(
            notify,
            Err(ExampleError::RequestedFailure(RuleType::NotifyMessageBroker))
        ));
        assert!(matches!(
            create,
            Err(ExampleError::MissingParameter(keys::CUSTOMER_NAME))
        ));
    }
}
