use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::rule::{Rule, StepId};

/// The rules available to an engine, looked up by step identifier.
///
/// Lookup is a linear scan in registration order and the first rule whose
/// [`rule_type`](Rule::rule_type) matches wins. Registering a second rule for
/// the same step is allowed; it is never consulted.
pub struct RuleRegistry<Id: StepId, E: Send + 'static> {
    rules: Vec<Arc<dyn Rule<Id, E>>>,
}

impl<Id: StepId, E: Send + 'static> RuleRegistry<Id, E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RuleRegistryBuilder<Id, E> {
        RuleRegistryBuilder::new()
    }

    /// Register a rule after all previously registered rules.
    pub fn register<R>(&mut self, rule: R)
    where
        R: Rule<Id, E> + 'static,
    {
        self.register_shared(Arc::new(rule));
    }

    /// Register a rule instance that is shared with other owners.
    pub fn register_shared(&mut self, rule: Arc<dyn Rule<Id, E>>) {
        let step = rule.rule_type();
        if self.rules.iter().any(|existing| existing.rule_type() == step) {
            debug!(%step, "rule registered for a step that already has one; it will not be consulted");
        }
        self.rules.push(rule);
    }

    /// Find the first registered rule handling `step`.
    #[must_use]
    pub fn find(&self, step: Id) -> Option<Arc<dyn Rule<Id, E>>> {
        self.rules
            .iter()
            .find(|rule| rule.rule_type() == step)
            .map(Arc::clone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Step identifiers of all registered rules, in registration order.
    #[must_use]
    pub fn step_ids(&self) -> Vec<Id> {
        self.rules.iter().map(|rule| rule.rule_type()).collect()
    }
}

impl<Id: StepId, E: Send + 'static> Default for RuleRegistry<Id, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: StepId, E: Send + 'static> fmt::Debug for RuleRegistry<Id, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("steps", &self.step_ids())
            .finish()
    }
}

impl<Id: StepId, E: Send + 'static> FromIterator<Arc<dyn Rule<Id, E>>> for RuleRegistry<Id, E> {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Rule<Id, E>>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for rule in iter {
            registry.register_shared(rule);
        }
        registry
    }
}

/// Builder collecting rules in registration order.
///
/// ```
/// use async_trait::async_trait;
/// use rule_engine::{CancellationToken, ExecuteOutcome, History, Rule, RuleEngineRequest, RuleRegistry};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("failed")]
/// struct Failed;
///
/// struct Greet;
///
/// #[async_trait]
/// impl Rule<&'static str, Failed> for Greet {
///     fn rule_type(&self) -> &'static str { "greet" }
///     async fn execute(
///         &self,
///         request: &mut RuleEngineRequest,
///         _history: &mut History<&'static str, Failed>,
///         _cancel: &CancellationToken,
///     ) -> Result<ExecuteOutcome<&'static str>, Failed> {
///         request.insert("greeting", "hello");
///         Ok(ExecuteOutcome::proceed())
///     }
/// }
///
/// let registry = RuleRegistry::builder().rule(Greet).build();
/// assert_eq!(registry.step_ids(), vec!["greet"]);
/// ```
pub struct RuleRegistryBuilder<Id: StepId, E: Send + 'static> {
    registry: RuleRegistry<Id, E>,
}

impl<Id: StepId, E: Send + 'static> RuleRegistryBuilder<Id, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::new(),
        }
    }

    /// Add a rule.
    #[must_use]
    pub fn rule<R>(mut self, rule: R) -> Self
    where
        R: Rule<Id, E> + 'static,
    {
        self.registry.register(rule);
        self
    }

    /// Add a shared rule instance.
    #[must_use]
    pub fn shared(mut self, rule: Arc<dyn Rule<Id, E>>) -> Self {
        self.registry.register_shared(rule);
        self
    }

    #[must_use]
    pub fn build(self) -> RuleRegistry<Id, E> {
        self.registry
    }
}

impl<Id: StepId, E: Send + 'static> Default for RuleRegistryBuilder<Id, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::history::History;
    use crate::outcome::ExecuteOutcome;
    use crate::request::RuleEngineRequest;

    #[derive(Debug, thiserror::Error)]
    #[error("test error")]
    struct TestError;

    struct TaggedRule {
        step: &'static str,
        tag: &'static str,
    }

    #[async_trait]
    impl Rule<&'static str, TestError> for TaggedRule {
        fn rule_type(&self) -> &'static str {
            self.step
        }

        async fn execute(
            &self,
            request: &mut RuleEngineRequest,
            _history: &mut History<&'static str, TestError>,
            _cancel: &CancellationToken,
        ) -> Result<ExecuteOutcome<&'static str>, TestError> {
            request.insert("tag", self.tag);
            Ok(ExecuteOutcome::proceed())
        }
    }

    #[test]
    fn empty_registry_finds_nothing() {
        let registry: RuleRegistry<&'static str, TestError> = RuleRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.find("anything").is_none());
    }

    #[test]
    fn builder_keeps_registration_order() {
        let registry = RuleRegistry::builder()
            .rule(TaggedRule {
                step: "b",
                tag: "b",
            })
            .rule(TaggedRule {
                step: "a",
                tag: "a",
            })
            .build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.step_ids(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn first_registered_rule_wins() {
        let registry = RuleRegistry::builder()
            .rule(TaggedRule {
                step: "a",
                tag: "first",
            })
            .rule(TaggedRule {
                step: "a",
                tag: "second",
            })
            .build();

        let rule = registry.find("a").expect("rule registered");
        let mut request = RuleEngineRequest::new();
        rule.execute(&mut request, &mut History::new(), &CancellationToken::new())
            .await
            .expect("rule executes");

        assert_eq!(request.get("tag"), Some(&serde_json::json!("first")));
    }

    #[test]
    fn shared_rules_keep_identity() {
        let shared: Arc<dyn Rule<&'static str, TestError>> = Arc::new(TaggedRule {
            step: "a",
            tag: "a",
        });

        let registry = RuleRegistry::builder().shared(Arc::clone(&shared)).build();

        let found = registry.find("a").expect("rule registered");
        assert!(Arc::ptr_eq(&found, &shared));
    }

    #[test]
    fn registry_collects_from_iterator() {
        let rules: Vec<Arc<dyn Rule<&'static str, TestError>>> = vec![
            Arc::new(TaggedRule {
                step: "a",
                tag: "a",
            }),
            Arc::new(TaggedRule {
                step: "b",
                tag: "b",
            }),
        ];

        let registry: RuleRegistry<_, _> = rules.into_iter().collect();

        assert_eq!(registry.step_ids(), vec!["a", "b"]);
    }
}
