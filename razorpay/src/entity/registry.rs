//! Discriminator-to-shape registry and the reifier built on it.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::LazyLock;

use serde_json::{Map, Value};

use super::{DISCRIMINATOR, Entity, GenericEntity, Payload, shapes};
use crate::naming::type_name;

/// Builds an [`Entity`] from a JSON object carrying a registered
/// discriminator. The registry is passed along so nested payloads can be
/// reified with the same rules.
pub type Constructor =
    fn(&Map<String, Value>, &EntityRegistry) -> Result<Entity, serde_json::Error>;

static DEFAULT_REGISTRY: LazyLock<EntityRegistry> = LazyLock::new(EntityRegistry::with_defaults);

/// Registry of known entity shapes keyed by normalized discriminator.
#[derive(Clone, Default)]
pub struct EntityRegistry(HashMap<String, Constructor>);

impl Debug for EntityRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_tuple("EntityRegistry").field(&names).finish()
    }
}

impl EntityRegistry {
    /// Creates an empty registry. Every discriminator reifies as generic.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Creates a registry holding every built-in shape.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        shapes::register_builtin(&mut registry);
        registry
    }

    /// Returns the process-wide default registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &DEFAULT_REGISTRY
    }

    /// Registers a constructor under `kind`. The discriminator is
    /// normalized first; a later registration replaces an earlier one.
    pub fn register(&mut self, kind: &str, constructor: Constructor) -> &mut Self {
        self.0.insert(type_name(kind), constructor);
        self
    }

    /// Returns the constructor registered for a raw discriminator.
    #[must_use]
    pub fn lookup(&self, kind: &str) -> Option<Constructor> {
        self.0.get(&type_name(kind)).copied()
    }

    /// Reifies a decoded JSON value.
    ///
    /// - arrays are reified element-wise, preserving order and length;
    /// - objects with a string `entity` are built into the registered
    ///   shape, or into a [`GenericEntity`] when none matches;
    /// - objects without a discriminator and all other values are
    ///   returned unchanged.
    #[must_use]
    pub fn reify(&self, value: Value) -> Payload {
        match value {
            Value::Array(items) => {
                Payload::List(items.into_iter().map(|v| self.reify(v)).collect())
            }
            Value::Object(object) => self.reify_object(object),
            other => Payload::Value(other),
        }
    }

    fn reify_object(&self, object: Map<String, Value>) -> Payload {
        let Some(kind) = object.get(DISCRIMINATOR).and_then(Value::as_str) else {
            return Payload::Value(Value::Object(object));
        };

        let entity = match self.lookup(kind) {
            Some(construct) => construct(&object, self).unwrap_or_else(|err| {
                record_rejected_shape(kind, &err);
                Entity::Generic(GenericEntity::from_object(kind, &object))
            }),
            None => {
                record_unknown_kind(kind);
                Entity::Generic(GenericEntity::from_object(kind, &object))
            }
        };
        Payload::Entity(entity)
    }
}

/// Reifies a decoded JSON value against the default registry.
#[must_use]
pub fn reify(value: Value) -> Payload {
    EntityRegistry::global().reify(value)
}

#[cfg(feature = "telemetry")]
fn record_unknown_kind(kind: &str) {
    tracing::debug!(entity = kind, "no shape registered, using generic entity");
}

#[cfg(not(feature = "telemetry"))]
const fn record_unknown_kind(_kind: &str) {}

#[cfg(feature = "telemetry")]
fn record_rejected_shape(kind: &str, err: &serde_json::Error) {
    tracing::warn!(entity = kind, error = %err, "shape rejected payload, using generic entity");
}

#[cfg(not(feature = "telemetry"))]
const fn record_rejected_shape(_kind: &str, _err: &serde_json::Error) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Collection, Flag, Payment};
    use serde_json::json;

    #[test]
    fn test_reify_known_entity() {
        let payload = reify(json!({"id": "pay_1", "entity": "payment", "amount": 500}));
        let Some(Entity::Payment(payment)) = payload.into_entity() else {
            panic!("expected a payment");
        };
        assert_eq!(
            *payment,
            Payment {
                id: Some("pay_1".to_owned()),
                amount: Some(500),
                ..Payment::default()
            }
        );
    }

    #[test]
    fn test_reify_multi_word_discriminator() {
        let payload = reify(json!({"id": "plink_1", "entity": "payment_link", "amount": 100}));
        assert_eq!(payload.as_entity().map(Entity::kind), Some("payment_link"));
    }

    #[test]
    fn test_unknown_discriminator_falls_back_to_generic() {
        let payload = reify(json!({
            "id": "fund_1",
            "entity": "Fund_Account",
            "created_at": 1_700_000_000,
            "account_type": "bank_account"
        }));
        assert_eq!(
            payload.into_entity(),
            Some(Entity::Generic(GenericEntity {
                id: Some("fund_1".to_owned()),
                kind: "Fund_Account".to_owned(),
                created_at: Some(1_700_000_000),
            }))
        );
    }

    #[test]
    fn test_mistyped_field_keeps_shape() {
        let payload = reify(json!({
            "id": "sub_1",
            "entity": "subscription",
            "plan_id": "plan_1",
            "status": "created",
            "customer_notify": 1,
            "total_count": "twelve"
        }));
        let Some(Entity::Subscription(subscription)) = payload.into_entity() else {
            panic!("expected a subscription");
        };
        assert_eq!(subscription.id.as_deref(), Some("sub_1"));
        assert_eq!(subscription.plan_id.as_deref(), Some("plan_1"));
        assert_eq!(subscription.status.as_deref(), Some("created"));
        assert_eq!(subscription.customer_notify, Some(Flag(true)));
        assert!(subscription.total_count.is_none());

        let payload = reify(json!({"id": "pay_1", "entity": "payment", "amount": 500, "tax": 1.5}));
        let Some(Entity::Payment(payment)) = payload.into_entity() else {
            panic!("expected a payment");
        };
        assert_eq!(payment.amount, Some(500));
        assert!(payment.tax.is_none());
    }

    #[test]
    fn test_rejected_collection_falls_back_to_generic() {
        let payload = reify(json!({"entity": "collection", "count": 1, "items": "nope"}));
        let entity = payload.into_entity().unwrap();
        assert!(matches!(entity, Entity::Generic(_)));
        assert_eq!(entity.kind(), "collection");
    }

    #[test]
    fn test_object_without_discriminator_is_unchanged() {
        let value = json!({"iin": "411111", "network": "Visa"});
        assert_eq!(reify(value.clone()), Payload::Value(value));
    }

    #[test]
    fn test_non_string_discriminator_is_unchanged() {
        let value = json!({"entity": 7});
        assert_eq!(reify(value.clone()), Payload::Value(value));
    }

    #[test]
    fn test_scalars_and_null_are_unchanged() {
        assert_eq!(reify(json!(42)), Payload::Value(json!(42)));
        assert_eq!(reify(Value::Null), Payload::Value(Value::Null));
    }

    #[test]
    fn test_array_preserves_order_and_length() {
        let payload = reify(json!([
            {"id": "order_1", "entity": "order"},
            {"plain": true},
            {"id": "x_1", "entity": "mystery"},
            3
        ]));
        let items = payload.as_list().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].as_entity().map(Entity::kind), Some("order"));
        assert_eq!(items[1].as_value(), Some(&json!({"plain": true})));
        assert_eq!(items[2].as_entity().map(Entity::kind), Some("mystery"));
        assert_eq!(items[3].as_value(), Some(&json!(3)));
    }

    #[test]
    fn test_collection_items_are_reified() {
        let payload = reify(json!({
            "entity": "collection",
            "count": 2,
            "items": [
                {"id": "rfnd_2", "entity": "refund", "amount": 50},
                {"id": "rfnd_1", "entity": "refund", "amount": 20}
            ]
        }));
        let Some(Entity::Collection(collection)) = payload.into_entity() else {
            panic!("expected a collection");
        };
        let Collection { count, items } = *collection;
        assert_eq!(count, Some(2));
        let ids: Vec<_> = items
            .iter()
            .filter_map(|item| item.as_entity().and_then(Entity::id))
            .collect();
        assert_eq!(ids, ["rfnd_2", "rfnd_1"]);
    }

    #[test]
    fn test_custom_registry_registration() {
        fn as_generic(
            object: &Map<String, Value>,
            _: &EntityRegistry,
        ) -> Result<Entity, serde_json::Error> {
            Ok(Entity::Generic(GenericEntity::from_object("custom", object)))
        }

        let mut registry = EntityRegistry::new();
        registry.register("fund_account", as_generic);
        assert!(registry.lookup("FUND_ACCOUNT").is_some());

        let payload = registry.reify(json!({"id": "fa_1", "entity": "fund_account"}));
        assert_eq!(payload.as_entity().map(Entity::kind), Some("custom"));

        let payload = registry.reify(json!({"id": "pay_1", "entity": "payment"}));
        assert!(matches!(payload.into_entity(), Some(Entity::Generic(_))));
    }
}
