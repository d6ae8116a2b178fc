//! Typed gateway entities and reification of decoded JSON.
//!
//! Gateway responses carry an `entity` discriminator (`"payment"`,
//! `"order"`, ...). The [`EntityRegistry`] maps the normalized
//! discriminator to a constructor for the matching record shape; an
//! unrecognized discriminator yields a [`GenericEntity`] that keeps the
//! original string.
//!
//! Every shape declares an explicit field allowlist ([`EntityShape::FIELDS`]).
//! Construction copies only allowlisted keys and ignores the rest; an
//! allowlisted key that is absent (or `null`) stays `None`.

mod registry;
mod shapes;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use registry::{Constructor, EntityRegistry, reify};
pub use shapes::{
    Addon, Card, Customer, Dispute, Entity, Flag, Invoice, Item, Order, Payment, PaymentLink,
    Plan, QrCode, Refund, Settlement, Subscription, Token, Transfer, VirtualAccount,
};

/// JSON key holding the discriminator.
pub const DISCRIMINATOR: &str = "entity";

/// A record shape reconstructed from a gateway JSON object.
pub trait EntityShape: DeserializeOwned {
    /// Discriminator value this shape is registered under.
    const KIND: &'static str;

    /// Keys copied from the JSON object; all others are dropped.
    const FIELDS: &'static [&'static str];

    /// Builds the shape from the allowlisted keys of `object`.
    ///
    /// Each key is checked on its own: a value of the wrong JSON type
    /// leaves that field unset and the rest of the shape is still built.
    ///
    /// # Errors
    ///
    /// Returns an error only if the accepted fields fail to deserialize
    /// together, which cannot happen for all-optional shapes.
    fn from_fields(object: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut accepted = Map::new();
        for &key in Self::FIELDS {
            let Some(value) = object.get(key) else {
                continue;
            };
            let single = Map::from_iter([(key.to_owned(), value.clone())]);
            match serde_json::from_value::<Self>(Value::Object(single)) {
                Ok(_) => {
                    accepted.insert(key.to_owned(), value.clone());
                }
                Err(err) => record_rejected_field(Self::KIND, key, &err),
            }
        }
        serde_json::from_value(Value::Object(accepted))
    }
}

#[cfg(feature = "telemetry")]
fn record_rejected_field(kind: &str, field: &str, err: &serde_json::Error) {
    tracing::warn!(
        entity = kind,
        field,
        error = %err,
        "field has unexpected type, leaving it unset"
    );
}

#[cfg(not(feature = "telemetry"))]
const fn record_rejected_field(_kind: &str, _field: &str, _err: &serde_json::Error) {}

/// Fallback for objects whose discriminator matches no known shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericEntity {
    /// Entity id, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The original discriminator string, exactly as received.
    #[serde(rename = "entity")]
    pub kind: String,
    /// Creation timestamp (Unix seconds), if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl GenericEntity {
    /// Builds the fallback record from an object and its raw discriminator.
    #[must_use]
    pub fn from_object(kind: &str, object: &Map<String, Value>) -> Self {
        Self {
            id: object.get("id").and_then(Value::as_str).map(str::to_owned),
            kind: kind.to_owned(),
            created_at: object.get("created_at").and_then(Value::as_i64),
        }
    }
}

/// A paginated list (`"entity": "collection"`).
///
/// `items` are reified element-wise with the same rules as top-level
/// payloads, preserving order.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    /// Number of items the gateway reports.
    pub count: Option<u64>,
    /// Reified items.
    pub items: Vec<Payload>,
}

impl Collection {
    /// Discriminator value for collections.
    pub const KIND: &'static str = "collection";

    pub(crate) fn construct(
        object: &Map<String, Value>,
        registry: &EntityRegistry,
    ) -> Result<Entity, serde_json::Error> {
        let items = match object.get("items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().cloned().map(|v| registry.reify(v)).collect(),
            Some(other) => {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "collection items must be an array, got {other}"
                )));
            }
        };
        Ok(Entity::Collection(Box::new(Self {
            count: object.get("count").and_then(Value::as_u64),
            items,
        })))
    }
}

/// The result of reifying a decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// An object carrying an `entity` discriminator.
    Entity(Entity),
    /// A JSON array, reified element-wise in order.
    List(Vec<Payload>),
    /// Anything else, returned as decoded: objects without a
    /// discriminator, scalars and `null`.
    Value(Value),
}

impl Payload {
    /// The payload for an empty successful response body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Value(Value::Object(Map::new()))
    }

    /// Returns the entity, if this payload is one.
    #[must_use]
    pub const fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Consumes the payload and returns the entity, if it is one.
    #[must_use]
    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Returns the elements, if this payload is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the untouched JSON value, if the payload was not reified.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}
