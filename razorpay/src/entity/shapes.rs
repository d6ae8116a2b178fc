//! Known entity shapes.
//!
//! Each shape lists the JSON keys it keeps. Adding a shape for a new
//! gateway entity means adding one block to the [`entity_shapes!`] call
//! below; discriminators without a block keep working through
//! [`GenericEntity`].

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, EntityRegistry, EntityShape, GenericEntity};

/// A boolean the gateway sends either as `true`/`false` or as `1`/`0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Flag(pub bool);

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        flag.0
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(value) => Ok(Self(value)),
            Raw::Int(0) => Ok(Self(false)),
            Raw::Int(1) => Ok(Self(true)),
            Raw::Int(other) => Err(de::Error::custom(format!(
                "expected a boolean or 0/1, got {other}"
            ))),
        }
    }
}

/// Defines record shapes, their field allowlists, the [`Entity`] enum and
/// the built-in registrations.
macro_rules! entity_shapes {
    ($(
        $(#[$meta:meta])*
        $variant:ident => $kind:literal {
            $($field:ident: $ty:ty),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            ///
            /// Fields mirror the gateway's JSON keys. All are optional; keys
            /// outside this list are dropped during reification.
            #[allow(missing_docs)]
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct $variant {
                $(
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $field: Option<$ty>,
                )*
            }

            impl EntityShape for $variant {
                const KIND: &'static str = $kind;
                const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];
            }
        )*

        /// A reified gateway entity.
        #[derive(Debug, Clone, PartialEq)]
        #[non_exhaustive]
        pub enum Entity {
            $(
                #[doc = concat!("`", $kind, "`")]
                $variant(Box<$variant>),
            )*
            /// `collection`
            Collection(Box<Collection>),
            /// Any discriminator without a registered shape.
            Generic(GenericEntity),
        }

        impl Entity {
            /// Returns the discriminator this entity was built from.
            ///
            /// For [`Entity::Generic`] this is the original, un-normalized
            /// string.
            #[must_use]
            pub fn kind(&self) -> &str {
                match self {
                    $(Self::$variant(_) => $kind,)*
                    Self::Collection(_) => Collection::KIND,
                    Self::Generic(generic) => &generic.kind,
                }
            }

            /// Returns the entity id, if known.
            #[must_use]
            pub fn id(&self) -> Option<&str> {
                match self {
                    $(Self::$variant(entity) => entity.id.as_deref(),)*
                    Self::Collection(_) => None,
                    Self::Generic(generic) => generic.id.as_deref(),
                }
            }
        }

        pub(super) fn register_builtin(registry: &mut EntityRegistry) {
            $(
                registry.register($kind, |object, _| {
                    $variant::from_fields(object).map(|shape| Entity::$variant(Box::new(shape)))
                });
            )*
            registry.register(Collection::KIND, Collection::construct);
        }
    };
}

entity_shapes! {
    /// A payment attempt.
    Payment => "payment" {
        id: String,
        amount: i64,
        currency: String,
        status: String,
        order_id: String,
        invoice_id: String,
        international: bool,
        method: String,
        amount_refunded: i64,
        refund_status: String,
        captured: bool,
        description: String,
        card_id: String,
        card: Value,
        bank: String,
        wallet: String,
        vpa: String,
        email: String,
        contact: String,
        customer_id: String,
        token_id: String,
        notes: Value,
        fee: i64,
        tax: i64,
        error_code: String,
        error_description: String,
        error_source: String,
        error_step: String,
        error_reason: String,
        acquirer_data: Value,
        created_at: i64,
    }

    /// An order payments are made against.
    Order => "order" {
        id: String,
        amount: i64,
        amount_paid: i64,
        amount_due: i64,
        currency: String,
        receipt: String,
        offer_id: String,
        status: String,
        attempts: i64,
        notes: Value,
        created_at: i64,
    }

    /// A full or partial refund of a payment.
    Refund => "refund" {
        id: String,
        amount: i64,
        currency: String,
        payment_id: String,
        notes: Value,
        receipt: String,
        acquirer_data: Value,
        status: String,
        speed_requested: String,
        speed_processed: String,
        batch_id: String,
        created_at: i64,
    }

    /// A stored customer.
    Customer => "customer" {
        id: String,
        name: String,
        email: String,
        contact: String,
        gstin: String,
        notes: Value,
        created_at: i64,
    }

    /// An invoice or payment request.
    Invoice => "invoice" {
        id: String,
        receipt: String,
        invoice_number: String,
        customer_id: String,
        customer_details: Value,
        order_id: String,
        subscription_id: String,
        line_items: Value,
        payment_id: String,
        status: String,
        expire_by: i64,
        issued_at: i64,
        paid_at: i64,
        cancelled_at: i64,
        expired_at: i64,
        sms_status: String,
        email_status: String,
        date: i64,
        terms: String,
        partial_payment: bool,
        gross_amount: i64,
        tax_amount: i64,
        taxable_amount: i64,
        amount: i64,
        amount_paid: i64,
        amount_due: i64,
        currency: String,
        description: String,
        notes: Value,
        short_url: String,
        created_at: i64,
    }

    /// A reusable catalogue item.
    Item => "item" {
        id: String,
        active: bool,
        name: String,
        description: String,
        amount: i64,
        unit_amount: i64,
        currency: String,
        unit: String,
        hsn_code: String,
        sac_code: String,
        tax_inclusive: bool,
        created_at: i64,
    }

    /// A subscription billing plan.
    Plan => "plan" {
        id: String,
        interval: i64,
        period: String,
        item: Value,
        notes: Value,
        created_at: i64,
    }

    /// A recurring subscription.
    Subscription => "subscription" {
        id: String,
        plan_id: String,
        customer_id: String,
        status: String,
        current_start: i64,
        current_end: i64,
        ended_at: i64,
        quantity: i64,
        notes: Value,
        charge_at: i64,
        start_at: i64,
        end_at: i64,
        auth_attempts: i64,
        total_count: i64,
        paid_count: i64,
        remaining_count: i64,
        customer_notify: Flag,
        expire_by: i64,
        short_url: String,
        has_scheduled_changes: bool,
        change_scheduled_at: i64,
        offer_id: String,
        created_at: i64,
    }

    /// A one-off charge added to a subscription.
    Addon => "addon" {
        id: String,
        item: Value,
        quantity: i64,
        subscription_id: String,
        invoice_id: String,
        created_at: i64,
    }

    /// A settlement to the merchant's bank account.
    Settlement => "settlement" {
        id: String,
        amount: i64,
        status: String,
        fees: i64,
        tax: i64,
        utr: String,
        created_at: i64,
    }

    /// A Route transfer to a linked account.
    Transfer => "transfer" {
        id: String,
        source: String,
        recipient: String,
        amount: i64,
        currency: String,
        amount_reversed: i64,
        notes: Value,
        linked_account_notes: Value,
        fees: i64,
        tax: i64,
        on_hold: bool,
        on_hold_until: i64,
        recipient_settlement_id: String,
        processed_at: i64,
        error: Value,
        created_at: i64,
    }

    /// A saved payment instrument.
    Token => "token" {
        id: String,
        method: String,
        card: Value,
        vpa: Value,
        bank: String,
        wallet: String,
        recurring: bool,
        recurring_details: Value,
        auth_type: String,
        mrn: String,
        max_amount: i64,
        used_at: i64,
        expired_at: i64,
        status: String,
        notes: Value,
        created_at: i64,
    }

    /// A virtual account for bank transfers.
    VirtualAccount => "virtual_account" {
        id: String,
        name: String,
        status: String,
        description: String,
        amount_expected: i64,
        amount_paid: i64,
        notes: Value,
        customer_id: String,
        receivers: Value,
        close_by: i64,
        closed_at: i64,
        created_at: i64,
    }

    /// A shareable payment link.
    PaymentLink => "payment_link" {
        id: String,
        accept_partial: bool,
        amount: i64,
        amount_paid: i64,
        currency: String,
        customer: Value,
        description: String,
        expire_by: i64,
        expired_at: i64,
        cancelled_at: i64,
        first_min_partial_amount: i64,
        notes: Value,
        notify: Value,
        payments: Value,
        reference_id: String,
        reminder_enable: bool,
        reminders: Value,
        short_url: String,
        status: String,
        upi_link: bool,
        user_id: String,
        updated_at: i64,
        created_at: i64,
    }

    /// A UPI QR code.
    QrCode => "qr_code" {
        id: String,
        name: String,
        usage: String,
        fixed_amount: bool,
        payment_amount: i64,
        status: String,
        description: String,
        customer_id: String,
        image_url: String,
        payments_amount_received: i64,
        payments_count_received: i64,
        notes: Value,
        close_by: i64,
        closed_at: i64,
        close_reason: String,
        created_at: i64,
    }

    /// A chargeback or dispute raised against a payment.
    Dispute => "dispute" {
        id: String,
        payment_id: String,
        amount: i64,
        currency: String,
        amount_deducted: i64,
        reason_code: String,
        reason_description: String,
        respond_by: i64,
        status: String,
        phase: String,
        created_at: i64,
    }

    /// Card details attached to a payment or token.
    Card => "card" {
        id: String,
        name: String,
        last4: String,
        network: String,
        issuer: String,
        international: bool,
        emi: bool,
        sub_type: String,
        token_iin: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_allowlist_matches_struct() {
        assert_eq!(Order::FIELDS.len(), 11);
        assert!(Payment::FIELDS.contains(&"amount_refunded"));
        assert!(!Payment::FIELDS.contains(&"entity"));
    }

    #[test]
    fn test_from_fields_drops_unknown_keys() {
        let object = json!({
            "id": "cust_1",
            "entity": "customer",
            "name": "Gaurav",
            "shipping_address": {"line1": "x"},
        });
        let customer = Customer::from_fields(object.as_object().unwrap()).unwrap();
        assert_eq!(customer.id.as_deref(), Some("cust_1"));
        assert_eq!(customer.name.as_deref(), Some("Gaurav"));
        assert!(customer.email.is_none());
    }

    #[test]
    fn test_null_field_is_unset() {
        let object = json!({"id": "order_1", "receipt": null, "amount": 0});
        let order = Order::from_fields(object.as_object().unwrap()).unwrap();
        assert!(order.receipt.is_none());
        assert_eq!(order.amount, Some(0));
    }

    #[test]
    fn test_wrong_field_type_leaves_field_unset() {
        let object = json!({"id": "pay_1", "amount": "five hundred", "tax": 1.5, "fee": 10});
        let payment = Payment::from_fields(object.as_object().unwrap()).unwrap();
        assert_eq!(payment.id.as_deref(), Some("pay_1"));
        assert!(payment.amount.is_none());
        assert!(payment.tax.is_none());
        assert_eq!(payment.fee, Some(10));
    }

    #[test]
    fn test_flag_accepts_bool_and_int() {
        let object = json!({"id": "sub_1", "customer_notify": 1});
        let subscription = Subscription::from_fields(object.as_object().unwrap()).unwrap();
        assert_eq!(subscription.customer_notify, Some(Flag(true)));

        let object = json!({"customer_notify": false});
        let subscription = Subscription::from_fields(object.as_object().unwrap()).unwrap();
        assert_eq!(subscription.customer_notify, Some(Flag(false)));

        let object = json!({"customer_notify": 7});
        let subscription = Subscription::from_fields(object.as_object().unwrap()).unwrap();
        assert!(subscription.customer_notify.is_none());
    }

    #[test]
    fn test_serialize_skips_unset_fields() {
        let refund = Refund {
            id: Some("rfnd_1".to_owned()),
            amount: Some(100),
            ..Refund::default()
        };
        assert_eq!(
            serde_json::to_value(&refund).unwrap(),
            json!({"id": "rfnd_1", "amount": 100})
        );
    }

    #[test]
    fn test_entity_kind_and_id() {
        let entity = Entity::VirtualAccount(Box::new(VirtualAccount {
            id: Some("va_1".to_owned()),
            ..VirtualAccount::default()
        }));
        assert_eq!(entity.kind(), "virtual_account");
        assert_eq!(entity.id(), Some("va_1"));
    }
}
