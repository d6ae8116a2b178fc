//! Gateway endpoint table.
//!
//! Resource operations are plain data: a method, a path template with `{}`
//! placeholders, a host and the body keys the gateway requires. The
//! [`Client`](crate::client::Client) fills the template and dispatches the
//! call through the shared pipeline.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::request::{Host, Operation};
use crate::transport::Method::{self, Delete, Get, Patch, Post, Put};

/// A single resource operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Dotted name, e.g. `"payments.capture"`.
    pub name: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Path template; each `{}` takes one path parameter.
    pub path: &'static str,
    /// Target host.
    pub host: Host,
    /// Body keys that must be present.
    pub required: &'static [&'static str],
}

impl Endpoint {
    const fn api(
        name: &'static str,
        method: Method,
        path: &'static str,
        required: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            method,
            path,
            host: Host::Api,
            required,
        }
    }

    /// Returns the number of path parameters the template takes.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.path.matches("{}").count()
    }

    /// Fills the path template with `params`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathParameters`] if the number of parameters does
    /// not match the template.
    pub fn path_with(&self, params: &[&str]) -> Result<String, Error> {
        let expected = self.arity();
        if params.len() != expected {
            return Err(Error::PathParameters {
                endpoint: self.name,
                expected,
                got: params.len(),
            });
        }

        let capacity = self.path.len() + params.iter().map(|param| param.len()).sum::<usize>();
        let mut path = String::with_capacity(capacity);
        let mut pieces = self.path.split("{}");
        if let Some(head) = pieces.next() {
            path.push_str(head);
        }
        for (piece, param) in pieces.zip(params) {
            path.push_str(param);
            path.push_str(piece);
        }
        Ok(path)
    }

    /// Checks that every required key is present in `body`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] naming the first absent key.
    pub fn check_required(&self, body: &Map<String, Value>) -> Result<(), Error> {
        match self.required.iter().find(|key| !body.contains_key(**key)) {
            Some(&key) => Err(Error::MissingParameter {
                endpoint: self.name,
                key,
            }),
            None => Ok(()),
        }
    }

    /// Builds the [`Operation`] for this endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the path parameters do not fit the template or
    /// a required body key is missing.
    pub fn operation(
        &self,
        params: &[&str],
        body: Map<String, Value>,
    ) -> Result<Operation, Error> {
        self.check_required(&body)?;
        let path = self.path_with(params)?;
        Ok(Operation::new(self.method, path)
            .with_host(self.host)
            .with_body(body))
    }
}

/// Every known gateway endpoint.
#[rustfmt::skip]
pub static ENDPOINTS: &[Endpoint] = &[
    // Orders
    Endpoint::api("orders.create", Post, "/orders", &["amount", "currency"]),
    Endpoint::api("orders.fetch", Get, "/orders/{}", &[]),
    Endpoint::api("orders.all", Get, "/orders", &[]),
    Endpoint::api("orders.payments", Get, "/orders/{}/payments", &[]),
    Endpoint::api("orders.edit", Patch, "/orders/{}", &[]),
    // Payments
    Endpoint::api("payments.fetch", Get, "/payments/{}", &[]),
    Endpoint::api("payments.all", Get, "/payments", &[]),
    Endpoint::api("payments.capture", Post, "/payments/{}/capture", &["amount", "currency"]),
    Endpoint::api("payments.edit", Patch, "/payments/{}", &["notes"]),
    Endpoint::api("payments.refund", Post, "/payments/{}/refund", &[]),
    Endpoint::api("payments.refunds", Get, "/payments/{}/refunds", &[]),
    Endpoint::api("payments.card", Get, "/payments/{}/card", &[]),
    Endpoint::api("payments.bank_transfer", Get, "/payments/{}/bank_transfer", &[]),
    Endpoint::api("payments.transfer", Post, "/payments/{}/transfers", &["transfers"]),
    // Refunds
    Endpoint::api("refunds.fetch", Get, "/refunds/{}", &[]),
    Endpoint::api("refunds.all", Get, "/refunds", &[]),
    Endpoint::api("refunds.edit", Patch, "/refunds/{}", &["notes"]),
    // Customers
    Endpoint::api("customers.create", Post, "/customers", &["name"]),
    Endpoint::api("customers.fetch", Get, "/customers/{}", &[]),
    Endpoint::api("customers.all", Get, "/customers", &[]),
    Endpoint::api("customers.edit", Put, "/customers/{}", &[]),
    Endpoint::api("customers.tokens", Get, "/customers/{}/tokens", &[]),
    Endpoint::api("customers.token", Get, "/customers/{}/tokens/{}", &[]),
    Endpoint::api("customers.delete_token", Delete, "/customers/{}/tokens/{}", &[]),
    // Invoices
    Endpoint::api("invoices.create", Post, "/invoices", &["type"]),
    Endpoint::api("invoices.fetch", Get, "/invoices/{}", &[]),
    Endpoint::api("invoices.all", Get, "/invoices", &[]),
    Endpoint::api("invoices.edit", Patch, "/invoices/{}", &[]),
    Endpoint::api("invoices.issue", Post, "/invoices/{}/issue", &[]),
    Endpoint::api("invoices.cancel", Post, "/invoices/{}/cancel", &[]),
    Endpoint::api("invoices.delete", Delete, "/invoices/{}", &[]),
    Endpoint::api("invoices.notify", Post, "/invoices/{}/notify_by/{}", &[]),
    // Items
    Endpoint::api("items.create", Post, "/items", &["name", "amount", "currency"]),
    Endpoint::api("items.fetch", Get, "/items/{}", &[]),
    Endpoint::api("items.all", Get, "/items", &[]),
    Endpoint::api("items.edit", Patch, "/items/{}", &[]),
    Endpoint::api("items.delete", Delete, "/items/{}", &[]),
    // Plans
    Endpoint::api("plans.create", Post, "/plans", &["period", "interval", "item"]),
    Endpoint::api("plans.fetch", Get, "/plans/{}", &[]),
    Endpoint::api("plans.all", Get, "/plans", &[]),
    // Subscriptions
    Endpoint::api("subscriptions.create", Post, "/subscriptions", &["plan_id", "total_count"]),
    Endpoint::api("subscriptions.fetch", Get, "/subscriptions/{}", &[]),
    Endpoint::api("subscriptions.all", Get, "/subscriptions", &[]),
    Endpoint::api("subscriptions.update", Patch, "/subscriptions/{}", &[]),
    Endpoint::api("subscriptions.cancel", Post, "/subscriptions/{}/cancel", &[]),
    Endpoint::api("subscriptions.pause", Post, "/subscriptions/{}/pause", &[]),
    Endpoint::api("subscriptions.resume", Post, "/subscriptions/{}/resume", &[]),
    Endpoint::api(
        "subscriptions.create_addon", Post, "/subscriptions/{}/addons", &["item", "quantity"],
    ),
    // Addons
    Endpoint::api("addons.fetch", Get, "/addons/{}", &[]),
    Endpoint::api("addons.all", Get, "/addons", &[]),
    Endpoint::api("addons.delete", Delete, "/addons/{}", &[]),
    // Settlements
    Endpoint::api("settlements.fetch", Get, "/settlements/{}", &[]),
    Endpoint::api("settlements.all", Get, "/settlements", &[]),
    Endpoint::api("settlements.recon", Get, "/settlements/recon/combined", &[]),
    // Transfers
    Endpoint::api("transfers.create", Post, "/transfers", &["account", "amount", "currency"]),
    Endpoint::api("transfers.fetch", Get, "/transfers/{}", &[]),
    Endpoint::api("transfers.all", Get, "/transfers", &[]),
    Endpoint::api("transfers.edit", Patch, "/transfers/{}", &[]),
    Endpoint::api("transfers.reverse", Post, "/transfers/{}/reversals", &[]),
    // Virtual accounts
    Endpoint::api("virtual_accounts.create", Post, "/virtual_accounts", &["receivers"]),
    Endpoint::api("virtual_accounts.fetch", Get, "/virtual_accounts/{}", &[]),
    Endpoint::api("virtual_accounts.all", Get, "/virtual_accounts", &[]),
    Endpoint::api("virtual_accounts.payments", Get, "/virtual_accounts/{}/payments", &[]),
    Endpoint::api("virtual_accounts.close", Post, "/virtual_accounts/{}/close", &[]),
    // Payment links
    Endpoint::api("payment_links.create", Post, "/payment_links", &["amount"]),
    Endpoint::api("payment_links.fetch", Get, "/payment_links/{}", &[]),
    Endpoint::api("payment_links.all", Get, "/payment_links", &[]),
    Endpoint::api("payment_links.edit", Patch, "/payment_links/{}", &[]),
    Endpoint::api("payment_links.cancel", Post, "/payment_links/{}/cancel", &[]),
    Endpoint::api("payment_links.notify", Post, "/payment_links/{}/notify_by/{}", &[]),
    // QR codes
    Endpoint::api("qr_codes.create", Post, "/payments/qr_codes", &["type", "usage"]),
    Endpoint::api("qr_codes.fetch", Get, "/payments/qr_codes/{}", &[]),
    Endpoint::api("qr_codes.all", Get, "/payments/qr_codes", &[]),
    Endpoint::api("qr_codes.payments", Get, "/payments/qr_codes/{}/payments", &[]),
    Endpoint::api("qr_codes.close", Post, "/payments/qr_codes/{}/close", &[]),
    // Tokens
    Endpoint::api("tokens.fetch", Post, "/tokens/fetch", &["id"]),
    Endpoint::api("tokens.delete", Post, "/tokens/delete", &["id"]),
    // Disputes
    Endpoint::api("disputes.fetch", Get, "/disputes/{}", &[]),
    Endpoint::api("disputes.all", Get, "/disputes", &[]),
    Endpoint::api("disputes.accept", Post, "/disputes/{}/accept", &[]),
    Endpoint::api("disputes.contest", Patch, "/disputes/{}/contest", &["action"]),
    // OAuth
    Endpoint {
        name: "oauth.token",
        method: Post,
        path: "/token",
        host: Host::Auth,
        required: &["client_id", "client_secret", "grant_type"],
    },
    Endpoint {
        name: "oauth.revoke",
        method: Post,
        path: "/revoke",
        host: Host::Auth,
        required: &["client_id", "client_secret", "token", "token_type_hint"],
    },
];

/// Looks up an endpoint by name.
#[must_use]
pub fn endpoint(name: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|endpoint| endpoint.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_endpoint_names_are_unique() {
        let names: HashSet<&str> = ENDPOINTS.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), ENDPOINTS.len());
    }

    #[test]
    fn test_lookup() {
        let capture = endpoint("payments.capture").unwrap();
        assert_eq!(capture.method, Method::Post);
        assert_eq!(capture.arity(), 1);
        assert!(endpoint("payments.teleport").is_none());
    }

    #[test]
    fn test_path_with_fills_placeholders_in_order() {
        let ep = endpoint("customers.token").unwrap();
        assert_eq!(
            ep.path_with(&["cust_1", "token_9"]).unwrap(),
            "/customers/cust_1/tokens/token_9"
        );
        assert_eq!(endpoint("orders.all").unwrap().path_with(&[]).unwrap(), "/orders");
    }

    #[test]
    fn test_path_with_rejects_wrong_arity() {
        let err = endpoint("orders.fetch").unwrap().path_with(&[]).unwrap_err();
        assert!(matches!(
            err,
            Error::PathParameters {
                endpoint: "orders.fetch",
                expected: 1,
                got: 0
            }
        ));
    }

    #[test]
    fn test_required_keys() {
        let ep = endpoint("orders.create").unwrap();
        let body = json!({"amount": 500}).as_object().cloned().unwrap();
        let err = ep.operation(&[], body).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingParameter {
                endpoint: "orders.create",
                key: "currency"
            }
        ));

        let body = json!({"amount": 500, "currency": "INR"}).as_object().cloned().unwrap();
        let op = ep.operation(&[], body).unwrap();
        assert_eq!(op.path, "/orders");
        assert_eq!(op.method, Method::Post);
    }

    #[test]
    fn test_oauth_endpoints_target_auth_host() {
        assert_eq!(endpoint("oauth.token").unwrap().host, Host::Auth);
        assert_eq!(endpoint("orders.fetch").unwrap().host, Host::Api);
    }
}
