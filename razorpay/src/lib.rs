#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core client for the Razorpay payment gateway.
//!
//! This crate holds the request/response pipeline shared by every gateway
//! resource. It is transport-agnostic: the actual network call sits behind
//! the [`HttpAdapter`] trait, with a `reqwest` implementation provided by
//! the `razorpay-http` crate.
//!
//! # Overview
//!
//! A call flows through four stages:
//!
//! 1. [`request::build`] turns an [`Operation`] and a resolved
//!    [`Config`] into a URL, merged headers and an encoded body.
//! 2. An [`HttpAdapter`] dispatches it and returns a raw status and body.
//! 3. [`response::classify`] decides success or failure.
//! 4. Success bodies are reified into typed [`Entity`] records; failure
//!    bodies are mapped onto an [`ApiError`] by the error registry.
//!
//! Resource calls (`orders.create`, `payments.capture`, ...) are rows in
//! the [`endpoint`] table rather than hand-written methods.
//!
//! # Modules
//!
//! - [`client`] - The [`Client`] driving the pipeline
//! - [`config`] - Credentials, base URLs and timeouts
//! - [`endpoint`] - Table of gateway endpoints
//! - [`entity`] - Typed entities and the reifier
//! - [`error`] - Error taxonomy and gateway error classification
//! - [`naming`] - Discriminator normalization
//! - [`request`] - Request building
//! - [`response`] - Response classification
//! - [`transport`] - The transport seam
//! - [`webhook`] - Webhook and checkout signature verification
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod client;
pub mod config;
pub mod endpoint;
pub mod entity;
pub mod error;
pub mod naming;
pub mod request;
pub mod response;
pub mod transport;
pub mod webhook;

pub use client::Client;
pub use config::{AuthMode, Config, Credentials};
pub use entity::{Entity, GenericEntity, Payload};
pub use error::{ApiError, Error, ErrorKind};
pub use request::Operation;
pub use transport::{HttpAdapter, Method, RawResponse};
