//! # Lamina Core
//!
//! Core types and traits for the Lamina serverless HTTP framework.
//!
//! This crate provides the vocabulary shared by every other Lamina crate:
//!
//! - [`LaminaError`] / [`ErrorKind`] - the failure taxonomy and its status codes
//! - [`ValidationFailure`] - a fully described parameter failure
//! - [`Request`] / [`QueryParams`] - the normalized inbound request
//! - [`Response`] / [`IntoResponse`] - handler results and their normalization
//! - [`ProxyEvent`] / [`ProxyResponse`] - the platform envelopes
//! - [`Identity`] / [`AuthProvider`] - the authentication seam
//! - [`RequestId`] - UUID v7 invocation identifier

#![doc(html_root_url = "https://docs.rs/lamina-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod event;
mod identity;
mod request;
mod response;

pub use context::RequestId;
pub use error::{
    is_sensitive_name, Constraint, ErrorBody, ErrorKind, LaminaError, LaminaResult, ParamSource,
    ValidationFailure,
};
pub use event::{ProxyEvent, ProxyRequestContext, ProxyResponse};
pub use identity::{bearer_token, AuthProvider, BasicIdentity, Identity, SharedIdentity};
pub use request::{QueryParams, Request};
pub use response::{Body, IntoResponse, Json, Response, APPLICATION_JSON};

/// Re-exported so implementors of [`AuthProvider`] need no direct dependency.
pub use async_trait::async_trait;
/// Re-exported path parameter storage.
pub use lamina_router::PathParams;
