//! Authenticated identities and the provider interface.
//!
//! Lamina does not store users or verify credentials itself. An application
//! plugs in an [`AuthProvider`] that turns the raw credential header into an
//! [`Identity`], or fails with [`LaminaError::Authentication`]. The framework
//! only needs two things from an identity: that it exists, and its role.

use crate::error::LaminaError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An authenticated principal returned by an [`AuthProvider`].
///
/// Implementations are free to carry any data; handlers recover the concrete
/// type with [`downcast_ref`](trait.Identity.html#method.downcast_ref).
///
/// # Example
///
/// ```
/// use lamina_core::Identity;
/// use std::any::Any;
///
/// #[derive(Debug)]
/// struct Employee {
///     id: String,
///     department: String,
/// }
///
/// impl Identity for Employee {
///     fn subject(&self) -> &str {
///         &self.id
///     }
///
///     fn role(&self) -> Option<&str> {
///         Some(&self.department)
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Identity: fmt::Debug + Send + Sync + 'static {
    /// Returns a stable identifier suitable for logging.
    fn subject(&self) -> &str;

    /// Returns the role consulted by role-gated parameters.
    fn role(&self) -> Option<&str> {
        None
    }

    /// Returns `self` as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Identity {
    /// Returns the identity as `T` if that is its concrete type.
    pub fn downcast_ref<T: Identity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Shared handle to an authenticated identity.
pub type SharedIdentity = Arc<dyn Identity>;

/// Resolves a credential into an [`Identity`].
///
/// `credential` is the raw value of the configured credential header
/// (`Authorization` unless changed), or `None` when the header is absent.
/// Failures other than [`LaminaError::Authentication`] (for example
/// [`LaminaError::ProviderUnavailable`]) are propagated even for optional
/// identity parameters.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Authenticates the caller.
    async fn authenticate(&self, credential: Option<&str>) -> Result<SharedIdentity, LaminaError>;
}

/// A ready-made identity with a subject, an optional role, and free-form claims.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicIdentity {
    subject: String,
    role: Option<String>,
    claims: Map<String, Value>,
}

impl BasicIdentity {
    /// Creates an identity without a role.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            role: None,
            claims: Map::new(),
        }
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Adds a claim.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// Returns a claim by name.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

impl Identity for BasicIdentity {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Strips a case-insensitive `Bearer ` scheme from a credential header value.
///
/// Providers that expect bearer tokens can call this on the raw credential.
pub fn bearer_token(credential: &str) -> Option<&str> {
    let (scheme, token) = credential.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    } else {
        None
    }
}
