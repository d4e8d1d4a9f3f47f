//! Explicit session tokens.
//!
//! Identity is delegated to an external provider. Instead of ambient auth
//! state, each orchestration call receives a `Session` extracted from the
//! request, so the pipeline stays a pure function of its inputs.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use secrecy::SecretString;

/// The caller's session for one request.
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    /// A session with no token (unauthenticated caller).
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// A session carrying a bearer token from the identity provider.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
        }
    }

    /// Whether the caller presented a token. Verification is the external
    /// identity provider's concern.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .map(Session::bearer)
            .unwrap_or_else(Session::anonymous);

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_not_authenticated() {
        assert!(!Session::anonymous().is_authenticated());
    }

    #[test]
    fn bearer_is_authenticated() {
        assert!(Session::bearer("tok-123").is_authenticated());
    }

    #[test]
    fn debug_does_not_leak_token() {
        let session = Session::bearer("super-secret");
        let debugged = format!("{session:?}");
        assert!(!debugged.contains("super-secret"));
    }
}
