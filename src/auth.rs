//! Bearer-token authentication against an external identity provider.
//!
//! Token validation itself is delegated; this module only extracts the token from an
//! `Authorization` header value and turns every rejection into [`Error::Unauthorized`].

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    /// Provider-assigned user id
    pub id: String,
    /// Email address, when the provider exposes it
    pub email: Option<String>,
}

/// External service that validates bearer tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the user for a valid token, or an error for an invalid/expired one.
    async fn validate_token(&self, token: &str) -> Result<UserIdentity>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let header = header.ok_or_else(|| Error::Unauthorized {
        message: "missing Authorization header".to_string(),
    })?;

    let (scheme, token) = header.trim().split_once(' ').ok_or_else(|| Error::Unauthorized {
        message: "malformed Authorization header".to_string(),
    })?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(Error::Unauthorized {
            message: "expected a bearer token".to_string(),
        });
    }
    Ok(token)
}

/// Authenticates a request from its `Authorization` header value.
pub async fn authenticate<P>(provider: &P, header: Option<&str>) -> Result<UserIdentity>
where
    P: IdentityProvider + ?Sized,
{
    let token = bearer_token(header)?;
    match provider.validate_token(token).await {
        Ok(user) => {
            info!("Authenticated user {}", user.id);
            Ok(user)
        }
        Err(e) => {
            warn!("Token rejected: {e}");
            Err(Error::Unauthorized {
                message: "could not validate credentials".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::ErrorClass;

    struct StaticProvider;

    #[async_trait]
    impl IdentityProvider for StaticProvider {
        async fn validate_token(&self, token: &str) -> Result<UserIdentity> {
            if token == "good-token" {
                Ok(UserIdentity {
                    id: "user-1".to_string(),
                    email: Some("admin@club.example".to_string()),
                })
            } else {
                Err(Error::Unauthorized {
                    message: "token expired".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(Some("bearer   abc ")).unwrap(), "abc");
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("Bearer")).is_err());
        assert!(bearer_token(Some("Bearer  ")).is_err());
        assert!(bearer_token(Some("Basic dXNlcjpwYXNz")).is_err());
    }

    #[tokio::test]
    async fn test_authenticate_valid_token() {
        let user = authenticate(&StaticProvider, Some("Bearer good-token"))
            .await
            .unwrap();
        assert_eq!(user.id, "user-1");
    }

    #[tokio::test]
    async fn test_authenticate_rejected_token_is_unauthorized() {
        let err = authenticate(&StaticProvider, Some("Bearer stale"))
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Unauthorized);

        let err = authenticate(&StaticProvider, None).await.unwrap_err();
        assert_eq!(err.class().status_code(), 401);
    }
}
