//! JWT authentication middleware.
//!
//! Tokens are issued by the identity provider; this module only verifies them.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::web::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Expiration timestamp.
    pub exp: u64,
    /// Issued at timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// Application state for JWT authentication.
#[derive(Clone)]
pub struct JwtState {
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;
        // Provider tokens carry an audience we do not pin
        validation.validate_aud = false;

        Self {
            decoding_key,
            validation,
        }
    }
}

/// Extractor for authenticated users.
///
/// Rejects with 401 "No token provided" when the bearer token is absent and
/// 401 "Invalid token" when it fails verification or names no user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

impl AuthUser {
    /// The authenticated user's ID.
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

        // Set by the jwt_auth middleware
        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        let token_data = decode::<JwtClaims>(token, &jwt_state.decoding_key, &jwt_state.validation)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                ApiError::unauthorized("Invalid token")
            })?;

        if token_data.claims.sub.is_empty() {
            return Err(ApiError::unauthorized("Invalid token"));
        }

        Ok(AuthUser(token_data.claims))
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: sub.to_string(),
            exp: (now + exp_offset) as u64,
            iat: Some(now as u64),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn parts_with(auth: Option<String>, state: Option<Arc<JwtState>>) -> Parts {
        let mut builder = Request::builder().uri("/api/subscriptions");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        if let Some(state) = state {
            parts.extensions.insert(state);
        }
        parts
    }

    #[tokio::test]
    async fn test_valid_token() {
        let state = Arc::new(JwtState::new("secret"));
        let mut parts = parts_with(
            Some(format!("Bearer {}", token("secret", "user-1", 3600))),
            Some(state),
        );

        let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id(), "user-1");
    }

    #[tokio::test]
    async fn test_missing_token() {
        let mut parts = parts_with(None, Some(Arc::new(JwtState::new("secret"))));
        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: No token provided");
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let mut parts = parts_with(
            Some(format!("Bearer {}", token("other", "user-1", 3600))),
            Some(Arc::new(JwtState::new("secret"))),
        );
        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let mut parts = parts_with(
            Some(format!("Bearer {}", token("secret", "user-1", -3600))),
            Some(Arc::new(JwtState::new("secret"))),
        );
        assert!(AuthUser::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_subject_rejected() {
        let mut parts = parts_with(
            Some(format!("Bearer {}", token("secret", "", 3600))),
            Some(Arc::new(JwtState::new("secret"))),
        );
        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");
    }
}
