//! Bearer token authentication
//!
//! Tokens are RS256 JWTs issued by the identity provider. `sub` is the
//! external identity; the matching user is created on first sight.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use packing::store::EntityStore;
use packing::{Identity, Principal, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// External identity id
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
    pub user_id: UserId,
}

/// Verifies access tokens against the provider's public key
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(public_key_pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
    }
}

/// Authentication middleware
pub async fn auth_middleware<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.verify(token).map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::Unauthorized
    })?;

    let user = state
        .service
        .ensure_user(Identity {
            external_id: claims.sub,
            display_name: claims.name,
            email: claims.email,
        })
        .await
        .map_err(|e| {
            error!("Failed to resolve user from token: {}", e);
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(AuthUser {
        principal: Principal::new(user.external_id),
        user_id: user.id,
    });

    Ok(next.run(req).await)
}
