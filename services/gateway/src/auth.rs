use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{Algorithm, Validation, decode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use types::ids::Identity;
use types::numeric::{Amount, is_valid_amount};

/// Header carrying the value attached to a call
pub const PAYMENT_HEADER: &str = "x-payment";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity, `0x`-prefixed hex
    pub sub: String,
    pub exp: usize,
}

/// Caller identity proven by an HS256 bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub identity: Identity,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| AppError::Unauthenticated("Missing authentication credentials".into()))?;
        let auth_str = header
            .to_str()
            .map_err(|_| AppError::Unauthenticated("Invalid header string".into()))?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthenticated("Expected a bearer token".into()))?;

        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &state.decoding_key, &validation)
            .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))?;

        let identity: Identity = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::Unauthenticated("Token subject is not an identity".into()))?;
        if identity.is_empty() {
            return Err(AppError::Unauthenticated("Token subject is the empty identity".into()));
        }

        Ok(AuthenticatedUser { identity })
    }
}

/// Value attached to a call, zero when the header is absent
#[derive(Debug, Clone, Copy)]
pub struct Payment(pub Amount);

impl<S> FromRequestParts<S> for Payment
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(PAYMENT_HEADER) else {
            return Ok(Payment(Decimal::ZERO));
        };
        let raw = header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid payment header".into()))?;
        let amount = Decimal::from_str(raw.trim())
            .map_err(|_| AppError::BadRequest(format!("Payment is not a decimal: {}", raw)))?;
        if !is_valid_amount(amount) {
            return Err(AppError::BadRequest(format!("Payment must not be negative: {}", raw)));
        }
        Ok(Payment(amount))
    }
}
