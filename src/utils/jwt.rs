use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
    errors::ErrorKind,
};

use crate::{
    consts::auth_const::JWT_ISSUER,
    errors::{Error, Result},
    models::role::Role,
};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

impl Claims {
    pub fn new(user_id: i64, role: Role, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role,
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
            iss: JWT_ISSUER.to_string(),
        }
    }
}

pub fn encode_jwt(claim: &Claims, secret: &str) -> Result<String> {
    let token = encode(
        &Header::default(),
        claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.set_issuer(&[JWT_ISSUER]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation).map_err(
        |e| match e.kind() {
            ErrorKind::ExpiredSignature => Error::TokenExpired,
            _ => {
                tracing::warn!("Rejected token: {e}");
                Error::InvalidToken
            }
        },
    )
}
