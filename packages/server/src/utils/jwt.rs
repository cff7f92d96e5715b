use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::entity::user;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    /// User ID.
    pub uid: i32,
    /// Display name, used when rendering mention tokens.
    pub name: String,
    pub dealer: bool,
    pub dealer_id: Option<i32>,
    pub department: Option<String>,
    pub admin: bool,
    /// Expiration timestamp.
    pub exp: usize,
}

/// Sign a new JWT token for a user.
pub fn sign(user: &user::Model, secret: &str, ttl_days: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(ttl_days))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user.username.clone(),
        uid: user.id,
        name: user.display_name.clone(),
        dealer: user.is_dealer,
        dealer_id: user.dealer_id,
        department: user.department.clone(),
        admin: user.is_admin,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
