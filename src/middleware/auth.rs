use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::AppError,
    models::{ROLE_ADMIN, ROLE_STAFF},
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Kitchen staff and administrators both run the order board.
    pub fn is_staff(&self) -> bool {
        self.role == ROLE_STAFF || self.is_admin()
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_ADMIN)
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email,
        role: decoded.claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        decode_token(token, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(secret: &str, role: &str, exp_offset: Duration) -> String {
        let claims = Claims {
            sub: Uuid::nil().to_string(),
            email: "cook@example.com".into(),
            role: role.into(),
            exp: (Utc::now() + exp_offset).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn decodes_valid_token() {
        let user = decode_token(&token("s3cret", "staff", Duration::hours(1)), "s3cret").unwrap();
        assert_eq!(user.user_id, Uuid::nil());
        assert!(user.is_staff());
        assert!(!user.is_admin());
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        assert!(matches!(
            decode_token(&token("s3cret", "user", Duration::hours(1)), "other"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            decode_token(&token("s3cret", "user", Duration::hours(-2)), "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn role_guards() {
        let user = AuthUser {
            user_id: Uuid::nil(),
            email: "a@example.com".into(),
            role: "user".into(),
        };
        assert!(matches!(ensure_staff(&user), Err(AppError::Forbidden)));
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
        let admin = AuthUser {
            role: "admin".into(),
            ..user
        };
        assert!(ensure_staff(&admin).is_ok());
        assert!(ensure_admin(&admin).is_ok());
    }
}
