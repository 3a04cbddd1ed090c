use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, token_ttl_hours: 12 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { first_name: "Test".into(), last_name: "User".into(), email: "user@example.com".into(), password: "secret1".into(), phone: None };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 6 {
            return Err(AuthError::Validation("password too short (>=6)".into()));
        }
        models::user::validate_name(&input.first_name)
            .and_then(|_| models::user::validate_name(&input.last_name))
            .and_then(|_| models::user::validate_email(&input.email))
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(&input.first_name, &input.last_name, &input.email, &hash, input.phone.clone())
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and optionally issue a token.
    ///
    /// A missing user and a wrong password both map to `Unauthorized` so the
    /// response never reveals which part of the credentials failed.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), token_ttl_hours: 12 });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { first_name: "N".into(), last_name: "S".into(), email: "u@e.com".into(), password: "passw0rd".into(), phone: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let stored = self
            .repo
            .get_password_hash(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&stored).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            token = Some(issue_token(&user, secret, self.cfg.token_ttl_hours)?);
        }

        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }
}

/// Issue an HS256 token carrying the user's id, email and role.
pub fn issue_token(user: &AuthUser, secret: &str, ttl_hours: i64) -> Result<String, AuthError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user.email.clone(),
        uid: user.id.to_string(),
        role: user.role.clone(),
        exp: (now + chrono::Duration::hours(ttl_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Decode and validate a token issued by [`issue_token`].
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc(secret: Option<&str>) -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: secret.map(|s| s.to_string()), token_ttl_hours: 12 },
        )
    }

    fn register_input(email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: password.into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let svc = svc(None);
        let err = svc.register(register_input("a@b.com", "short")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let svc = svc(None);
        svc.register(register_input("dup@b.com", "secret1")).await.unwrap();
        let err = svc.register(register_input("dup@b.com", "secret2")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn login_does_not_reveal_which_credential_failed() {
        let svc = svc(Some("secret"));
        svc.register(register_input("known@b.com", "secret1")).await.unwrap();

        let missing = svc
            .login(LoginInput { email: "unknown@b.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();
        let wrong = svc
            .login(LoginInput { email: "known@b.com".into(), password: "wrongpw".into() })
            .await
            .unwrap_err();
        assert_eq!(missing.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn token_round_trip_carries_role() {
        let svc = svc(Some("secret"));
        let user = svc.register(register_input("token@b.com", "secret1")).await.unwrap();
        let session = svc
            .login(LoginInput { email: "token@b.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        let claims = decode_claims(&session.token.unwrap(), "secret").unwrap();
        assert_eq!(claims.sub, "token@b.com");
        assert_eq!(claims.user_id(), Some(user.id));
        assert_eq!(claims.role, models::user::ROLE_USER);
        assert!(!claims.is_admin());
    }

    #[tokio::test]
    async fn decode_rejects_wrong_secret() {
        let svc = svc(Some("secret"));
        svc.register(register_input("ws@b.com", "secret1")).await.unwrap();
        let session = svc
            .login(LoginInput { email: "ws@b.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        assert!(decode_claims(&session.token.unwrap(), "other").is_err());
    }
}
