//! Account registration, login and bearer tokens.
//!
//! Passwords are hashed with bcrypt on the blocking pool. Tokens are HS256
//! JWTs carrying the user id and role; verification is stateless, so a
//! token stays valid until it expires.

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{NewUser, Role, User, UserId, UserUpdate};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use storage::Storage;
use tokio::sync::OnceCell;

use crate::error::{DomainError, Result};
use crate::validation::{MIN_PASSWORD_LENGTH, ValidationErrors, normalize_email};

/// Settings for hashing and token issuance.
#[derive(Debug)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl: Duration::days(7),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Changes a user may make to their own account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Clone)]
pub struct AuthService<S> {
    store: S,
    keys: Arc<Keys>,
    token_ttl: Duration,
    bcrypt_cost: u32,
    /// Hash checked against when the email is unknown, so that login takes
    /// the same bcrypt time either way.
    decoy_hash: Arc<OnceCell<String>>,
}

impl<S: Storage> AuthService<S> {
    pub fn new(store: S, config: AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        Self {
            store,
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            token_ttl: config.token_ttl,
            bcrypt_cost: config.bcrypt_cost,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Creates a `user` account and signs it in.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession> {
        let email = normalize_email(&request.email);
        let name = request.name.trim().to_string();

        let mut errors = ValidationErrors::new();
        errors.require_email("email", &email);
        errors.require_text("name", &name);
        check_password(&mut errors, &request.password);
        errors.finish()?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(email_taken());
        }

        let password_hash = self.hash_password(request.password).await?;
        let record = self
            .store
            .create_user(NewUser {
                email,
                name,
                role: Role::User,
                password_hash,
            })
            .await?;
        tracing::info!(user_id = %record.user.id, "user registered");

        self.session(record.user)
    }

    /// Signs in with email and password.
    ///
    /// Unknown email and wrong password fail with the same error.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        let email = normalize_email(&request.email);

        let Some(record) = self.store.find_user_by_email(&email).await? else {
            self.verify_against_decoy(request.password).await?;
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            return Err(DomainError::InvalidCredentials);
        };

        if !self
            .verify_password(request.password, record.password_hash)
            .await?
        {
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            return Err(DomainError::InvalidCredentials);
        }

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        tracing::info!(user_id = %record.user.id, "user logged in");
        self.session(record.user)
    }

    /// Issues a new token for an already authenticated user.
    pub fn refresh(&self, user: User) -> Result<AuthSession> {
        self.session(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn profile(&self, user_id: UserId) -> Result<User> {
        self.store
            .get_user(user_id)
            .await?
            .map(|record| record.user)
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<User> {
        let name = update.name.map(|n| n.trim().to_string());
        let email = update.email.as_deref().map(normalize_email);

        let mut errors = ValidationErrors::new();
        if let Some(name) = &name {
            errors.require_text("name", name);
        }
        if let Some(email) = &email {
            errors.require_email("email", email);
        }
        if let Some(password) = &update.password {
            check_password(&mut errors, password);
        }
        errors.finish()?;

        if let Some(email) = &email
            && let Some(existing) = self.store.find_user_by_email(email).await?
            && existing.user.id != user_id
        {
            return Err(email_taken());
        }

        let password_hash = match update.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let record = self
            .store
            .update_user(
                user_id,
                UserUpdate {
                    name,
                    email,
                    role: None,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        Ok(record.user)
    }

    /// Signs a token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys.encoding,
        )?)
    }

    /// Checks signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        jsonwebtoken::decode::<Claims>(
            token,
            &self.keys.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            DomainError::Unauthorized("Invalid or expired token".to_string())
        })
    }

    /// Resolves a bearer token to the current state of its user.
    ///
    /// The user is reloaded so that role changes and deletions take effect
    /// before the token expires.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verify_token(token)?;
        self.store
            .get_user(claims.sub)
            .await?
            .map(|record| record.user)
            .ok_or_else(|| DomainError::Unauthorized("User no longer exists".to_string()))
    }

    fn session(&self, user: User) -> Result<AuthSession> {
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    async fn verify_against_decoy(&self, password: String) -> Result<()> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| self.hash_password(uuid::Uuid::new_v4().to_string()))
            .await?;
        self.verify_password(password, hash.clone()).await?;
        Ok(())
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool> {
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is unreadable");
                Ok(false)
            }
        }
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
    }
}

fn email_taken() -> DomainError {
    DomainError::Conflict("User already exists with this email".to_string())
}
