//! Identity provider: signup, login and bearer token resolution

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{AdminConfig, AuthConfig},
    error::{AppError, AppResult},
    models::{
        non_blank,
        principal::Principal,
        user::{AuthResponse, LoginRequest, NewUser, Role, SignupRequest, UserClaims},
    },
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    admin: AdminConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, admin: AdminConfig) -> Self {
        Self {
            repository,
            config,
            admin,
        }
    }

    /// The reserved administrative principal
    pub fn admin_principal(&self) -> Principal {
        Principal {
            id: self.admin.id,
            name: self.admin.name.clone(),
            email: self.admin.email.clone(),
            role: Role::Admin,
        }
    }

    /// Register a new account. The role is always `user`.
    pub async fn signup(&self, request: SignupRequest) -> AppResult<AuthResponse> {
        let missing = || AppError::Validation("Please add all fields".to_string());
        let name = non_blank(request.name.clone()).ok_or_else(missing)?;
        let email = non_blank(request.email.clone()).ok_or_else(missing)?;
        let password = request.password.clone().filter(|p| !p.is_empty()).ok_or_else(missing)?;

        if self.admin.is_reserved_email(&email) {
            return Err(AppError::Authorization(
                "Admin account cannot be created through signup".to_string(),
            ));
        }

        request
            .validate()
            .map_err(|_| AppError::Validation("Invalid email format".to_string()))?;

        if self.repository.users.get_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let user = self
            .repository
            .users
            .create(&NewUser {
                name,
                email,
                password_hash: hash_password(&password)?,
                role: Role::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        let principal = Principal::from(&user);
        self.respond(principal)
    }

    /// Exchange email and password for a token
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        if self.admin.is_reserved_email(&request.email) {
            if !verify_password(&self.admin.password_hash, &request.password)? {
                return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
            return self.respond(self.admin_principal());
        }

        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&user.password_hash, &request.password)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        self.respond(Principal::from(&user))
    }

    /// Resolve a bearer token to the principal it names.
    ///
    /// The reserved id is answered from configuration; every other id must still
    /// exist in the users store, and its stored role wins over the token's.
    pub async fn resolve(&self, token: &str) -> AppResult<Principal> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret).map_err(|e| {
            let message = match e.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                _ => "Invalid token",
            };
            AppError::Authentication(message.to_string())
        })?;

        if claims.sub == self.admin.id && claims.role == Role::Admin {
            return Ok(self.admin_principal());
        }

        let user = self
            .repository
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Authentication("User not found".to_string()))?;

        Ok(Principal::from(&user))
    }

    /// Sign a token for `id` with the configured validity
    pub fn issue_token(&self, id: Uuid, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let claims = UserClaims {
            sub: id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.token_validity_days)).timestamp(),
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn respond(&self, principal: Principal) -> AppResult<AuthResponse> {
        let token = self.issue_token(principal.id, principal.role)?;
        Ok(AuthResponse {
            id: principal.id,
            name: principal.name,
            email: principal.email,
            role: principal.role,
            token,
        })
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
