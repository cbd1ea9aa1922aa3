use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        claims::Claims,
        dto::{LoginRequest, PublicUser, SignupRequest},
        jwt::JwtKeys,
        password::PasswordService,
        repo::UserStore,
        repo_types::NewUser,
        validation::{require_login, validate_signup},
    },
    error::{internal, AuthError},
};

/// Registration, login and token verification over an injected store and keys.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    passwords: PasswordService,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, passwords: PasswordService, keys: JwtKeys) -> Self {
        Self {
            store,
            passwords,
            keys,
        }
    }

    #[instrument(skip_all)]
    pub async fn register(&self, req: SignupRequest) -> Result<PublicUser, AuthError> {
        let creds = validate_signup(&req).map_err(|e| {
            warn!(reason = %e, "signup rejected");
            e
        })?;

        let existing = self
            .store
            .find_by_email(creds.email)
            .await
            .map_err(internal("find_by_email"))?;
        if existing.is_some() {
            warn!(email = %creds.email, "email already registered");
            return Err(AuthError::UserExists);
        }

        let password_hash = {
            let passwords = self.passwords.clone();
            let plain = creds.password.to_owned();
            run_blocking(move || passwords.hash_password(&plain))
                .await
                .map_err(internal("hash_password"))?
        };

        let user = self
            .store
            .create(NewUser {
                email: creds.email.to_owned(),
                password_hash,
                name: creds.name.to_owned(),
            })
            .await
            .map_err(internal("create user"))?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(PublicUser::from(user))
    }

    #[instrument(skip_all)]
    pub async fn login(&self, req: LoginRequest) -> Result<String, AuthError> {
        let (email, password) = require_login(&req)?;

        let found = self
            .store
            .find_by_email(email)
            .await
            .map_err(internal("find_by_email"))?;

        // Unknown emails still pay for one verification.
        let stored_hash = found
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.passwords.dummy_hash().to_owned());
        let matches = {
            let passwords = self.passwords.clone();
            let plain = password.to_owned();
            run_blocking(move || passwords.verify_password(&plain, &stored_hash))
                .await
                .map_err(internal("verify_password"))?
        };

        let user = match found {
            Some(user) if matches => user,
            Some(user) => {
                warn!(email = %email, user_id = %user.id, "login invalid password");
                return Err(AuthError::AuthenticationFailed);
            }
            None => {
                warn!(email = %email, "login unknown email");
                return Err(AuthError::AuthenticationFailed);
            }
        };

        let token = self.keys.sign(&user).map_err(internal("jwt sign"))?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::Unauthenticated("Invalid or expired token")
        })
    }
}

async fn run_blocking<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("blocking task failed")?
}
