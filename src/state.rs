use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use tracing::warn;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::PasswordService,
        repo::{MemoryUserStore, PgUserStore, UserStore},
        services::AuthService,
    },
    config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn UserStore> = match config.database_url.as_deref() {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgUserStore::new(db))
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new())
            }
        };

        Self::from_parts(config, store)
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let passwords = PasswordService::new(&config.auth)?;
        let keys = JwtKeys::new(&config.auth);
        let auth = Arc::new(AuthService::new(store, passwords, keys));
        Ok(Self { config, auth })
    }

    /// In-memory state with cheap hashing parameters, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::AuthConfig;
        use std::time::Duration;

        let config = Arc::new(AppConfig {
            database_url: None,
            listen_addr: ([127, 0, 0, 1], 0).into(),
            auth: AuthConfig {
                signing_secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                token_ttl: Duration::from_secs(6 * 60 * 60),
                hash_cost_factor: 1,
                hash_memory_kib: 1024,
            },
        });
        Self::from_parts(config, Arc::new(MemoryUserStore::new())).expect("fake state")
    }
}
