use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::crypto::SecretCipher;
use crate::db::Store;
use crate::services::{
    AuthService, SeaOrmAuthService, SecretService, SessionKeys, TokenService,
};

/// Process-wide dependencies, constructed once at startup and passed
/// explicitly into every component. Nothing here is read from ambient
/// global state, which keeps the services testable with fake stores and
/// fixed keys.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub sessions: Arc<SessionKeys>,

    pub auth_service: Arc<dyn AuthService>,

    pub token_service: Arc<TokenService>,

    pub secret_service: Arc<SecretService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let cipher = Arc::new(SecretCipher::from_config(&config.security.encryption_key)?);
        let sessions = Arc::new(SessionKeys::from_config(
            &config.security.session_secret,
            config.security.session_ttl_hours,
        ));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            sessions.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let token_service = Arc::new(TokenService::new(store.clone()));
        let secret_service = Arc::new(SecretService::new(store.clone(), cipher));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            sessions,
            auth_service,
            token_service,
            secret_service,
        })
    }
}
