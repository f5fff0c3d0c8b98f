use std::sync::Arc;
use std::time::Duration;

use crate::auth::services::{RateLimiter, ResetTokens};
use crate::config::{AppConfig, JwtConfig};
use crate::plaid::{PlaidApi, SandboxPlaid};
use crate::store::{FileStore, MemoryStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub plaid: Arc<dyn PlaidApi>,
    pub config: Arc<AppConfig>,
    pub limiter: Arc<RateLimiter>,
    pub reset_tokens: Arc<ResetTokens>,
}

const AUTH_MAX_ATTEMPTS: u32 = 10;
const AUTH_WINDOW: Duration = Duration::from_secs(15 * 60);

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(FileStore::new(config.data_dir.clone())) as Arc<dyn Store>;
        let plaid = Arc::new(SandboxPlaid::new()) as Arc<dyn PlaidApi>;
        Ok(Self {
            store,
            plaid,
            config,
            limiter: Arc::new(RateLimiter::new(AUTH_MAX_ATTEMPTS, AUTH_WINDOW)),
            reset_tokens: Arc::new(ResetTokens::default()),
        })
    }

    pub fn from_parts(store: Arc<dyn Store>, plaid: Arc<dyn PlaidApi>, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            plaid,
            config,
            limiter: Arc::new(RateLimiter::new(AUTH_MAX_ATTEMPTS, AUTH_WINDOW)),
            reset_tokens: Arc::new(ResetTokens::default()),
        }
    }

    /// Memory-backed state for tests: no disk, no env, sandbox bank data.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            data_dir: "unused".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            token_password: "test-token-password".into(),
        });
        Self::from_parts(
            Arc::new(MemoryStore::new()),
            Arc::new(SandboxPlaid::new()),
            config,
        )
    }
}
