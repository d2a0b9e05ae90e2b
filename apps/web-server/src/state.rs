//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{
    GroupRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use yatube_infra::database::DatabaseConnections;
use yatube_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;
use crate::templating::Templates;

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub templates: Arc<Templates>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub secure_cookies: bool,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let templates = Arc::new(Templates::load(config.template_dir.as_deref())?);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                let connections = DatabaseConnections::init(db_config).await?;

                if config.run_migrations {
                    use migration::MigratorTrait;
                    tracing::info!("Applying pending migrations");
                    migration::Migrator::up(&connections.main, None).await?;
                }

                let conn = Arc::new(connections);
                tracing::info!("Application state initialized (postgres)");
                return Ok(Self {
                    users: Arc::new(PostgresUserRepository::new(conn.main.clone())),
                    groups: Arc::new(PostgresGroupRepository::new(conn.main.clone())),
                    posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
                    tokens,
                    passwords,
                    templates,
                    db: Some(conn),
                    secure_cookies: config.secure_cookies,
                });
            }
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }

        let store = Arc::new(InMemoryStore::new());
        let mut state = Self::in_memory(store, tokens, passwords, templates);
        state.secure_cookies = config.secure_cookies;
        tracing::info!("Application state initialized (in-memory)");
        Ok(state)
    }

    /// State backed by a single in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        templates: Arc<Templates>,
    ) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store,
            tokens,
            passwords,
            templates,
            db: None,
            secure_cookies: false,
        }
    }

    pub fn storage_name(&self) -> &'static str {
        if self.db.is_some() {
            "postgres"
        } else {
            "in-memory"
        }
    }
}
