//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use roster_core::EmployeeService;
use roster_core::ports::EmployeeRepository;
use roster_infra::InMemoryEmployeeRepository;

#[cfg(feature = "postgres")]
use roster_infra::{DatabaseConnections, PostgresEmployeeRepository};

use crate::config::AppConfig;

/// Which repository backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    InMemory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::InMemory => "in-memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<EmployeeService>,
    pub storage: Storage,
    pub request_timeout: Duration,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let connected: Option<Self> = match &config.database {
            Some(db_config) => match Self::connect(db_config).await {
                Ok((connections, repo)) => {
                    let mut state =
                        Self::with_repository(repo, Storage::Postgres, config.request_timeout);
                    state.db = Some(Arc::new(connections));
                    Some(state)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to initialize database: {}. Using in-memory fallback.",
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                None
            }
        };

        #[cfg(not(feature = "postgres"))]
        let connected: Option<Self> = {
            tracing::info!("Running without postgres feature - using in-memory repository");
            None
        };

        let state = connected.unwrap_or_else(|| Self::in_memory(config.request_timeout));
        tracing::info!(storage = state.storage.as_str(), "Application state initialized");
        state
    }

    /// State backed by a fresh in-memory repository.
    pub fn in_memory(request_timeout: Duration) -> Self {
        Self::with_repository(
            Arc::new(InMemoryEmployeeRepository::new()),
            Storage::InMemory,
            request_timeout,
        )
    }

    fn with_repository(
        repo: Arc<dyn EmployeeRepository>,
        storage: Storage,
        request_timeout: Duration,
    ) -> Self {
        Self {
            employees: Arc::new(EmployeeService::new(repo)),
            storage,
            request_timeout,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Release storage resources once the server has stopped.
    #[cfg(feature = "postgres")]
    pub async fn close(&self) {
        if let Some(db) = &self.db {
            match db.close().await {
                Ok(()) => tracing::info!("Database pool closed"),
                Err(e) => tracing::warn!("Failed to close database pool: {}", e),
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    pub async fn close(&self) {}

    #[cfg(feature = "postgres")]
    async fn connect(
        config: &roster_infra::DatabaseConfig,
    ) -> Result<(DatabaseConnections, Arc<dyn EmployeeRepository>), String> {
        let connections = DatabaseConnections::init(config)
            .await
            .map_err(|e| e.to_string())?;
        let repo = PostgresEmployeeRepository::new(Arc::clone(&connections.main));
        repo.ensure_schema().await.map_err(|e| e.to_string())?;
        Ok((connections, Arc::new(repo)))
    }
}
