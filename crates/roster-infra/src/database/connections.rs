use std::time::Duration;

#[cfg(feature = "postgres")]
use std::sync::Arc;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the employee database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

/// Connection pool shared by every request.
///
/// The pool is safe for concurrent use; repositories clone the handle.
#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    pub main: Arc<DbConn>,
}

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Open the pool and verify the server answers.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection pool...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let main = Database::connect(opts).await?;
        main.ping().await?;
        tracing::info!(
            "Database connected (pool: {}..{})",
            config.min_connections,
            config.max_connections
        );

        Ok(Self {
            main: Arc::new(main),
        })
    }

    /// Close the pool, waiting for checked-out connections.
    ///
    /// Repositories sharing the handle see every later call fail.
    pub async fn close(&self) -> Result<(), DbErr> {
        self.main.close_by_ref().await
    }
}
