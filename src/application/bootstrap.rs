//! Composition root.
//!
//! Turns an [`AppConfig`] into wired services: a card repository, a quota
//! store, and a randomness source. Postgres backs cards whenever a database
//! is configured; quota storage follows `quota.backend`.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::adapters::memory::{InMemoryCardRepository, InMemoryQuotaStore};
use crate::adapters::postgres::{PostgresCardRepository, PostgresQuotaStore};
use crate::adapters::redis::RedisQuotaStore;
use crate::adapters::rng::{EntropyRngSource, SeededRngSource};
use crate::config::{AppConfig, DatabaseConfig, QuotaBackend, RedisConfig, ValidationError};
use crate::ports::{CardRepository, QuotaStore, RngSource};

use super::card_engine::CardEngine;
use super::handlers::quota::{ConsumeQuotaHandler, GetQuotaHandler, MeteredGeneration, RefundQuotaHandler};

/// Startup failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Failed to connect to Postgres: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to apply migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to connect to Redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis connection timed out after {0}s")]
    RedisTimeout(u64),
}

/// Fully wired application services.
pub struct Services {
    pub cards: CardEngine,
    pub consume_quota: ConsumeQuotaHandler,
    pub refund_quota: RefundQuotaHandler,
    pub get_quota: GetQuotaHandler,
    pub metered: MeteredGeneration,
}

impl Services {
    /// Validates `config`, connects to the configured backends and wires
    /// every handler.
    pub async fn build(config: &AppConfig) -> Result<Self, BootstrapError> {
        config.validate()?;

        let pool = match &config.database {
            Some(db) => Some(connect_postgres(db).await?),
            None => None,
        };

        let card_repository: Arc<dyn CardRepository> = match &pool {
            Some(pool) => Arc::new(PostgresCardRepository::new(pool.clone())),
            None => Arc::new(InMemoryCardRepository::new()),
        };

        let quota_store: Arc<dyn QuotaStore> = match config.quota.backend {
            QuotaBackend::Memory => Arc::new(InMemoryQuotaStore::new()),
            QuotaBackend::Postgres => match &pool {
                Some(pool) => Arc::new(PostgresQuotaStore::new(pool.clone())),
                None => return Err(ValidationError::BackendNotConfigured("postgres").into()),
            },
            QuotaBackend::Redis => match &config.redis {
                Some(redis) => Arc::new(connect_redis(redis).await?),
                None => return Err(ValidationError::BackendNotConfigured("redis").into()),
            },
        };

        let rng_source: Arc<dyn RngSource> = match config.engine.shuffle_seed {
            Some(seed) => Arc::new(SeededRngSource::new(seed)),
            None => Arc::new(EntropyRngSource::new()),
        };

        info!(
            cards = if pool.is_some() { "postgres" } else { "memory" },
            quota = ?config.quota.backend,
            free_generations = config.quota.free_generations,
            seeded_shuffle = config.engine.shuffle_seed.is_some(),
            "Services wired"
        );

        Ok(Self::wire(card_repository, quota_store, rng_source, config))
    }

    /// Wires handlers around already-constructed adapters.
    pub fn wire(
        card_repository: Arc<dyn CardRepository>,
        quota_store: Arc<dyn QuotaStore>,
        rng_source: Arc<dyn RngSource>,
        config: &AppConfig,
    ) -> Self {
        let ceiling = config.quota.free_generations;
        Self {
            cards: CardEngine::new(card_repository, rng_source, &config.engine),
            consume_quota: ConsumeQuotaHandler::new(quota_store.clone(), ceiling),
            refund_quota: RefundQuotaHandler::new(quota_store.clone()),
            get_quota: GetQuotaHandler::new(quota_store.clone(), ceiling),
            metered: MeteredGeneration::new(quota_store, ceiling),
        }
    }
}

async fn connect_postgres(config: &DatabaseConfig) -> Result<PgPool, BootstrapError> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    info!(
        min = config.min_connections,
        max = config.max_connections,
        "Postgres pool connected"
    );
    Ok(pool)
}

async fn connect_redis(config: &RedisConfig) -> Result<RedisQuotaStore, BootstrapError> {
    let client = redis::Client::open(config.url.as_str())?;
    let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| BootstrapError::RedisTimeout(config.timeout_secs))??;

    info!("Redis connected");
    Ok(RedisQuotaStore::new(conn))
}
