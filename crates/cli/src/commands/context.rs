//! Shared bootstrap for commands that operate on the wardrobe.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use wardrobe_core::config::{AppConfig, ConfigError, LoadOptions};
use wardrobe_core::errors::{ApplicationError, InterfaceError};
use wardrobe_core::filter::ItemFilter;
use wardrobe_core::lifecycle::ItemLifecycle;
use wardrobe_core::view::WardrobeView;
use wardrobe_db::{connect_with_settings, migrations, DbPool, SqlItemStore};
use wardrobe_storage::{FsBlobStore, JpegCompressor};

use crate::commands::CommandResult;

pub struct Wardrobe {
    pub config: AppConfig,
    pub pool: DbPool,
    pub lifecycle: ItemLifecycle,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to connect to database: {0}")]
    Database(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

impl BootstrapError {
    fn error_class(&self) -> &'static str {
        match self {
            Self::Database(_) => "db_connectivity",
            Self::Migration(_) => "migration",
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Database(_) => 4,
            Self::Migration(_) => 5,
        }
    }
}

impl Wardrobe {
    /// Builds a view for `filter` and loads it from the item store.
    pub async fn load_view(
        &self,
        command: &str,
        filter: ItemFilter,
    ) -> Result<WardrobeView, CommandResult> {
        let mut view = WardrobeView::new(filter);
        self.lifecycle
            .reload(&mut view)
            .await
            .map_err(|error| CommandResult::from_lifecycle(command, error))?;
        Ok(view)
    }
}

pub async fn bootstrap(config: AppConfig) -> Result<Wardrobe, BootstrapError> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::Database)?;

    migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "wardrobe.bootstrap.migrations_applied",
        database_url = %config.database.url,
        "database migrations applied"
    );

    let blobs = FsBlobStore::new(config.storage.root_dir.clone())
        .with_public_base_url(config.storage.public_base_url.clone());
    let lifecycle = ItemLifecycle::new(
        Arc::new(SqlItemStore::new(pool.clone())),
        Arc::new(blobs),
        Arc::new(JpegCompressor::new()),
    )
    .with_compression(config.compression_options())
    .with_key_prefix(config.storage.key_prefix.clone());

    Ok(Wardrobe { config, pool, lifecycle })
}

/// Loads config, starts a current-thread runtime, bootstraps the wardrobe and runs
/// `action` against it. Every failure before `action` becomes a structured result.
pub fn with_wardrobe<F, Fut>(command: &str, action: F) -> CommandResult
where
    F: FnOnce(Wardrobe) -> Fut,
    Fut: Future<Output = CommandResult>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return config_failure(command, &error),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    runtime.block_on(async {
        let wardrobe = match bootstrap(config).await {
            Ok(wardrobe) => wardrobe,
            Err(error) => {
                return CommandResult::failure(
                    command,
                    error.error_class(),
                    error.to_string(),
                    error.exit_code(),
                );
            }
        };

        let pool = wardrobe.pool.clone();
        let result = action(wardrobe).await;
        pool.close().await;
        result
    })
}

pub fn config_failure(command: &str, error: &ConfigError) -> CommandResult {
    CommandResult::failure(
        command,
        "config_validation",
        format!("configuration issue: {error}"),
        2,
    )
}

/// Parses the `--type`/`--occasion` selectors, reporting unknown labels as bad requests.
pub fn parse_filter(
    command: &str,
    type_label: Option<&str>,
    occasion_label: Option<&str>,
) -> Result<ItemFilter, CommandResult> {
    ItemFilter::from_labels(type_label, occasion_label).map_err(|error| {
        CommandResult::from_interface(command, &InterfaceError::from(ApplicationError::from(error)))
    })
}
