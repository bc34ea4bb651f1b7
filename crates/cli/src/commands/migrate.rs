use wardrobe_core::config::{AppConfig, LoadOptions};
use wardrobe_db::{connect_with_settings, migrations};

use crate::commands::context::config_failure;
use crate::commands::CommandResult;

const COMMAND: &str = "migrate";

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return config_failure(COMMAND, &error),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let applied_before = applied_versions(&pool).await;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        let applied_after = applied_versions(&pool).await;
        pool.close().await;
        Ok::<usize, (&'static str, String, u8)>(applied_after.saturating_sub(applied_before))
    });

    match result {
        Ok(0) => CommandResult::success(COMMAND, "schema is up to date"),
        Ok(count) => {
            CommandResult::success(COMMAND, format!("applied {count} pending migration(s)"))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(COMMAND, error_class, message, exit_code)
        }
    }
}

/// Zero when the bookkeeping table does not exist yet.
async fn applied_versions(pool: &wardrobe_db::DbPool) -> usize {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .map(|count| usize::try_from(count).unwrap_or_default())
        .unwrap_or_default()
}
