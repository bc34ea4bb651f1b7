use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use wardrobe_core::config::{AppConfig, LoadOptions};

/// Renders the effective configuration, one line per key, with where each value came from.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let root_dir = config.storage.root_dir.display().to_string();
    let entries: Vec<(&str, String, String)> = vec![
        (
            "database.url",
            config.database.url.clone(),
            source("database.url", &["WARDROBE_DATABASE_URL"]),
        ),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            source("database.max_connections", &["WARDROBE_DATABASE_MAX_CONNECTIONS"]),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            source("database.timeout_secs", &["WARDROBE_DATABASE_TIMEOUT_SECS"]),
        ),
        ("storage.root_dir", root_dir, source("storage.root_dir", &["WARDROBE_STORAGE_ROOT_DIR"])),
        (
            "storage.public_base_url",
            config.storage.public_base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            source("storage.public_base_url", &["WARDROBE_STORAGE_PUBLIC_BASE_URL"]),
        ),
        (
            "storage.key_prefix",
            config.storage.key_prefix.clone(),
            source("storage.key_prefix", &["WARDROBE_STORAGE_KEY_PREFIX"]),
        ),
        (
            "compression.max_size_mb",
            config.compression.max_size_mb.to_string(),
            source("compression.max_size_mb", &["WARDROBE_COMPRESSION_MAX_SIZE_MB"]),
        ),
        (
            "compression.max_dimension",
            config.compression.max_dimension.to_string(),
            source("compression.max_dimension", &["WARDROBE_COMPRESSION_MAX_DIMENSION"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["WARDROBE_LOGGING_LEVEL", "WARDROBE_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            source("logging.format", &["WARDROBE_LOGGING_FORMAT", "WARDROBE_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.into_iter().map(|(key, value, source)| render_line(key, &value, source)));
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("wardrobe.toml"), PathBuf::from("config/wardrobe.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, field_source};

    #[test]
    fn nested_keys_are_found_in_the_file_document() {
        let doc: toml::Value =
            "[storage]\nroot_dir = \"/srv/blobs\"\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "storage.root_dir"));
        assert!(!contains_path(&doc, "storage.key_prefix"));
        assert!(!contains_path(&doc, "database.url"));
    }

    #[test]
    fn values_missing_everywhere_are_defaults() {
        let source =
            field_source("compression.max_dimension", &["WARDROBE_TEST_UNSET_KEY"], None, None);
        assert_eq!(source, "default");
    }
}
