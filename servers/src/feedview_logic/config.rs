use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "server_feedview.conf";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Live table of the most recent feed records", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "FEEDVIEW_PORT", help = "Port the HTTP viewer listens on.")]
    pub port: Option<u16>,

    #[clap(long, env = "FEEDVIEW_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "FEEDVIEW_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "FEEDVIEW_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "FEEDVIEW_BROKER_URL", help = "Broker address, e.g. redis://127.0.0.1:6379.")]
    pub broker_url: Option<String>,

    #[clap(long, env = "FEEDVIEW_TOPIC", help = "Topic (channel) to subscribe to.")]
    pub topic: Option<String>,

    #[clap(long, env = "FEEDVIEW_GROUP_ID", help = "Consumer group identifier reported to the broker and in logs.")]
    pub group_id: Option<String>,

    #[clap(long, env = "FEEDVIEW_MAX_ROWS", help = "Maximum number of rows kept in the table.")]
    pub max_rows: Option<usize>,

    #[clap(long, env = "FEEDVIEW_RENDER_INTERVAL_MS", help = "Milliseconds between periodic re-renders of the table.")]
    pub render_interval_ms: Option<u64>,

    #[clap(long, env = "FEEDVIEW_OUTPUT_PATH", help = "Optional HTML file that receives every rendered page.")]
    pub output_path: Option<PathBuf>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            port: other.port.or(self.port),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            broker_url: other.broker_url.or(self.broker_url),
            topic: other.topic.or(self.topic),
            group_id: other.group_id.or(self.group_id),
            max_rows: other.max_rows.or(self.max_rows),
            render_interval_ms: other.render_interval_ms.or(self.render_interval_ms),
            output_path: other.output_path.or(self.output_path),
        }
    }

    fn defaults() -> Config {
        Config {
            port: Some(9003),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            broker_url: Some("redis://127.0.0.1:6379".to_string()),
            topic: Some("my-topic".to_string()),
            group_id: Some("my-group".to_string()),
            max_rows: Some(lib_feedview::DEFAULT_MAX_ROWS),
            render_interval_ms: Some(lib_feedview::DEFAULT_RENDER_INTERVAL.as_millis() as u64),
            ..Default::default()
        }
    }
}

/// Fully resolved settings the server runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub broker_url: String,
    pub topic: String,
    pub group_id: String,
    pub max_rows: usize,
    pub render_interval: Duration,
    pub output_path: Option<PathBuf>,
    /// The config file that was applied, if one was found.
    pub config_file: Option<PathBuf>,
}

pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Config::parse())
}

/// Layers defaults, the JSON config file and CLI/env values (in that order) and validates the result.
pub fn load_config_from(cli: Config) -> Result<Settings, ConfigError> {
    // 1. Load defaults
    let mut current_config = Config::defaults();

    // 2. Load from config file (server_feedview.conf) if present.
    //    An explicitly named file must exist; the default one is optional.
    let explicit_path = cli.config_path.is_some();
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config_file = None;
    if explicit_path || config_file_path.exists() {
        let config_str = fs::read_to_string(&config_file_path).map_err(|source| ConfigError::ReadFile {
            path: config_file_path.clone(),
            source,
        })?;
        let file_config = serde_json::from_str::<Config>(&config_str).map_err(|source| ConfigError::ParseFile {
            path: config_file_path.clone(),
            source,
        })?;
        current_config = current_config.merge(file_config);
        config_file = Some(config_file_path);
    }

    // 3. Override with environment variables and CLI arguments
    current_config = current_config.merge(cli);

    resolve(current_config, config_file)
}

fn resolve(config: Config, config_file: Option<PathBuf>) -> Result<Settings, ConfigError> {
    let max_rows = config.max_rows.unwrap_or_default();
    if max_rows == 0 {
        return Err(ConfigError::Invalid("maxRows must be at least 1".to_string()));
    }

    let render_interval_ms = config.render_interval_ms.unwrap_or_default();
    if render_interval_ms == 0 {
        return Err(ConfigError::Invalid("renderIntervalMs must be greater than 0".to_string()));
    }

    let log_level = config.log_level.unwrap_or_default().to_lowercase();
    if !LOG_LEVELS.contains(&log_level.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "unknown log level '{}', expected one of {}",
            log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let topic = config.topic.unwrap_or_default();
    if topic.trim().is_empty() {
        return Err(ConfigError::Invalid("topic must not be empty".to_string()));
    }

    Ok(Settings {
        port: config.port.unwrap_or_default(),
        log_dir: config.log_dir.unwrap_or_default(),
        log_level,
        broker_url: config.broker_url.unwrap_or_default(),
        topic,
        group_id: config.group_id.unwrap_or_default(),
        max_rows,
        render_interval: Duration::from_millis(render_interval_ms),
        output_path: config.output_path,
        config_file,
    })
}
