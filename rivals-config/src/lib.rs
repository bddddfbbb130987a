//! Workspace configuration: YAML file + `RIVALS__*` environment overlays.
//!
//! Precedence, lowest first: serde defaults, YAML sources in the order they
//! were added, then environment variables (`RIVALS__SERVER__BIND=...`).
//! String values are expanded for `${VAR}` references after merging, so a
//! file can say `api_key: "${EXA_API_KEY}"` without committing the secret.
use config::{Config, Environment, File, FileFormat};
use rivals_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// File looked up by the binaries when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rivals.yaml";
/// Process-wide fallback for the provider credential.
pub const EXA_API_KEY_ENV: &str = "EXA_API_KEY";
pub const DEFAULT_EXA_BASE_URL: &str = "https://api.exa.ai";
pub const DEFAULT_MENTION_DOMAIN: &str = "reddit.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("provider API key missing: set provider.api_key or EXA_API_KEY")]
    MissingApiKey,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RivalsConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub mentions: MentionsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Upper bound on handling time for a single request.
    pub request_timeout_secs: u64,
    /// CORS allow-list; empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".into(),
            request_timeout_secs: 60,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXA_BASE_URL.into(),
            api_key: None,
            timeout_secs: 30,
            max_retries: 0,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured key, or `EXA_API_KEY` when the config leaves it unset
    /// (or unresolved, e.g. a literal `${EXA_API_KEY}` that expansion could
    /// not fill).
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let configured = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.contains("${"));
        if let Some(key) = configured {
            return Ok(key.to_string());
        }
        std::env::var(EXA_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MentionsConfig {
    /// The single content domain mention searches are restricted to.
    pub domain: String,
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_MENTION_DOMAIN.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub default_filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            default_filter: "info".into(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.default_filter.clone(),
            ..LogConfig::default()
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring.
pub struct RivalsConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for RivalsConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RivalsConfigLoader {
    /// Start from defaults; `RIVALS__`-prefixed environment variables are
    /// layered on top of every file source.
    ///
    /// ```
    /// use rivals_config::RivalsConfigLoader;
    ///
    /// let config = RivalsConfigLoader::new()
    ///     .with_yaml_str("server:\n  bind: '127.0.0.1:8080'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.bind, "127.0.0.1:8080");
    /// assert_eq!(config.server.request_timeout_secs, 60);
    /// assert_eq!(config.mentions.domain, "reddit.com");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, for environment-only deployments.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and materialise
    /// [`RivalsConfig`].
    ///
    /// ```
    /// use rivals_config::RivalsConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_EXA_KEY", "from-env"); }
    ///
    /// let config = RivalsConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// provider:
    ///   api_key: "${DOCTEST_EXA_KEY}"
    ///   max_retries: 1
    /// "#)
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.provider.resolve_api_key().unwrap(), "from-env");
    /// assert_eq!(config.provider.max_retries, 1);
    /// assert_eq!(config.provider.base_url, "https://api.exa.ai");
    ///
    /// unsafe { std::env::remove_var("DOCTEST_EXA_KEY"); }
    /// ```
    pub fn load(self) -> Result<RivalsConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("RIVALS")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: RivalsConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}

impl RivalsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be positive".into(),
            ));
        }
        if self.mentions.domain.trim().is_empty() {
            return Err(ConfigError::Invalid("mentions.domain must not be empty".into()));
        }
        Ok(())
    }
}
