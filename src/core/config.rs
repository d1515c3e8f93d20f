//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.stardust/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The API base URL has one more layer underneath the defaults: if
//! `STARDUST_API_BASE` is set when the crate is built, that value becomes the
//! compiled-in default.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StardustConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub fallback_urls: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub indexed_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub site_url: Option<String>,
    pub cookie: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub max_message_chars: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SourcesConfig {
    pub display: Option<SourceDisplay>,
    pub whitelist: Option<Vec<String>>,
    pub use_embedded_whitelist: Option<bool>,
    pub fetch_on_open: Option<bool>,
}

/// Where answer sources are shown. The two are never combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDisplay {
    /// Collected into the sources view, nothing inline.
    #[default]
    Aggregate,
    /// Badges under each answer, sources view untouched.
    Inline,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_BASE: &str = match option_env!("STARDUST_API_BASE") {
    Some(url) => url,
    None => "http://localhost:8000/api",
};
pub const DEFAULT_FALLBACK_API_BASE: &str = "http://127.0.0.1:8000/api";
/// Request length the backend accepts.
pub const SERVER_MAX_MESSAGE_CHARS: usize = 1000;
/// Client ceiling, kept under the server limit to leave room for prompt construction.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 950;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_base: String,
    pub fallback_urls: Vec<String>,
    pub timeout: Duration,
    pub indexed_only: bool,
    pub site_url: Option<String>,
    pub auth_cookie: Option<String>,
    pub max_message_chars: usize,
    pub source_display: SourceDisplay,
    pub whitelist: Vec<String>,
    pub fetch_on_open: bool,
}

impl ResolvedConfig {
    /// Primary base followed by fallbacks, in the order they are tried.
    pub fn endpoints(&self) -> Vec<String> {
        std::iter::once(self.api_base.clone())
            .chain(self.fallback_urls.iter().cloned())
            .collect()
    }
}

/// Values taken from command-line flags (None/false = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_base: Option<String>,
    pub fallback: Option<String>,
    pub site_url: Option<String>,
    pub inline_sources: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidUrl { field: &'static str, url: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::InvalidUrl { field, url } => {
                write!(f, "invalid URL for {field}: {url:?} (expected http:// or https://)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.stardust/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".stardust").join("config.toml"))
}

/// Load config from `~/.stardust/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `StardustConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<StardustConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(StardustConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(StardustConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: StardustConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Stardust Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "http://localhost:8000/api"       # Or STARDUST_API_BASE / --api-base
# fallback_urls = ["http://127.0.0.1:8000/api"] # Tried in order when the base is unreachable
# timeout_secs = 60
# indexed_only = false                         # Ask /sources for indexed URLs only

# [auth]
# site_url = "https://cosmos.example"          # Enables /.auth/* status. Or STARDUST_SITE_URL
# cookie = "StaticWebAppsAuthCookie=..."       # Or STARDUST_AUTH_COOKIE

# [chat]
# max_message_chars = 950                      # Server accepts at most 1000

# [sources]
# display = "aggregate"                        # "aggregate" (sources view) or "inline" (badges)
# use_embedded_whitelist = true
# whitelist = ["https://haydenplanetarium.org/tyson"]
# fetch_on_open = false                        # Load /sources when the view first opens
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &StardustConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an explicit environment lookup.
pub fn resolve_with_env<F>(
    config: &StardustConfig,
    cli: &CliOverrides,
    env: F,
) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // API base: CLI → env → config → compiled-in default
    let api_base = cli
        .api_base
        .clone()
        .or_else(|| env("STARDUST_API_BASE"))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    validate_url("api.base_url", &api_base)?;

    // Fallbacks: CLI → env → config (an empty list disables fallback) → default
    let fallback_urls = cli
        .fallback
        .clone()
        .or_else(|| env("STARDUST_FALLBACK_API_BASE"))
        .map(|url| vec![url])
        .or_else(|| config.api.fallback_urls.clone())
        .unwrap_or_else(|| vec![DEFAULT_FALLBACK_API_BASE.to_string()]);
    for url in &fallback_urls {
        validate_url("api.fallback_urls", url)?;
    }

    // Auth site: CLI → env → config. None disables auth.
    let site_url = cli
        .site_url
        .clone()
        .or_else(|| env("STARDUST_SITE_URL"))
        .or_else(|| config.auth.site_url.clone())
        .filter(|url| !url.trim().is_empty());
    if let Some(url) = &site_url {
        validate_url("auth.site_url", url)?;
    }

    let auth_cookie = env("STARDUST_AUTH_COOKIE").or_else(|| config.auth.cookie.clone());

    let mut max_message_chars = config
        .chat
        .max_message_chars
        .unwrap_or(DEFAULT_MAX_MESSAGE_CHARS);
    if max_message_chars == 0 || max_message_chars > SERVER_MAX_MESSAGE_CHARS {
        warn!(
            "max_message_chars={} outside 1..={}, using {}",
            max_message_chars, SERVER_MAX_MESSAGE_CHARS, DEFAULT_MAX_MESSAGE_CHARS
        );
        max_message_chars = DEFAULT_MAX_MESSAGE_CHARS;
    }

    let source_display = if cli.inline_sources {
        SourceDisplay::Inline
    } else {
        config.sources.display.unwrap_or_default()
    };

    // Whitelist: embedded list (unless disabled) followed by configured extras
    let mut whitelist: Vec<String> = Vec::new();
    if config.sources.use_embedded_whitelist.unwrap_or(true) {
        whitelist.extend(
            crate::core::sources::embedded_sources()
                .iter()
                .map(|s| s.to_string()),
        );
    }
    if let Some(extra) = &config.sources.whitelist {
        whitelist.extend(extra.iter().cloned());
    }

    Ok(ResolvedConfig {
        api_base,
        fallback_urls,
        timeout: Duration::from_secs(config.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        indexed_only: config.api.indexed_only.unwrap_or(false),
        site_url,
        auth_cookie,
        max_message_chars,
        source_display,
        whitelist,
        fetch_on_open: config.sources.fetch_on_open.unwrap_or(false),
    })
}

fn validate_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            url: url.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = StardustConfig::default();
        assert!(config.api.base_url.is_none());
        assert!(config.sources.display.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved =
            resolve_with_env(&StardustConfig::default(), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.api_base, DEFAULT_API_BASE);
        assert_eq!(resolved.fallback_urls, vec![DEFAULT_FALLBACK_API_BASE]);
        assert_eq!(resolved.max_message_chars, DEFAULT_MAX_MESSAGE_CHARS);
        assert_eq!(resolved.source_display, SourceDisplay::Aggregate);
        assert_eq!(resolved.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(resolved.site_url.is_none());
        assert!(!resolved.fetch_on_open);
        assert_eq!(resolved.whitelist.len(), crate::core::sources::embedded_sources().len());
    }

    #[test]
    fn test_ceiling_stays_below_server_limit() {
        assert!(DEFAULT_MAX_MESSAGE_CHARS < SERVER_MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_env_wins_over_config() {
        let config = StardustConfig {
            api: ApiConfig {
                base_url: Some("https://from-config.example/api".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| {
            (key == "STARDUST_API_BASE").then(|| "https://from-env.example/api".to_string())
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env).unwrap();
        assert_eq!(resolved.api_base, "https://from-env.example/api");
    }

    #[test]
    fn test_cli_wins_over_env() {
        let cli = CliOverrides {
            api_base: Some("https://from-cli.example/api".to_string()),
            fallback: Some("https://backup-cli.example/api".to_string()),
            inline_sources: true,
            ..Default::default()
        };
        let env = |_: &str| Some("https://from-env.example/api".to_string());
        let resolved = resolve_with_env(&StardustConfig::default(), &cli, env).unwrap();
        assert_eq!(resolved.api_base, "https://from-cli.example/api");
        assert_eq!(resolved.fallback_urls, vec!["https://backup-cli.example/api"]);
        assert_eq!(resolved.source_display, SourceDisplay::Inline);
    }

    #[test]
    fn test_cli_fallback_replaces_configured_list() {
        let config = StardustConfig {
            api: ApiConfig {
                fallback_urls: Some(vec![
                    "https://backup-a.example/api".to_string(),
                    "https://backup-b.example/api".to_string(),
                ]),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            fallback: Some("https://backup-cli.example/api".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &cli, no_env).unwrap();
        assert_eq!(resolved.fallback_urls, vec!["https://backup-cli.example/api"]);
    }

    #[test]
    fn test_empty_fallback_list_disables_fallback() {
        let config = StardustConfig {
            api: ApiConfig {
                fallback_urls: Some(vec![]),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env).unwrap();
        assert!(resolved.fallback_urls.is_empty());
        assert_eq!(resolved.endpoints(), vec![DEFAULT_API_BASE.to_string()]);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let cli = CliOverrides {
            api_base: Some("ftp://nope".to_string()),
            ..Default::default()
        };
        let err = resolve_with_env(&StardustConfig::default(), &cli, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "api.base_url", .. }));
    }

    #[test]
    fn test_out_of_range_ceiling_falls_back_to_default() {
        let config = StardustConfig {
            chat: ChatConfig {
                max_message_chars: Some(5000),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.max_message_chars, DEFAULT_MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_whitelist_without_embedded_list() {
        let config = StardustConfig {
            sources: SourcesConfig {
                use_embedded_whitelist: Some(false),
                whitelist: Some(vec!["https://a.example".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.whitelist, vec!["https://a.example"]);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[api]
base_url = "https://rag.example/api"
fallback_urls = ["https://rag-backup.example/api"]
timeout_secs = 15
indexed_only = true

[auth]
site_url = "https://cosmos.example"

[chat]
max_message_chars = 800

[sources]
display = "inline"
fetch_on_open = true
"#;
        let config: StardustConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("https://rag.example/api"));
        assert_eq!(config.api.timeout_secs, Some(15));
        assert_eq!(config.sources.display, Some(SourceDisplay::Inline));

        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.max_message_chars, 800);
        assert!(resolved.indexed_only);
        assert!(resolved.fetch_on_open);
        assert_eq!(resolved.site_url.as_deref(), Some("https://cosmos.example"));
        assert_eq!(
            resolved.endpoints(),
            vec!["https://rag.example/api", "https://rag-backup.example/api"]
        );
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[chat]
max_message_chars = 500
"#;
        let config: StardustConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.max_message_chars, Some(500));
        assert!(config.api.base_url.is_none());
        assert!(config.sources.whitelist.is_none());
    }
}
