use std::path::{Path, PathBuf};

use {secrecy::Secret, tracing::debug};

use crate::{
    credentials::ResolvedConfig, env_subst::substitute_env, error::ConfigError,
    schema::StewardConfig,
};

/// Environment variable names.
pub mod vars {
    pub const APLOS_CLIENT_ID: &str = "APLOS_CLIENT_ID";
    /// Older deployments used this name for the client id.
    pub const APLOS_ID: &str = "APLOS_ID";
    pub const APLOS_SECRET: &str = "APLOS_SECRET";
    pub const APLOS_PRIVATE_KEY: &str = "APLOS_PRIVATE_KEY";
    pub const APLOS_TOKEN_URL: &str = "APLOS_TOKEN_URL";
    pub const APLOS_BASE_URL: &str = "APLOS_BASE_URL";
    pub const APLOS_FETCH_ACCOUNTS: &str = "APLOS_FETCH_ACCOUNTS";
    pub const VIRTUOUS_USERNAME: &str = "VIRTUOUS_USERNAME";
    pub const VIRTUOUS_PASSWORD: &str = "VIRTUOUS_PASSWORD";
    pub const VIRTUOUS_TOKEN_URL: &str = "VIRTUOUS_TOKEN_URL";
    pub const HTTP_TIMEOUT_SECS: &str = "STEWARD_HTTP_TIMEOUT_SECS";
}

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "steward.toml",
    "steward.yaml",
    "steward.yml",
    "steward.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<StewardConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./steward.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/steward/steward.{toml,yaml,yml,json}` (user-global)
///
/// Returns `StewardConfig::default()` if no file is found. A file that exists
/// but cannot be read or parsed is an error. Environment variables are applied
/// on top by [`load`].
pub fn discover_and_load() -> anyhow::Result<StewardConfig> {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(config_dir());
    load_from_dirs(&dirs)
}

/// Load the first standard config file found in `dirs`, in order.
fn load_from_dirs(dirs: &[PathBuf]) -> anyhow::Result<StewardConfig> {
    let Some(path) = find_config_file(dirs) else {
        debug!("no config file found, using environment only");
        return Ok(StewardConfig::default());
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path)
}

/// Load the file layer (explicit path or discovered), overlay the process
/// environment, and validate.
pub fn load(path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let mut config = match path {
        Some(p) => load_config(p)?,
        None => discover_and_load()?,
    };
    apply_env(&mut config, |name| std::env::var(name).ok())?;
    Ok(config.resolve()?)
}

fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

/// Returns the user-global config directory, `~/.config/steward/`.
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("steward"))
}

/// Overlay environment variables onto `config`. Set variables win over file
/// values; empty variables are ignored.
pub fn apply_env(
    config: &mut StewardConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let aplos = &mut config.aplos;
    if let Some(v) = get(vars::APLOS_CLIENT_ID).or_else(|| get(vars::APLOS_ID)) {
        aplos.client_id = Some(v);
    }
    if let Some(v) = get(vars::APLOS_SECRET) {
        aplos.client_secret = Some(Secret::new(v));
    }
    if let Some(v) = get(vars::APLOS_PRIVATE_KEY) {
        aplos.private_key = Some(Secret::new(v));
    }
    if let Some(v) = get(vars::APLOS_TOKEN_URL) {
        aplos.token_url = Some(v);
    }
    if let Some(v) = get(vars::APLOS_BASE_URL) {
        aplos.base_url = Some(v);
    }
    if let Some(v) = get(vars::APLOS_FETCH_ACCOUNTS) {
        aplos.fetch_accounts = Some(parse_bool(vars::APLOS_FETCH_ACCOUNTS, &v)?);
    }

    let virtuous = &mut config.virtuous;
    if let Some(v) = get(vars::VIRTUOUS_USERNAME) {
        virtuous.username = Some(v);
    }
    if let Some(v) = get(vars::VIRTUOUS_PASSWORD) {
        virtuous.password = Some(Secret::new(v));
    }
    if let Some(v) = get(vars::VIRTUOUS_TOKEN_URL) {
        virtuous.token_url = Some(v);
    }

    if let Some(v) = get(vars::HTTP_TIMEOUT_SECS) {
        let secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: vars::HTTP_TIMEOUT_SECS,
            value: v.clone(),
            expected: "a whole number of seconds",
        })?;
        config.http.timeout_secs = Some(secs);
    }

    Ok(())
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<StewardConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
