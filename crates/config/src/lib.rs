//! Configuration for the Steward gateway.
//!
//! Values come from an optional `steward.toml` (or yaml/json) file with
//! `${VAR}` substitution, overlaid by environment variables, then validated
//! once into [`ResolvedConfig`].

pub mod credentials;
pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
mod validate;

pub use {
    credentials::{
        AplosAuth, AplosAuthMode, AplosCredentials, DEFAULT_HTTP_TIMEOUT, HttpSettings,
        ResolvedConfig, VirtuousCredentials,
    },
    error::ConfigError,
    loader::{apply_env, config_dir, discover_and_load, load, load_config, vars},
    schema::{AplosSection, HttpSection, StewardConfig, VirtuousSection},
};
