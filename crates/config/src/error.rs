//! Configuration errors. All of them are fatal at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{provider}: {var} is required for {mode}")]
    Missing {
        provider: &'static str,
        var: &'static str,
        mode: &'static str,
    },

    #[error("{provider}: {what} (set {vars})")]
    MissingOneOf {
        provider: &'static str,
        what: &'static str,
        vars: &'static str,
    },

    #[error("{var}: invalid URL {value:?}: {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var}: invalid value {value:?}, expected {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}
