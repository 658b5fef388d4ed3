// Configuration faults, the only errors this crate returns.
//
// Search outcomes (no path, timeout, cancellation) are statuses, not errors,
// and infeasible moves are simply not emitted. A bad configuration is the
// one thing the caller must fix, so it fails fast when the config is built,
// never in the middle of a search.
//
// See also: `config.rs` for `PathConfig::from_json`, `PathConfig::set` and
// `PathConfig::validate`, which produce these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON, a wrong value type, or a key the config does not have.
    #[error("invalid path configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown configuration key `{0}`")]
    UnknownKey(String),

    #[error("cannot parse `{value}` for configuration key `{key}`")]
    InvalidValue { key: String, value: String },

    #[error("configuration key `{key}` out of range: {reason}")]
    OutOfRange { key: &'static str, reason: String },
}
