//! Error taxonomy for the merge engine and its configuration layer.
//!
//! Only configuration errors are produced inside this crate: the core never
//! touches a byte stream, so transport failures (stdin/stdout, envelope
//! decoding) are a `merge-plugin` concern. Structural-skip and
//! semantic-override conditions are absorbed locally by the reader and merge
//! engine respectively and never surface as `Result` errors.

use thiserror::Error;

/// Fatal misconfiguration of the generator parameter string or the derived
/// [`crate::config::MergeSpec`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unrecognised parameter key `{0}`")]
    UnknownKey(String),

    #[error("expected exactly three `prefix=` parameters, got {0}")]
    WrongPrefixCount(usize),

    #[error("expected exactly three `package=` parameters, got {0}")]
    WrongPackageCount(usize),
}
