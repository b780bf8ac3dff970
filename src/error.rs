use thiserror::Error;

use crate::stages::StageKey;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by stage resolution and the random stage multiplexer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error(
        "stage {requested} is not in the environment pool; valid stages: [{}]",
        join_keys(.valid)
    )]
    KeyNotFound {
        requested: StageKey,
        valid: Vec<StageKey>,
    },

    #[error(
        "failed to close {} pooled environment(s): {}",
        .failures.len(),
        join_failures(.failures)
    )]
    Close {
        failures: Vec<(StageKey, String)>,
    },
}

fn join_keys(keys: &[StageKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_failures(failures: &[(StageKey, String)]) -> String {
    failures
        .iter()
        .map(|(key, msg)| format!("{key}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}
