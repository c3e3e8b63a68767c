use thiserror::Error;

/// Recoverable front-end failures. Each is reported on the error stream and
/// leaves the position untouched. History overflow and internal invariant
/// violations are programmer errors and panic instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("malformed position string: {0}")]
    MalformedFen(&'static str),

    #[error("malformed move string `{text}`: {reason}")]
    MalformedMove { text: String, reason: &'static str },

    #[error("illegal move `{0}` in the current position")]
    IllegalMove(String),
}
