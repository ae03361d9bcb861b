//! Typed errors for message decoding and problem registry construction.

use thiserror::Error;

/// Reasons a retrieved message could not be turned into an envelope and body.
///
/// These never escape the analyzer as `Err`; they become the
/// `MessageCorrupt` classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message has no header section")]
    NoHeaders,

    #[error("message has no plain text body content")]
    NoPlainTextBody,

    #[error("unparseable Content-Type: {0}")]
    BadContentType(String),

    #[error("undecodable {0} body")]
    BadEncoding(String),

    #[error("malformed multipart body: {0}")]
    BadMultipart(String),
}

/// Configuration errors in the problem registry. Any of these aborts startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("problem {0} registered twice")]
    DuplicateCode(String),

    #[error("problem {problem} depends on unregistered problem {dependency}")]
    UnknownDependency { problem: String, dependency: String },

    #[error("problem {problem} template uses undeclared variable {{{variable}}}")]
    UnknownVariable { problem: String, variable: String },

    #[error("problem {problem} has no template for variant {variant:?}")]
    MissingTemplate { problem: String, variant: String },

    #[error("dependency cycle among problems: {}", remaining.join(", "))]
    Cycle { remaining: Vec<String> },
}
