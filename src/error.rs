use thiserror::Error;

/// Errors surfaced by the Vitrine client.
///
/// User-facing variants keep the French messages the catalog UI displays.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration, raised at load time before any
    /// request can be built
    #[error("configuration error: {0}")]
    Config(String),

    /// An authenticated call was attempted without a session token
    #[error("Utilisateur non authentifié")]
    AuthRequired,

    /// Login was called with an empty identifier or password
    #[error("Identifiants requis")]
    MissingCredentials,

    /// Non-success HTTP status from the content service
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Success response missing the expected shape
    #[error("Réponse invalide")]
    InvalidResponse,

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed JSON in a response body
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
