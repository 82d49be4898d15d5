//! Errors from the managed auth and document services.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    /// A message ready to show on the sign-in form.
    #[error("{0}")]
    Auth(String),

    #[error("Remote service is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("{0} is not allowed to create events")]
    NotAdmin(String),

    #[error("Document service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Malformed document: {0}")]
    Document(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;
