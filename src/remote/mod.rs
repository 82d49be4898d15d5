pub mod auth;
pub mod documents;
pub mod error;

pub use auth::{AuthAction, AuthClient, AuthSession};
pub use documents::DocumentClient;
pub use error::RemoteError;
