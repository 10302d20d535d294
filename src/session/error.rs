//! Session errors.

use crate::client::ClientError;
use thiserror::Error;

/// Fatal failure of the session loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A command issued while handling `event` failed.
    #[error("Handling {event} failed: {source}")]
    Handler {
        event: &'static str,
        #[source]
        source: ClientError,
    },

    /// The link failed outside of any handler (reset or event fetch).
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SessionError {
    /// The underlying client error.
    pub fn client_error(&self) -> &ClientError {
        match self {
            Self::Handler { source, .. } => source,
            Self::Client(source) => source,
        }
    }
}
