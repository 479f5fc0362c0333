//! Errors surfaced by a reconcile tick.
//!
//! Every error bubbles up to the controller, which reports it through the
//! record's `Synced` condition and requeues with backoff. Only "not found"
//! is ever swallowed, and only where absence is a valid outcome (observing a
//! missing object, deleting an object that is already gone).

use std::time::Duration;

use thiserror::Error;

/// Marker embedded in the rendering of every remote 404, used to classify
/// errors that only survive as text.
const NOT_FOUND_MARKER: &str = "status 404";

#[derive(Debug, Error)]
pub enum Error {
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// The request never produced a response (connection, TLS, timeout).
    #[error("failed to execute request to {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote API answered with a non-2xx status.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Missing or invalid ProviderConfig, credentials payload or base URL.
    /// Retrying will not help until the referenced objects are fixed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The credentials secret could not be read. May be transient.
    #[error("cannot extract credentials: {0}")]
    Credentials(String),

    /// A cross-resource reference could not be resolved.
    #[error("reference error: {0}")]
    Reference(String),

    /// A kind-specific required field is missing. Never sent to the remote.
    #[error("validation error: {0}")]
    Validation(String),

    /// The record has no external name where one is required, or the remote
    /// object came back without an identifier.
    #[error("missing external name: {0}")]
    MissingIdentity(String),

    #[error("reconcile did not finish within {0:?}")]
    Timeout(Duration),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of an [`Error`], deciding how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote object is absent.
    NotFound,
    /// Network failure, 5xx or timeout. Retried on the next tick.
    Transient,
    /// Broken ProviderConfig, credentials or reference.
    Configuration,
    /// A required field is missing from the record.
    Validation,
    /// Non-2xx, non-404 remote response.
    RemoteRejected,
}

impl Error {
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Kube(kube::Error::Api(response)) if response.code == 404 => ErrorKind::NotFound,
            Error::Kube(_) => ErrorKind::Transient,
            Error::Http { .. } | Error::Credentials(_) | Error::Timeout(_) => ErrorKind::Transient,
            Error::Api { status: 404, .. } => ErrorKind::NotFound,
            Error::Api { status, .. } if *status >= 500 => ErrorKind::Transient,
            Error::Api { .. } | Error::Decode { .. } | Error::MissingIdentity(_) => {
                ErrorKind::RemoteRejected
            }
            Error::Configuration(_) | Error::Reference(_) => ErrorKind::Configuration,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Context { source, .. } => source.kind(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound || is_not_found(self)
    }
}

/// Whether an error, or anything in its source chain, reports a remote 404.
///
/// Classification is textual, so it also works for errors that were
/// synthesized or wrapped outside of this crate.
pub fn is_not_found(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if error.to_string().contains(NOT_FOUND_MARKER) {
            return true;
        }
        current = error.source();
    }
    false
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
