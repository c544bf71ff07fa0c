use cardnav_core::{
    graph::GraphError, predict::PredictError, resolve::ResolveError, store::StoreError,
    url::UrlError,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable class + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<UrlError> for Error {
    fn from(err: UrlError) -> Self {
        Self::new(ErrorKind::Malformed, ErrorOrigin::Url, err.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout { .. } => {
                Self::new(ErrorKind::Timeout, ErrorOrigin::Store, err.to_string())
            }
            StoreError::Read { .. } => {
                Self::new(ErrorKind::Unavailable, ErrorOrigin::Store, err.to_string())
            }
        }
    }
}

impl From<GraphError> for Error {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UnknownCard { .. } => {
                Self::new(ErrorKind::NotFound, ErrorOrigin::Graph, err.to_string())
            }

            GraphError::Store(inner) => inner.into(),

            // Everything else is broken metadata; the request was fine.
            GraphError::ForeignField { .. }
            | GraphError::DuplicateFilterName { .. }
            | GraphError::CycleDetected { .. }
            | GraphError::DanglingReference { .. }
            | GraphError::MissingChildCard { .. }
            | GraphError::AmbiguousShortcut { .. } => {
                Self::new(ErrorKind::Integrity, ErrorOrigin::Graph, err.to_string())
            }
        }
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Graph(inner) => inner.into(),

            ResolveError::UnknownField { .. }
            | ResolveError::UnknownFilter { .. }
            | ResolveError::InvalidContext { .. } => {
                Self::new(ErrorKind::NotFound, ErrorOrigin::Resolve, err.to_string())
            }
        }
    }
}

impl From<PredictError> for Error {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Graph(inner) => inner.into(),

            PredictError::MissingSelection { .. } => {
                Self::new(ErrorKind::Malformed, ErrorOrigin::Predict, err.to_string())
            }

            PredictError::NoMatchingShortcut { .. } => {
                Self::new(ErrorKind::NoEffect, ErrorOrigin::Predict, err.to_string())
            }

            PredictError::UnknownFilter { .. } => {
                Self::new(ErrorKind::NotFound, ErrorOrigin::Predict, err.to_string())
            }
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and host shells.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    /// Metadata failed an integrity check; no state can be trusted.
    Integrity,

    /// The input itself is unusable (bad URL, descent without selection).
    Malformed,

    /// Valid input that matches nothing; the state is unchanged.
    NoEffect,

    /// The input names a card, field, or filter that does not exist.
    NotFound,

    /// The metadata store missed its read budget.
    Timeout,

    /// The metadata store failed outright.
    Unavailable,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers and host shells.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorOrigin {
    Graph,
    Predict,
    Resolve,
    Store,
    Url,
}
