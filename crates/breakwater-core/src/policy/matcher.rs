//! Error matchers for trip policies

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::http::{ErrorKind, HttpError};

type Predicate = dyn Fn(&(dyn Error + 'static)) -> bool + Send + Sync;

/// One exemplar of an error that counts toward tripping a breaker.
///
/// Prefer [`TripMatcher::Kind`] or [`TripMatcher::when`], which compare
/// structured values. [`TripMatcher::Message`] compares rendered text and
/// breaks as soon as the message carries parameters.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripMatcher {
    /// Error whose `Display` output equals this text
    Message(String),
    /// [`HttpError`] of this kind
    Kind(ErrorKind),
    /// Arbitrary predicate over the error
    #[serde(skip)]
    Custom(Arc<Predicate>),
}

impl TripMatcher {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    pub fn kind(kind: ErrorKind) -> Self {
        Self::Kind(kind)
    }

    /// Match errors of type `E` that satisfy `predicate`
    ///
    /// ```
    /// use breakwater_core::policy::TripMatcher;
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// enum StoreError {
    ///     #[error("not found")]
    ///     NotFound,
    ///     #[error("unavailable")]
    ///     Unavailable,
    /// }
    ///
    /// let matcher = TripMatcher::when(|e: &StoreError| matches!(e, StoreError::Unavailable));
    /// assert!(matcher.matches(&StoreError::Unavailable));
    /// assert!(!matcher.matches(&StoreError::NotFound));
    /// ```
    pub fn when<E, F>(predicate: F) -> Self
    where
        E: Error + 'static,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(move |err: &(dyn Error + 'static)| {
            err.downcast_ref::<E>().is_some_and(&predicate)
        }))
    }

    /// Match any error satisfying `predicate`
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&(dyn Error + 'static)) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    pub fn matches(&self, err: &(dyn Error + 'static)) -> bool {
        match self {
            Self::Message(text) => err.to_string() == *text,
            Self::Kind(kind) => err
                .downcast_ref::<HttpError>()
                .is_some_and(|http| http.kind() == *kind),
            Self::Custom(predicate) => predicate(err),
        }
    }
}

impl fmt::Debug for TripMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(text) => f.debug_tuple("Message").field(text).finish(),
            Self::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<&str> for TripMatcher {
    fn from(text: &str) -> Self {
        Self::Message(text.to_string())
    }
}

impl From<String> for TripMatcher {
    fn from(text: String) -> Self {
        Self::Message(text)
    }
}

impl From<ErrorKind> for TripMatcher {
    fn from(kind: ErrorKind) -> Self {
        Self::Kind(kind)
    }
}
