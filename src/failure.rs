// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Classified fetch failures and the record-shaped form they take in batches.
//!
//! The GitHub API only reports problems through a free-text `message` field.
//! [`classify`] is the one place that turns that text into an [`ErrorKind`];
//! everything downstream matches on the kind.

use std::fmt;

use crate::{error::Error, record::Record, transport::TransportError};

/// Reserved record key that marks a record as an [`ErrorRecord`].
pub const ERROR_KEY: &str = "error";

/// Classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    BadCredentials,
    RateLimited,
    TransportFailure,
    Unknown
}

impl ErrorKind {
    /// Stable snake_case tag written into error records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadCredentials => "bad_credentials",
            Self::RateLimited => "rate_limited",
            Self::TransportFailure => "transport_failure",
            Self::Unknown => "unknown"
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an upstream error message.
///
/// Matching is a case-insensitive substring search, checked in order:
/// `"not found"`, `"bad credentials"`, `"rate limit"`. Anything else is
/// [`ErrorKind::Unknown`].
///
/// # Examples
///
/// ```
/// use gitfo::{ErrorKind, classify};
///
/// assert_eq!(classify("API rate limit exceeded for user."), ErrorKind::RateLimited);
/// assert_eq!(classify("Bad credentials"), ErrorKind::BadCredentials);
/// ```
pub fn classify(message: &str) -> ErrorKind {
    let lowered = message.to_lowercase();
    if lowered.contains("not found") {
        ErrorKind::NotFound
    } else if lowered.contains("bad credentials") {
        ErrorKind::BadCredentials
    } else if lowered.contains("rate limit") {
        ErrorKind::RateLimited
    } else {
        ErrorKind::Unknown
    }
}

/// A fetch that produced no usable data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind:    ErrorKind,
    pub message: String
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into()
        }
    }

    /// Builds a failure from an upstream message, classifying it.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify(&message),
            message
        }
    }

    /// Maps the failure into the crate error taxonomy for single-target
    /// commands. `resource` describes the target, e.g. `Repository 'a/b'`.
    pub fn into_error(self, resource: impl Into<String>) -> Error {
        match self.kind {
            ErrorKind::NotFound => Error::NotFound {
                resource: resource.into()
            },
            ErrorKind::BadCredentials => Error::BadCredentials,
            ErrorKind::RateLimited => Error::RateLimited,
            ErrorKind::TransportFailure => Error::TransportFailure {
                message: self.message
            },
            ErrorKind::Unknown => Error::Unknown {
                message: self.message
            }
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<TransportError> for Failure {
    fn from(error: TransportError) -> Self {
        Self::new(ErrorKind::TransportFailure, error.to_string())
    }
}

/// Failure recorded for one target of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub target:  String,
    pub failure: Failure
}

impl ErrorRecord {
    pub fn new(target: impl Into<String>, failure: Failure) -> Self {
        Self {
            target: target.into(),
            failure
        }
    }

    /// Record-shaped view: `target`, the reserved `error` key holding the
    /// classification, and `message`.
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("target", self.target.as_str())
            .with(ERROR_KEY, self.failure.kind.as_str())
            .with("message", self.failure.message.as_str())
    }
}
