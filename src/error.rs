#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the gitfo crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Variants fall into two groups. The operational outcomes (not found, bad
//! credentials, rate limit, transport failure, unknown upstream error) and the
//! pre-flight validation failures (unsupported output format, unsupported
//! source list, missing source list) are *handled*: the CLI reports them as a
//! single line and still exits successfully. Everything else is an
//! unexpected fault.

use std::path::{Path, PathBuf};

/// Unified error type returned by the command pipeline and CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// The requested repository or user does not exist.
    #[error("{resource} not found!")]
    NotFound {
        /// Human readable description of the missing resource.
        resource: String
    },
    /// The supplied token was rejected by the API.
    #[error("Authorization token incorrect!")]
    BadCredentials,
    /// The API quota for the current identity is exhausted.
    #[error("Rate limit exceeded! Try again tomorrow or use authorization.")]
    RateLimited,
    /// The request never produced a response (timeout, refused connection).
    #[error("{message}")]
    TransportFailure {
        /// Description of the transport failure.
        message: String
    },
    /// Output file extension is not one of `.txt`, `.csv`, `.json`.
    #[error("unsupported output format for {path:?}: expected .txt, .csv or .json")]
    UnsupportedFormat {
        /// Rejected output path.
        path: PathBuf
    },
    /// Batch source list is not a `.txt` file.
    #[error("unsupported source file {path:?}: expected a .txt list of targets")]
    UnsupportedSourceType {
        /// Rejected source path.
        path: PathBuf
    },
    /// Batch source list does not exist.
    #[error("source file {path:?} does not exist")]
    SourceNotFound {
        /// Missing source path.
        path: PathBuf
    },
    /// The API answered with an error message that matches no known class.
    #[error("GitHub API error: {message}")]
    Unknown {
        /// Upstream message.
        message: String
    },
    /// Wraps I/O errors that occur while reading input files.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Location of the file being read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps I/O errors that occur while writing an output file.
    #[error("failed to write output file {path:?}: {source}")]
    OutputIo {
        /// Location of the output file.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps I/O errors that occur while writing to the terminal.
    #[error("failed to write to stdout: {source}")]
    Console {
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors of the settings file.
    #[error("failed to parse settings: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps JSON serialization errors when writing structured output.
    #[error("failed to serialize records: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps CSV writer errors.
    #[error("failed to write CSV: {source}")]
    Csv {
        /// Underlying CSV error.
        source: csv::Error
    },
    /// Returned when arguments or settings violate invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Infrastructure errors while preparing the API client.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Returns `true` for expected operational outcomes and pre-flight
    /// validation failures, which the CLI reports without failing the process.
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::BadCredentials
                | Self::RateLimited
                | Self::TransportFailure { .. }
                | Self::UnsupportedFormat { .. }
                | Self::UnsupportedSourceType { .. }
                | Self::SourceNotFound { .. }
                | Self::Unknown { .. }
        )
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<csv::Error> for Error {
    fn from(source: csv::Error) -> Self {
        Self::Csv {
            source
        }
    }
}

impl From<masterror::AppError> for Error {
    fn from(error: masterror::AppError) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the input file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::OutputIo`] variant capturing the failing path and
/// source.
pub fn output_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::OutputIo {
        path: path.to_path_buf(),
        source
    }
}
