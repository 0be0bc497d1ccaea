//! Metadata extraction for GitHub repositories and users.
//!
//! Raw API responses are normalized into flat [`Record`]s, partial records for
//! the same target are [`merge`]d, lists of targets are processed one by one
//! with per-target failure isolation ([`run_batch`]), and the result is
//! rendered to the console or to a text, CSV or JSON file. Network access sits
//! behind the [`Transport`] trait; [`GitHubTransport`] is the blocking
//! octocrab-backed implementation used by the binary.

mod batch;
mod commands;
mod config;
mod console;
mod error;
mod failure;
mod file;
mod github;
mod merge;
mod normalizer;
mod record;
mod render;
mod target;
mod transport;

pub use batch::{Batch, BatchEntry, ensure_source, load_targets, parse_targets, run_batch};
pub use commands::{BatchSummary, run_limit, run_repo, run_repo_batch, run_user, run_user_batch};
pub use config::{DEFAULT_TIMEOUT_SECS, Settings, load_settings, parse_settings};
pub use console::{write_failure, write_record};
pub use error::{Error, io_error, output_io_error};
pub use failure::{ERROR_KEY, ErrorKind, ErrorRecord, Failure, classify};
pub use file::{PendingFile, write_output};
pub use github::{RepositoryOptions, fetch_rate_limit, fetch_repository, fetch_resource, fetch_user};
pub use merge::merge;
pub use normalizer::{ResourceKind, language_breakdown, normalize};
pub use record::{Fields, Mapping, Record, Scalar, Value};
pub use render::{
    OutputFormat, batch_header, encode_batch, encode_record, flatten, render_batch_to_file,
    render_to_console, render_to_file,
};
pub use target::{RepositoryTarget, parse_login};
pub use transport::{GitHubTransport, Transport, TransportError};
