// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Command orchestration.
///
/// Every command validates its local inputs (output format, source list)
/// before the first request. Single-target commands stop at the first
/// failure and report it through the [`Error`] taxonomy; batch commands keep
/// going and record failures in place.
use std::{
    fmt,
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::{
    batch::{Batch, load_targets, run_batch},
    error::Error,
    failure::{ErrorKind, Failure},
    github::{RepositoryOptions, fetch_rate_limit, fetch_repository, fetch_user},
    record::Record,
    render::{OutputFormat, render_batch_to_file, render_to_console, render_to_file},
    target::{RepositoryTarget, parse_login},
    transport::Transport,
};

/// Outcome of a batch command.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct BatchSummary
{
    /// Entries written, failures included.
    pub total:  usize,
    /// Entries that failed.
    pub failed: usize,
    /// Output file.
    pub path:   PathBuf,
}

impl fmt::Display for BatchSummary
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{} records written to {} ({} failed)", self.total, self.path.display(), self.failed)
    }
}

/// `repo`: one repository to the console or to `output`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] before any request when `output` has
/// an unsupported extension and the classified fetch failure otherwise. A
/// malformed identifier cannot name an existing repository and is reported as
/// [`Error::NotFound`] without a request.
pub fn run_repo<T: Transport + ?Sized,>(
    transport: &T, target: &str, options: RepositoryOptions, output: Option<&Path,>,
) -> Result<(), Error,>
{
    preflight_output(output,)?;
    let repository = RepositoryTarget::parse(target,).ok_or_else(|| Error::NotFound {
        resource: format!("Repository '{}'", target.trim()),
    },)?;

    let record = fetch_repository(transport, &repository, options,)
        .map_err(|failure| failure.into_error(format!("Repository '{repository}'"),),)?;
    emit(&record, output,)
}

/// `user`: one user profile to the console or to `output`.
///
/// # Errors
///
/// See [`run_repo`].
pub fn run_user<T: Transport + ?Sized,>(
    transport: &T, login: &str, output: Option<&Path,>,
) -> Result<(), Error,>
{
    preflight_output(output,)?;
    let login = parse_login(login,).ok_or_else(|| Error::NotFound {
        resource: format!("User '{}'", login.trim()),
    },)?;

    let record =
        fetch_user(transport, login,).map_err(|failure| failure.into_error(format!("User '{login}'"),),)?;
    emit(&record, output,)
}

/// `limit`: API quota of the supplied token, to the console.
///
/// # Errors
///
/// Returns the classified fetch failure, typically
/// [`Error::BadCredentials`].
pub fn run_limit<T: Transport + ?Sized,>(transport: &T,) -> Result<(), Error,>
{
    let record = fetch_rate_limit(transport,).map_err(|failure| failure.into_error("Rate limit",),)?;
    render_to_console(&record,)
}

/// `repobatch`: every repository listed in `source`, written to `output`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`], [`Error::UnsupportedSourceType`] or
/// [`Error::SourceNotFound`] before any request is made. Per-target failures
/// are not errors; they become error entries in the output.
pub fn run_repo_batch<T: Transport + ?Sized,>(
    transport: &T, source: &Path, options: RepositoryOptions, output: &Path,
) -> Result<BatchSummary, Error,>
{
    let targets = preflight_batch(source, output,)?;
    let progress = batch_progress(targets.len(),);

    let batch = run_batch(&targets, |target| {
        progress.set_message(target.to_owned(),);
        let outcome = match RepositoryTarget::parse(target,) {
            Some(repository,) => fetch_repository(transport, &repository, options,),
            None => Err(Failure::new(
                ErrorKind::Unknown,
                format!("invalid repository '{target}': expected owner/name"),
            ),),
        };
        progress.inc(1,);
        outcome
    },);
    progress.finish_and_clear();

    finish_batch(&batch, output,)
}

/// `userbatch`: every user listed in `source`, written to `output`.
///
/// # Errors
///
/// See [`run_repo_batch`].
pub fn run_user_batch<T: Transport + ?Sized,>(
    transport: &T, source: &Path, output: &Path,
) -> Result<BatchSummary, Error,>
{
    let targets = preflight_batch(source, output,)?;
    let progress = batch_progress(targets.len(),);

    let batch = run_batch(&targets, |target| {
        progress.set_message(target.to_owned(),);
        let outcome = match parse_login(target,) {
            Some(login,) => fetch_user(transport, login,),
            None => Err(Failure::new(ErrorKind::Unknown, format!("invalid user login '{target}'"),),),
        };
        progress.inc(1,);
        outcome
    },);
    progress.finish_and_clear();

    finish_batch(&batch, output,)
}

fn preflight_output(output: Option<&Path,>,) -> Result<(), Error,>
{
    if let Some(path,) = output {
        OutputFormat::from_path(path,)?;
    }
    Ok((),)
}

fn preflight_batch(source: &Path, output: &Path,) -> Result<Vec<String,>, Error,>
{
    OutputFormat::from_path(output,)?;
    let targets = load_targets(source,)?;
    info!("loaded {} targets from {}", targets.len(), source.display());
    Ok(targets,)
}

fn emit(record: &Record, output: Option<&Path,>,) -> Result<(), Error,>
{
    match output {
        Some(path,) => render_to_file(record, path,),
        None => render_to_console(record,),
    }
}

fn finish_batch(batch: &Batch, output: &Path,) -> Result<BatchSummary, Error,>
{
    render_batch_to_file(&batch.records(), output,)?;
    Ok(BatchSummary {
        total:  batch.len(),
        failed: batch.failures(),
        path:   output.to_path_buf(),
    },)
}

fn batch_progress(total: usize,) -> ProgressBar
{
    let progress = ProgressBar::new(total as u64,);
    let style = ProgressStyle::with_template("{spinner:.yellow} [{elapsed_precise}] {bar:30} {pos}/{len} {msg}",)
        .unwrap_or_else(|_| ProgressStyle::default_bar(),);
    progress.set_style(style,);
    progress
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use serde_json::json;
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::transport::{TransportError, fake::FakeTransport};

    fn workspace() -> TempDir
    {
        tempdir().expect("failed to create tempdir",)
    }

    fn repo_transport() -> FakeTransport
    {
        FakeTransport::new()
            .respond("/repos/octocat/Hello-World", json!({ "name": "Hello-World", "stargazers_count": 80 }),)
            .respond("/repos/rust-lang/rust", json!({ "name": "rust", "stargazers_count": 100000 }),)
            .fail(
                "/repos/slow/repo",
                TransportError::Timeout {
                    seconds: 10,
                },
            )
    }

    #[test]
    fn unsupported_output_fails_before_any_request()
    {
        let temp = workspace();
        let output = temp.path().join("output.xyz",);
        let transport = repo_transport();

        let result = run_repo(&transport, "octocat/Hello-World", RepositoryOptions::default(), Some(output.as_path(),),);

        assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
        assert!(transport.routes().is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn repo_writes_json_file()
    {
        let temp = workspace();
        let output = temp.path().join("repo.json",);
        let transport = repo_transport();

        run_repo(&transport, "https://github.com/octocat/Hello-World", RepositoryOptions::default(), Some(output.as_path(),),)
            .expect("repo command",);

        let written: Record = serde_json::from_str(&fs::read_to_string(&output,).expect("read",),).expect("json",);
        assert_eq!(written.get("name"), Some(&crate::record::Value::from("Hello-World")));
    }

    #[test]
    fn missing_repository_is_a_handled_error()
    {
        let temp = workspace();
        let output = temp.path().join("repo.txt",);
        let transport = repo_transport();

        let error = run_repo(&transport, "octocat/missing", RepositoryOptions::default(), Some(output.as_path(),),)
            .expect_err("not found",);

        assert!(error.is_handled());
        assert_eq!(error.to_string(), "Repository 'octocat/missing' not found!");
        assert!(!output.exists());
    }

    #[test]
    fn malformed_identifier_is_a_handled_not_found()
    {
        let transport = repo_transport();

        let error = run_repo(&transport, "no-slash", RepositoryOptions::default(), None,).expect_err("invalid",);
        assert!(error.is_handled());
        assert_eq!(error.to_string(), "Repository 'no-slash' not found!");

        let error = run_user(&transport, "bad--login", None,).expect_err("invalid",);
        assert!(error.is_handled());
        assert_eq!(error.to_string(), "User 'bad--login' not found!");

        assert!(transport.routes().is_empty());
    }

    #[test]
    fn user_failure_maps_to_taxonomy()
    {
        let transport = FakeTransport::new().respond("/users/octocat", json!({ "message": "Bad credentials" }),);
        let error = run_user(&transport, "octocat", None,).expect_err("bad token",);
        assert!(matches!(error, Error::BadCredentials));
    }

    #[test]
    fn limit_with_rejected_token_reports_bad_credentials()
    {
        let transport = FakeTransport::new().respond("/rate_limit", json!({ "message": "Bad credentials" }),);
        let error = run_limit(&transport,).expect_err("bad token",);
        assert_eq!(error.to_string(), "Authorization token incorrect!");
    }

    #[test]
    fn repo_batch_isolates_failures()
    {
        let temp = workspace();
        let source = temp.path().join("repos.txt",);
        let output = temp.path().join("repos.csv",);
        fs::write(&source, "octocat/Hello-World\nslow/repo\n\nrust-lang/rust\nnot an identifier\n",)
            .expect("write source",);
        let transport = repo_transport();

        let summary =
            run_repo_batch(&transport, &source, RepositoryOptions::default(), &output,).expect("batch",);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.failed, 2);
        assert_eq!(
            transport.routes(),
            vec!["/repos/octocat/Hello-World", "/repos/slow/repo", "/repos/rust-lang/rust"]
        );

        let mut reader = csv::Reader::from_path(&output,).expect("open csv",);
        let header = reader.headers().expect("header",).clone();
        let column = |name: &str| header.iter().position(|key| key == name,).expect("column",);
        let (error, target,) = (column("error",), column("target",),);
        let rows: Vec<csv::StringRecord,> = reader.records().collect::<Result<_, _,>>().expect("rows",);

        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][error], "");
        assert_eq!(&rows[1][error], "transport_failure");
        assert_eq!(&rows[1][target], "slow/repo");
        assert_eq!(&rows[2][column("name",)], "rust");
        assert_eq!(&rows[3][error], "unknown");
    }

    #[test]
    fn batch_preflight_runs_before_any_request()
    {
        let temp = workspace();
        let transport = repo_transport();

        let wrong_type = temp.path().join("repos.csv",);
        fs::write(&wrong_type, "octocat/Hello-World\n",).expect("write source",);
        let result = run_repo_batch(&transport, &wrong_type, RepositoryOptions::default(), &temp.path().join("o.csv"),);
        assert!(matches!(result, Err(Error::UnsupportedSourceType { .. })));

        let missing = temp.path().join("missing.txt",);
        let result = run_user_batch(&transport, &missing, &temp.path().join("o.json"),);
        assert!(matches!(result, Err(Error::SourceNotFound { .. })));

        let source = temp.path().join("users.txt",);
        fs::write(&source, "octocat\n",).expect("write source",);
        let output = temp.path().join("users.xyz",);
        let result = run_user_batch(&transport, &source, &output,);
        assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
        assert!(!output.exists());

        assert!(transport.routes().is_empty());
    }

    #[test]
    fn user_batch_writes_text_blocks()
    {
        let temp = workspace();
        let source = temp.path().join("users.txt",);
        let output = temp.path().join("profiles.txt",);
        fs::write(&source, "octocat\nghost\n",).expect("write source",);
        let transport = FakeTransport::new()
            .respond("/users/octocat", json!({ "login": "octocat" }),)
            .respond("/users/ghost", json!({ "login": "ghost" }),);

        let summary = run_user_batch(&transport, &source, &output,).expect("batch",);

        assert_eq!(summary.failed, 0);
        assert_eq!(summary.to_string(), format!("2 records written to {} (0 failed)", output.display()));
        let text = fs::read_to_string(&output,).expect("read",);
        let blocks: Vec<&str,> = text.split("\n\n",).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("target: octocat\nlogin: octocat\n"));
        assert!(blocks[1].starts_with("target: ghost\nlogin: ghost\n"));
    }
}
