// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Failure-tolerant, strictly sequential processing of target lists.
///
/// Every non-blank input line yields exactly one batch entry, in input order.
/// A failed fetch becomes an [`ErrorRecord`] in place instead of aborting the
/// run, and duplicate targets are fetched once per occurrence.
use std::{fs, path::Path};

use tracing::{info, warn};

use crate::{
    error::{self, Error},
    failure::{ErrorRecord, Failure},
    record::Record,
};

/// Key naming the input identifier of every batch record.
const TARGET_KEY: &str = "target";

/// Extension required for batch source lists.
const SOURCE_EXTENSION: &str = "txt";

/// Outcome for one target of a batch.
#[derive(Debug, Clone, PartialEq,)]
pub enum BatchEntry
{
    /// The target produced usable data.
    Record
    {
        target: String, record: Record,
    },
    /// The target failed; the failure is kept in place.
    Error(ErrorRecord,),
}

impl BatchEntry
{
    pub fn target(&self,) -> &str
    {
        match self {
            Self::Record {
                target, ..
            } => target,
            Self::Error(error,) => &error.target,
        }
    }

    pub fn is_error(&self,) -> bool
    {
        matches!(self, Self::Error(_))
    }

    /// Record rendered for this entry, led by a `target` field holding the
    /// input identifier; failures use the error record shape.
    pub fn to_record(&self,) -> Record
    {
        match self {
            Self::Record {
                target,
                record,
            } => {
                let mut rendered = Record::new().with(TARGET_KEY, target.as_str(),);
                rendered.merge(record.clone(),);
                rendered
            }
            Self::Error(error,) => error.to_record(),
        }
    }
}

/// Ordered per-target outcomes of one batch command.
#[derive(Debug, Clone, PartialEq, Default,)]
pub struct Batch
{
    entries: Vec<BatchEntry,>,
}

impl Batch
{
    pub fn entries(&self,) -> &[BatchEntry]
    {
        &self.entries
    }

    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }

    /// Number of entries that failed.
    pub fn failures(&self,) -> usize
    {
        self.entries.iter().filter(|entry| entry.is_error(),).count()
    }

    /// Records in input order, ready for rendering.
    pub fn records(&self,) -> Vec<Record,>
    {
        self.entries.iter().map(BatchEntry::to_record,).collect()
    }

    fn push(&mut self, target: &str, outcome: Result<Record, Failure,>,)
    {
        let entry = match outcome {
            Ok(record,) => BatchEntry::Record {
                target: target.to_owned(),
                record,
            },
            Err(failure,) => {
                warn!("{} failed: {}", target, failure);
                BatchEntry::Error(ErrorRecord::new(target, failure,),)
            }
        };
        self.entries.push(entry,);
    }
}

/// Runs `fetch` for every target, one after another.
///
/// Blank targets are skipped. Transport failures reach this point already
/// classified (see [`Failure`]), so no outcome can abort the loop.
///
/// # Example
///
/// ```
/// use gitfo::{Failure, Record, run_batch};
///
/// let targets = vec!["ok".to_owned(), "".to_owned(), "missing".to_owned()];
/// let batch = run_batch(&targets, |target| match target {
///     "ok" => Ok(Record::new().with("name", target,),),
///     _ => Err(Failure::from_message("Not Found",),),
/// },);
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.failures(), 1);
/// ```
pub fn run_batch<F,>(targets: &[String], mut fetch: F,) -> Batch
where
    F: FnMut(&str,) -> Result<Record, Failure,>,
{
    let mut batch = Batch::default();

    for target in targets.iter().map(|target| target.trim(),).filter(|target| !target.is_empty(),) {
        let outcome = fetch(target,);
        batch.push(target, outcome,);
    }

    info!("batch finished: {} targets, {} failed", batch.len(), batch.failures());
    batch
}

/// Loads batch targets from a `.txt` source list, one per line.
///
/// # Errors
///
/// Returns [`Error::UnsupportedSourceType`] when the path does not end in
/// `.txt`, [`Error::SourceNotFound`] when it does not exist and
/// [`Error::Io`] when it cannot be read.
pub fn load_targets(path: &Path,) -> Result<Vec<String,>, Error,>
{
    ensure_source(path,)?;
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    Ok(parse_targets(&contents,),)
}

/// Validates a source list path without reading it.
///
/// # Errors
///
/// See [`load_targets`].
pub fn ensure_source(path: &Path,) -> Result<(), Error,>
{
    let is_text = path
        .extension()
        .and_then(|extension| extension.to_str(),)
        .is_some_and(|extension| extension.eq_ignore_ascii_case(SOURCE_EXTENSION,),);
    if !is_text {
        return Err(Error::UnsupportedSourceType {
            path: path.to_path_buf(),
        },);
    }
    if !path.is_file() {
        return Err(Error::SourceNotFound {
            path: path.to_path_buf(),
        },);
    }
    Ok((),)
}

/// Splits a source list into targets, dropping blank lines. Duplicates are
/// kept.
pub fn parse_targets(contents: &str,) -> Vec<String,>
{
    contents.lines().map(str::trim,).filter(|line| !line.is_empty(),).map(str::to_owned,).collect()
}
