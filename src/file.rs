// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Output file handling for rendered records.
///
/// Writes go through [`PendingFile`], which removes a partially written file
/// unless it was explicitly committed.
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::{self, Error};

/// Output file that is deleted on drop unless [`commit`](Self::commit) ran.
///
/// # Example
///
/// ```no_run
/// use std::{io::Write, path::Path};
///
/// use gitfo::PendingFile;
///
/// # fn example() -> Result<(), gitfo::Error> {
/// let mut file = PendingFile::create(Path::new("out/repo.txt"))?;
/// file.write_all(b"name: Hello-World\n")
///     .map_err(|source| gitfo::Error::OutputIo {
///         path: "out/repo.txt".into(),
///         source
///     })?;
/// file.commit()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PendingFile {
    path:   PathBuf,
    writer: Option<BufWriter<File>>
}

impl PendingFile {
    /// Creates (or truncates) the file, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputIo`] when the directories or the file cannot be
    /// created.
    pub fn create(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|source| error::output_io_error(path, source))?;
        }

        let file = File::create(path).map_err(|source| error::output_io_error(path, source))?;
        debug!("opened output file {}", path.display());

        Ok(Self {
            path:   path.to_path_buf(),
            writer: Some(BufWriter::new(file))
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered bytes and keeps the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputIo`] when flushing fails; the file is removed.
    pub fn commit(mut self) -> Result<(), Error> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        match writer.into_inner() {
            Ok(_file) => Ok(()),
            Err(failed) => {
                let source = failed.into_error();
                self.discard();
                Err(error::output_io_error(&self.path, source))
            }
        }
    }

    fn discard(&mut self) {
        // close the handle before removing
        self.writer = None;
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("removed incomplete output {}", self.path.display()),
            Err(e) => warn!("failed to remove incomplete output {}: {e}", self.path.display())
        }
    }
}

impl Write for PendingFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.writer.as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(std::io::Error::other("output file already closed"))
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(())
        }
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.writer.is_some() {
            self.discard();
        }
    }
}

/// Writes `contents` to `path`, leaving no file behind on failure.
///
/// # Errors
///
/// Returns [`Error::OutputIo`] when the file cannot be created or written.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let mut file = PendingFile::create(path)?;
    file.write_all(contents)
        .map_err(|source| error::output_io_error(path, source))?;
    file.commit()
}
