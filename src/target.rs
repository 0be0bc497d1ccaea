// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Parsing of repository and user identifiers supplied on the command line
//! or in batch source lists.
//!
//! Repositories are accepted as `owner/name` or as a GitHub URL such as
//! `https://github.com/owner/name.git`. URLs pointing below a repository
//! (`/tree/main`, `/issues/1`) are rejected.

use std::{fmt, sync::LazyLock};

use regex::Regex;

/// `owner/name`, optionally behind a `github.com` URL prefix, with an optional
/// `.git` suffix and trailing slashes.
static REPOSITORY: LazyLock<Option<Regex,>,> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:https?://)?(?:www\.)?github\.com/)?([A-Za-z0-9][A-Za-z0-9-]*)/([A-Za-z0-9._-]+?)(?:\.git)?/*$",
    )
    .ok()
},);

/// Owner and name of a repository.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RepositoryTarget
{
    pub owner: String,
    pub name:  String,
}

impl RepositoryTarget
{
    /// Parses an identifier. Returns `None` when the input does not contain an
    /// owner and a repository name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitfo::RepositoryTarget;
    ///
    /// let target = RepositoryTarget::parse("https://github.com/octocat/Hello-World.git/",)
    ///     .expect("valid identifier",);
    /// assert_eq!(target.to_string(), "octocat/Hello-World");
    /// assert!(RepositoryTarget::parse("just-a-name").is_none());
    /// ```
    pub fn parse(source: &str,) -> Option<Self,>
    {
        let captures = REPOSITORY.as_ref()?.captures(source.trim(),)?;
        let owner = captures.get(1,)?.as_str();
        let name = captures.get(2,)?.as_str();

        Some(Self {
            owner: owner.to_owned(), name: name.to_owned(),
        },)
    }

    /// API route of the repository with an optional sub-resource appended.
    pub fn route(&self, suffix: &str,) -> String
    {
        format!("/repos/{}/{}{suffix}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryTarget
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Validates a user login. Logins are alphanumeric with single inner hyphens.
pub fn parse_login(source: &str,) -> Option<&str,>
{
    let trimmed = source.trim();
    let valid = !trimmed.is_empty()
        && !trimmed.starts_with('-',)
        && !trimmed.ends_with('-',)
        && !trimmed.contains("--",)
        && trimmed.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-',);

    if valid { Some(trimmed,) } else { None }
}
