//! Client settings loaded from an optional YAML document.
//!
//! Every field has a default, so an absent settings file behaves like an empty
//! one. Command-line values are layered on top by the CLI through
//! [`Settings::with_token`].

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// Bounded wait applied to every outbound request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Resolved client settings.
///
/// # Examples
///
/// ```
/// use gitfo::Settings;
///
/// let yaml = r#"
/// timeout: 5
/// base_url: https://github.example.com/api/v3
/// "#;
/// let settings: Settings = serde_yaml::from_str(yaml,).expect("valid settings",);
/// assert_eq!(settings.timeout_secs, 5);
/// assert!(settings.token.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize,)]
pub struct Settings
{
    /// Seconds to wait for each API response before giving up.
    #[serde(default = "default_timeout", alias = "timeout", alias = "timeout-secs")]
    pub timeout_secs: u64,

    /// Optional API root, e.g. a GitHub Enterprise endpoint.
    #[serde(default, alias = "base_uri", alias = "base-url", alias = "baseUrl")]
    pub base_url: Option<String,>,

    /// Optional personal access token.
    #[serde(default, alias = "auth")]
    pub token: Option<String,>,
}

fn default_timeout() -> u64
{
    DEFAULT_TIMEOUT_SECS
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS, base_url: None, token: None,
        }
    }
}

impl Settings
{
    /// Overrides the token when `token` is present and non-blank.
    pub fn with_token(mut self, token: Option<String,>,) -> Self
    {
        if let Some(token,) = token.map(|value| value.trim().to_owned(),).filter(|value| !value.is_empty(),) {
            self.token = Some(token,);
        }
        self
    }

    fn validate(self,) -> Result<Self, Error,>
    {
        if self.timeout_secs == 0 {
            return Err(Error::validation("timeout must be at least one second",),);
        }
        if let Some(base_url,) = self.base_url.as_deref()
            && base_url.trim().is_empty()
        {
            return Err(Error::validation("base_url cannot be blank",),);
        }
        Ok(self,)
    }
}

/// Loads settings from `path`, or returns the defaults when no path is given.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read, [`Error::Parse`] when
/// the YAML is malformed and [`Error::Validation`] for out-of-range values.
pub fn load_settings(path: Option<&Path,>,) -> Result<Settings, Error,>
{
    match path {
        Some(path,) => {
            let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
            parse_settings(&contents,)
        }
        None => Ok(Settings::default(),),
    }
}

/// Parses settings from a YAML document. An empty document yields defaults.
///
/// # Errors
///
/// See [`load_settings`].
pub fn parse_settings(contents: &str,) -> Result<Settings, Error,>
{
    if contents.trim().is_empty() {
        return Ok(Settings::default(),);
    }
    let settings: Settings = serde_yaml::from_str(contents,)?;
    settings.validate()
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn empty_document_yields_defaults()
    {
        let settings = parse_settings("\n",).expect("defaults",);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeout_secs, 10);
    }

    #[test]
    fn aliases_are_accepted()
    {
        let settings = parse_settings("timeout: 3\nbase_uri: https://ghe.local/api/v3\nauth: abc\n",)
            .expect("valid settings",);
        assert_eq!(settings.timeout_secs, 3);
        assert_eq!(settings.base_url.as_deref(), Some("https://ghe.local/api/v3"));
        assert_eq!(settings.token.as_deref(), Some("abc"));
    }

    #[test]
    fn zero_timeout_is_rejected()
    {
        let error = parse_settings("timeout_secs: 0\n",).expect_err("zero timeout",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn malformed_yaml_maps_to_parse_error()
    {
        let error = parse_settings("timeout_secs: [unterminated",).expect_err("bad yaml",);
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn cli_token_overrides_file_token()
    {
        let settings = Settings {
            token: Some("from-file".to_owned(),), ..Settings::default()
        };
        assert_eq!(
            settings.clone().with_token(Some("from-cli".to_owned(),),).token.as_deref(),
            Some("from-cli")
        );
        assert_eq!(settings.clone().with_token(Some("  ".to_owned(),),).token.as_deref(), Some("from-file"));
        assert_eq!(settings.with_token(None,).token.as_deref(), Some("from-file"));
    }

    #[test]
    fn load_settings_reads_file_and_reports_missing()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("gitfo.yaml",);
        fs::write(&path, "timeout_secs: 7\n",).expect("failed to write settings",);

        assert_eq!(load_settings(Some(&path,),).expect("settings",).timeout_secs, 7);
        assert_eq!(load_settings(None,).expect("defaults",), Settings::default());

        let missing = temp.path().join("missing.yaml",);
        assert!(matches!(load_settings(Some(&missing,),), Err(Error::Io { .. })));
    }
}
