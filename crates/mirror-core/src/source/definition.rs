//! Source definition (serializable) and its compiled form

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Timestamp format used when a definition does not name one.
pub const DEFAULT_MTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn default_mtime_format() -> String {
    DEFAULT_MTIME_FORMAT.to_string()
}

/// Scrape patterns for one kind of listing front-end, as written in config.
///
/// Patterns are regular expressions with named capture groups:
/// - `file_pattern`: `url`, optionally `mtime`
/// - `dir_pattern`: `url`
/// - `name_pattern`: `name`, applied to a resolved file URL
/// - `revision_pattern`: `rev`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_pattern: String,
    pub dir_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_pattern: Option<String>,
    /// chrono format for `mtime` captures, read as UTC
    #[serde(default = "default_mtime_format")]
    pub mtime_format: String,
    /// Appended to a file link to get its raw-content URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_suffix: Option<String>,
}

/// A compiled, immutable source.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    definition: SourceDefinition,
    file_re: Regex,
    dir_re: Regex,
    name_re: Option<Regex>,
    revision_re: Option<Regex>,
}

impl RemoteSource {
    /// Compile a definition, checking that every pattern carries the
    /// capture groups the scraper reads.
    pub fn compile(definition: SourceDefinition) -> Result<Self> {
        mirror_fs::validate_path_identifier(&definition.name, "Source name").map_err(|msg| {
            Error::InvalidSource {
                name: definition.name.clone(),
                message: msg,
            }
        })?;

        let name = definition.name.clone();
        let file_re = compile_pattern(&name, "file_pattern", &definition.file_pattern, "url")?;
        let dir_re = compile_pattern(&name, "dir_pattern", &definition.dir_pattern, "url")?;
        let name_re = definition
            .name_pattern
            .as_deref()
            .map(|p| compile_pattern(&name, "name_pattern", p, "name"))
            .transpose()?;
        let revision_re = definition
            .revision_pattern
            .as_deref()
            .map(|p| compile_pattern(&name, "revision_pattern", p, "rev"))
            .transpose()?;

        Ok(Self {
            definition,
            file_re,
            dir_re,
            name_re,
            revision_re,
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &SourceDefinition {
        &self.definition
    }

    pub fn file_regex(&self) -> &Regex {
        &self.file_re
    }

    pub fn dir_regex(&self) -> &Regex {
        &self.dir_re
    }

    pub fn name_regex(&self) -> Option<&Regex> {
        self.name_re.as_ref()
    }

    pub fn revision_regex(&self) -> Option<&Regex> {
        self.revision_re.as_ref()
    }

    /// Whether pages of this source carry a revision token.
    pub fn tracks_revision(&self) -> bool {
        self.revision_re.is_some()
    }

    pub fn mtime_format(&self) -> &str {
        &self.definition.mtime_format
    }

    pub fn download_suffix(&self) -> Option<&str> {
        self.definition.download_suffix.as_deref()
    }
}

fn compile_pattern(source: &str, field: &str, pattern: &str, group: &str) -> Result<Regex> {
    let re = Regex::new(pattern).map_err(|e| Error::InvalidSource {
        name: source.to_string(),
        message: format!("{field}: {e}"),
    })?;
    if !re.capture_names().flatten().any(|n| n == group) {
        return Err(Error::InvalidSource {
            name: source.to_string(),
            message: format!("{field} has no (?P<{group}>...) capture group"),
        });
    }
    Ok(re)
}
