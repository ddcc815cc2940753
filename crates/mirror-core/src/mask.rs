//! Path-shaped file masks
//!
//! A mask such as `lisp/*.el` is split on `/` and each segment is a glob
//! matched against the path segment at the same depth. A mask shorter than
//! the path selects the whole subtree below its last segment.

use std::fmt;
use std::str::FromStr;

use globset::{GlobBuilder, GlobMatcher};
use mirror_fs::NormalizedPath;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct FileMask {
    raw: String,
    segments: Vec<GlobMatcher>,
}

impl FileMask {
    /// Parse a mask. Empty segments are dropped, so `""` and `"/"` match
    /// everything.
    pub fn parse(mask: &str) -> Result<Self> {
        let segments = mask
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                GlobBuilder::new(segment)
                    .literal_separator(true)
                    .build()
                    .map(|g| g.compile_matcher())
                    .map_err(|e| Error::InvalidMask {
                        mask: mask.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: mask.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the mask has no segments and so matches everything.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether a file at the mirror-relative `path` is selected.
    ///
    /// A file must reach at least as deep as the mask.
    pub fn matches_file(&self, path: &NormalizedPath) -> bool {
        let segments: Vec<_> = path.segments().collect();
        segments.len() >= self.segments.len() && self.matches_prefix(&segments)
    }

    /// Whether the directory at `path` may contain selected files, i.e.
    /// whether recursion into it is worthwhile.
    pub fn matches_dir(&self, path: &NormalizedPath) -> bool {
        let segments: Vec<_> = path.segments().collect();
        self.matches_prefix(&segments)
    }

    fn matches_prefix(&self, segments: &[&str]) -> bool {
        self.segments
            .iter()
            .zip(segments)
            .all(|(matcher, segment)| matcher.is_match(segment))
    }
}

impl FromStr for FileMask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FileMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
