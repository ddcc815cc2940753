//! In-memory remote listing trees.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use mirror_core::source::DEFAULT_MTIME_FORMAT;
use mirror_core::{Error, Fetcher, Result, SourceDefinition, SourceRegistry};

/// Name of the source whose pages [`ListingPage`] renders.
pub const FIXTURE_SOURCE: &str = "fixture";

/// Source definition matching the markup [`ListingPage::render`] emits.
pub fn fixture_source() -> SourceDefinition {
    SourceDefinition {
        name: FIXTURE_SOURCE.into(),
        description: Some("test fixture pages".into()),
        file_pattern:
            r#"<a class="file" href="(?P<url>[^"]+)"(?: data-mtime="(?P<mtime>[^"]+)")?>"#.into(),
        dir_pattern: r#"<a class="dir" href="(?P<url>[^"]+)">"#.into(),
        name_pattern: None,
        revision_pattern: Some(r#"<span class="revision">(?P<rev>[^<]+)</span>"#.into()),
        mtime_format: DEFAULT_MTIME_FORMAT.into(),
        download_suffix: None,
    }
}

/// Builtins plus the fixture source.
pub fn fixture_registry() -> SourceRegistry {
    let mut registry = SourceRegistry::with_builtins().unwrap();
    registry.register(fixture_source()).unwrap();
    registry
}

/// Builder for one listing page in the fixture markup.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    revision: Option<String>,
    rows: Vec<String>,
}

impl ListingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(mut self, revision: &str) -> Self {
        self.revision = Some(revision.to_string());
        self
    }

    /// A file row without a modification time.
    pub fn file(mut self, href: &str) -> Self {
        self.rows
            .push(format!(r#"<a class="file" href="{href}">{href}</a>"#));
        self
    }

    /// A file row with a `%Y-%m-%d %H:%M:%S` UTC modification time.
    pub fn file_at(mut self, href: &str, mtime: &str) -> Self {
        self.rows.push(format!(
            r#"<a class="file" href="{href}" data-mtime="{mtime}">{href}</a>"#
        ));
        self
    }

    pub fn dir(mut self, href: &str) -> Self {
        self.rows
            .push(format!(r#"<a class="dir" href="{href}">{href}</a>"#));
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<html><body>\n");
        if let Some(rev) = &self.revision {
            html.push_str(&format!("<span class=\"revision\">{rev}</span>\n"));
        }
        for row in &self.rows {
            html.push_str(row);
            html.push('\n');
        }
        html.push_str("</body></html>\n");
        html
    }
}

/// A remote tree served from memory. Every request is recorded.
///
/// Paths given to the builder are relative to `base`, which should end
/// in `/`; a page for a directory is registered under its path with a
/// trailing slash (`""` for the root).
#[derive(Debug, Default)]
pub struct FakeRemote {
    base: String,
    pages: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    requests: RefCell<Vec<String>>,
}

impl FakeRemote {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            ..Self::default()
        }
    }

    /// Absolute URL for a path under the base.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn page(mut self, path: &str, page: ListingPage) -> Self {
        let url = self.url(path);
        self.pages.insert(url, page.render());
        self
    }

    pub fn file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        let url = self.url(path);
        self.files.insert(url, content.as_ref().to_vec());
        self
    }

    /// Make requests for `path` fail with HTTP 500.
    pub fn failing(mut self, path: &str) -> Self {
        let url = self.url(path);
        self.failing.insert(url);
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// How many times `path` was requested.
    pub fn request_count(&self, path: &str) -> usize {
        let url = self.url(path);
        self.requests.borrow().iter().filter(|r| **r == url).count()
    }

    fn check(&self, url: &str) -> Result<()> {
        self.requests.borrow_mut().push(url.to_string());
        if self.failing.contains(url) {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

impl Fetcher for FakeRemote {
    fn get_text(&self, url: &str) -> Result<String> {
        self.check(url)?;
        self.pages.get(url).cloned().ok_or_else(|| Error::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        self.check(url)?;
        let content = self.files.get(url).ok_or_else(|| Error::HttpStatus {
            url: url.to_string(),
            status: 404,
        })?;
        sink.write_all(content)?;
        Ok(content.len() as u64)
    }
}
