//! Listing page scraping
//!
//! Turns one listing page into ordered file links, subdirectory links and
//! the page's revision token, using the patterns of a [`RemoteSource`].

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Url;

use crate::source::RemoteSource;
use crate::{Error, Result};

/// A file row on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    /// Logical file name (one path segment)
    pub name: String,
    /// Resolved link as it appears on the page
    pub url: String,
    /// URL the raw content is downloaded from
    pub download_url: String,
    /// Remote modification time, when the page reports one
    pub modified: Option<DateTime<Utc>>,
}

/// A subdirectory row on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirLink {
    /// Directory name (one path segment)
    pub name: String,
    /// Resolved directory URL, always ending in `/`
    pub url: String,
}

/// A link the scraper dropped, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredLink {
    pub url: String,
    pub reason: String,
}

/// Everything scraped from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub files: Vec<FileLink>,
    pub dirs: Vec<DirLink>,
    pub revision: Option<String>,
    pub ignored: Vec<IgnoredLink>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

/// Parse a URL and make sure its path ends in `/`, so that relative links
/// resolve inside it and the prefix check cannot match sibling directories.
pub fn directory_url(url: &str) -> Result<Url> {
    let mut parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

/// Scrape a listing page fetched from `page_url`.
///
/// Links are resolved against `page_url`. Subdirectory links that do not
/// extend the path of `page_url` as a string prefix are ignored, as are duplicate links.
/// Only the first link for a given file name is kept.
pub fn scrape(source: &RemoteSource, page_url: &Url, html: &str) -> Listing {
    let mut listing = Listing {
        revision: extract_revision(source, html),
        ..Listing::default()
    };

    let mut seen = HashSet::new();
    let mut seen_names = HashSet::new();
    for caps in source.file_regex().captures_iter(html) {
        let Some(raw) = caps.name("url") else { continue };
        let Some(url) = resolve(page_url, raw.as_str(), &mut listing) else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let Some(name) = file_name(source, &url) else {
            ignore(&mut listing, &url, "cannot derive a file name");
            continue;
        };
        if let Err(msg) = mirror_fs::validate_path_identifier(&name, "File name") {
            ignore(&mut listing, &url, &msg);
            continue;
        }
        if !seen_names.insert(name.clone()) {
            ignore(&mut listing, &url, "duplicate file name");
            continue;
        }

        let modified = caps
            .name("mtime")
            .and_then(|m| parse_mtime(m.as_str(), source.mtime_format()));
        if caps.name("mtime").is_some() && modified.is_none() {
            tracing::warn!(url = %url, format = source.mtime_format(), "unparseable modification time");
        }

        listing.files.push(FileLink {
            name,
            download_url: with_suffix(&url, source.download_suffix()),
            url,
            modified,
        });
    }

    let mut base_url = page_url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);
    let base = base_url.as_str();
    for caps in source.dir_regex().captures_iter(html) {
        let Some(raw) = caps.name("url") else { continue };
        let Some(url) = resolve(page_url, raw.as_str(), &mut listing) else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let Some(rest) = url.strip_prefix(base) else {
            ignore(&mut listing, &url, "outside the current directory");
            continue;
        };
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let rest = rest.trim_end_matches('/');
        if rest.is_empty() || rest.contains('/') {
            ignore(&mut listing, &url, "not an immediate subdirectory");
            continue;
        }

        let name = decode(rest);
        if let Err(msg) = mirror_fs::validate_path_identifier(&name, "Directory name") {
            ignore(&mut listing, &url, &msg);
            continue;
        }

        let url = match directory_url(&url) {
            Ok(dir_url) => dir_url.to_string(),
            Err(e) => {
                ignore(&mut listing, &url, &e.to_string());
                continue;
            }
        };
        listing.dirs.push(DirLink { name, url });
    }

    tracing::debug!(
        url = %page_url,
        files = listing.files.len(),
        dirs = listing.dirs.len(),
        revision = listing.revision.as_deref().unwrap_or("-"),
        "scraped listing"
    );
    listing
}

/// The revision token on a page, if the source tracks one and it is present.
pub fn extract_revision(source: &RemoteSource, html: &str) -> Option<String> {
    source
        .revision_regex()?
        .captures(html)?
        .name("rev")
        .map(|m| m.as_str().trim().to_string())
        .filter(|rev| !rev.is_empty())
}

fn resolve(page_url: &Url, raw: &str, listing: &mut Listing) -> Option<String> {
    let href = raw.replace("&amp;", "&");
    match page_url.join(&href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            ignore(listing, &href, &format!("unresolvable link: {e}"));
            None
        }
    }
}

fn file_name(source: &RemoteSource, url: &str) -> Option<String> {
    let raw = match source.name_regex() {
        Some(re) => re.captures(url)?.name("name")?.as_str().to_string(),
        None => {
            let path = url.split(['?', '#']).next()?;
            path.rsplit('/').find(|s| !s.is_empty())?.to_string()
        }
    };
    Some(decode(&raw))
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn parse_mtime(raw: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), format)
        .ok()
        .map(|naive| naive.and_utc())
}

fn with_suffix(url: &str, suffix: Option<&str>) -> String {
    match suffix {
        None => url.to_string(),
        Some(s) if url.contains('?') => match s.strip_prefix('?') {
            Some(query) => format!("{url}&{query}"),
            None => format!("{url}{s}"),
        },
        Some(s) => format!("{url}{s}"),
    }
}

fn ignore(listing: &mut Listing, url: &str, reason: &str) {
    tracing::debug!(url, reason, "ignoring link");
    listing.ignored.push(IgnoredLink {
        url: url.to_string(),
        reason: reason.to_string(),
    });
}
