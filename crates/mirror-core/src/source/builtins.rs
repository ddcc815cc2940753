//! Built-in source definitions
//!
//! Patterns are configuration data; they are matched against raw page HTML.

use super::{DEFAULT_MTIME_FORMAT, SourceDefinition};

/// Number of built-in sources.
pub const BUILTIN_COUNT: usize = 2;

/// Returns all built-in source definitions.
pub fn builtin_definitions() -> Vec<SourceDefinition> {
    vec![viewvc(), cvsweb()]
}

/// ViewVC directory views. File rows link to the revision log; raw
/// content is served with `view=co`. Listings carry relative ages only,
/// so files are always content-compared.
fn viewvc() -> SourceDefinition {
    SourceDefinition {
        name: "viewvc".into(),
        description: Some("ViewVC repository browser".into()),
        file_pattern: r#"<a name="[^"]*" href="(?P<url>[^"?]*[^/"?])\?view=log""#.into(),
        dir_pattern: r#"<a name="[^"]*" href="(?P<url>[^"?]*/)"#.into(),
        name_pattern: Some(r"/(?P<name>[^/?]+)$".into()),
        revision_pattern: Some(
            r"(?i)(?:sticky\s+)?revision:?\s*(?:<[^>]*>\s*)*(?P<rev>[0-9][0-9.]*)".into(),
        ),
        mtime_format: DEFAULT_MTIME_FORMAT.into(),
        download_suffix: Some("?view=co".into()),
    }
}

/// CVSweb listings with absolute UTC timestamps next to each file.
fn cvsweb() -> SourceDefinition {
    SourceDefinition {
        name: "cvsweb".into(),
        description: Some("CVSweb repository browser".into()),
        file_pattern: concat!(
            r#"<a href="(?P<url>[^"?]*[^/"?])(?:\?[^"]*)?">[^<]*</a>"#,
            r"(?s:.*?)(?P<mtime>\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2})"
        )
        .into(),
        dir_pattern: r#"<a href="(?P<url>[^"?]*/)">"#.into(),
        name_pattern: Some(r"/(?P<name>[^/?]+)$".into()),
        revision_pattern: None,
        mtime_format: "%Y/%m/%d %H:%M:%S".into(),
        download_suffix: Some("?rev=HEAD".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RemoteSource;

    #[test]
    fn all_builtins_compile() {
        for def in builtin_definitions() {
            let name = def.name.clone();
            RemoteSource::compile(def).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn builtin_count_matches() {
        assert_eq!(builtin_definitions().len(), BUILTIN_COUNT);
    }

    #[test]
    fn viewvc_file_pattern_matches_log_link() {
        let source = RemoteSource::compile(viewvc()).unwrap();
        let html = r#"<a name="abbrev.el" href="/viewvc/emacs/lisp/abbrev.el?view=log" title="View file revision log">"#;
        let caps = source.file_regex().captures(html).unwrap();
        assert_eq!(&caps["url"], "/viewvc/emacs/lisp/abbrev.el");
    }

    #[test]
    fn viewvc_revision_pattern_reads_token() {
        let source = RemoteSource::compile(viewvc()).unwrap();
        let caps = source
            .revision_regex()
            .unwrap()
            .captures("<td>Revision: <strong>104823</strong></td>")
            .unwrap();
        assert_eq!(&caps["rev"], "104823");
    }
}
