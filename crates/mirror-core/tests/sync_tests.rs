//! Tests for MirrorSync against an in-memory remote

use std::path::Path;
use std::time::Duration;

use mirror_core::{
    Error, FileMask, MirrorEvent, MirrorSync, NoHooks, RevisionLedger, SyncHooks, SyncOptions,
    SyncRequest,
};
use mirror_fs::NormalizedPath;
use mirror_test_utils::{FIXTURE_SOURCE, FakeRemote, ListingPage, TestMirror, fixture_registry};
use pretty_assertions::assert_eq;

const BASE: &str = "http://vcs.test/repo/";
/// 2020-01-01 00:00:00 UTC
const REMOTE_TIME: &str = "2020-01-01 00:00:00";
const REMOTE_SECS: u64 = 1_577_836_800;

fn engine(remote: FakeRemote) -> MirrorSync<FakeRemote> {
    MirrorSync::new(fixture_registry(), remote).with_options(SyncOptions {
        min_interval: Duration::ZERO,
        ..SyncOptions::default()
    })
}

fn request(mirror: &TestMirror) -> SyncRequest {
    SyncRequest::new(FIXTURE_SOURCE, BASE, mirror.root())
}

fn ledger_revision(mirror: &TestMirror) -> Option<String> {
    RevisionLedger::load_or_default(&RevisionLedger::path_for(mirror.root()))
        .unwrap()
        .revision(FIXTURE_SOURCE)
        .map(str::to_string)
}

#[derive(Default)]
struct RecordingHooks {
    events: Vec<MirrorEvent>,
    confirm_answer: bool,
    prompts: Vec<String>,
    reject_reviews: bool,
}

impl SyncHooks for RecordingHooks {
    fn on_event(&mut self, event: &MirrorEvent) {
        self.events.push(event.clone());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.confirm_answer
    }

    fn review_before_accept(&mut self, staged: &Path, _dest: &NormalizedPath) -> bool {
        assert!(staged.exists(), "staged file should exist during review");
        !self.reject_reviews
    }
}

#[test]
fn test_new_files_are_added_with_remote_mtime() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().revision("42").file_at("a.el", REMOTE_TIME))
        .file("a.el", "(provide 'a)");
    let engine = engine(remote);

    let report = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(report.revision.as_deref(), Some("42"));
    assert_eq!(report.added, vec!["a.el".to_string()]);
    assert_eq!(report.replaced(), 1);
    mirror.assert_file("a.el", "(provide 'a)");
    assert_eq!(mirror.mtime("a.el"), REMOTE_SECS);
    assert_eq!(ledger_revision(&mirror).as_deref(), Some("42"));
}

#[test]
fn test_up_to_date_files_are_not_downloaded() {
    let mirror = TestMirror::new();
    mirror.write("newer.el", "local");
    mirror.set_mtime("newer.el", REMOTE_SECS + 60);
    mirror.write("same.el", "local");
    mirror.set_mtime("same.el", REMOTE_SECS);
    mirror.write("skewed.el", "local");
    mirror.set_mtime("skewed.el", REMOTE_SECS - 1);

    let remote = FakeRemote::new(BASE)
        .page(
            "",
            ListingPage::new()
                .file_at("newer.el", REMOTE_TIME)
                .file_at("same.el", REMOTE_TIME)
                .file_at("skewed.el", REMOTE_TIME),
        )
        .file("newer.el", "remote")
        .file("same.el", "remote")
        .file("skewed.el", "remote");
    let engine = engine(remote);

    let report = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(report.up_to_date, 3);
    assert_eq!(report.replaced(), 0);
    assert_eq!(engine.fetcher().requests(), vec![BASE.to_string()]);
    mirror.assert_file("newer.el", "local");
}

#[test]
fn test_stale_file_is_replaced_and_backed_up() {
    let mirror = TestMirror::new();
    mirror.write("lisp/a.el", "old");
    mirror.set_mtime("lisp/a.el", REMOTE_SECS - 3600);

    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().dir("lisp/"))
        .page("lisp/", ListingPage::new().file_at("a.el", REMOTE_TIME))
        .file("lisp/a.el", "new");
    let engine = engine(remote);

    let mut hooks = RecordingHooks::default();
    let report = engine.sync(&request(&mirror), &mut hooks).unwrap();

    assert_eq!(report.updated, vec!["lisp/a.el".to_string()]);
    assert!(report.added.is_empty());
    mirror.assert_file("lisp/a.el", "new");
    mirror.assert_file("lisp/a.el.moved", "old");
    assert!(hooks.events.contains(&MirrorEvent::Updated {
        path: NormalizedPath::new("lisp/a.el"),
        backup: NormalizedPath::new("lisp/a.el.moved"),
    }));
}

#[test]
fn test_identical_content_never_creates_backup() {
    let mirror = TestMirror::new();
    mirror.write("b.el", "same bytes");
    mirror.set_mtime("b.el", REMOTE_SECS - 3600);

    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().file_at("b.el", REMOTE_TIME))
        .file("b.el", "same bytes");
    let engine = engine(remote);

    let report = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(report.unchanged, 1);
    assert_eq!(report.replaced(), 0);
    assert!(mirror.moved_files().is_empty());
    // touched so the next run skips the download
    assert_eq!(mirror.mtime("b.el"), REMOTE_SECS);
    assert_eq!(engine.fetcher().request_count("b.el"), 1);
}

#[test]
fn test_new_file_and_identical_file_without_mtimes() {
    let mirror = TestMirror::new();
    mirror.write("b.el", "B");
    mirror.set_mtime("b.el", 1_000_000);

    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().file("a.el").file("b.el"))
        .file("a.el", "A")
        .file("b.el", "B");
    let engine = engine(remote);

    let report = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(report.replaced(), 1);
    assert_eq!(report.added, vec!["a.el".to_string()]);
    assert_eq!(report.unchanged, 1);
    assert_eq!(mirror.mtime("b.el"), 1_000_000);
    mirror.assert_file("b.el", "B");
    assert!(mirror.moved_files().is_empty());
}

#[test]
fn test_second_run_against_unchanged_remote_replaces_nothing() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page(
            "",
            ListingPage::new()
                .revision("42")
                .file_at("a.el", REMOTE_TIME)
                .file("b.el"),
        )
        .file("a.el", "A")
        .file("b.el", "B");
    let engine = engine(remote);

    let first = engine.sync(&request(&mirror), &mut NoHooks).unwrap();
    assert_eq!(first.replaced(), 2);

    let second = engine.sync(&request(&mirror), &mut NoHooks).unwrap();
    assert_eq!(second.replaced(), 0);
    assert!(second.short_circuited);
    assert_eq!(ledger_revision(&mirror).as_deref(), Some("42"));
}

#[test]
fn test_forced_second_run_downloads_only_files_without_mtime() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page(
            "",
            ListingPage::new()
                .revision("42")
                .file_at("a.el", REMOTE_TIME)
                .file("b.el"),
        )
        .file("a.el", "A")
        .file("b.el", "B");
    let engine = MirrorSync::new(fixture_registry(), remote).with_options(SyncOptions {
        min_interval: Duration::ZERO,
        force: true,
        ..SyncOptions::default()
    });

    engine.sync(&request(&mirror), &mut NoHooks).unwrap();
    let second = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert!(!second.short_circuited);
    assert_eq!(second.replaced(), 0);
    assert_eq!(second.up_to_date, 1);
    assert_eq!(second.unchanged, 1);
    assert_eq!(engine.fetcher().request_count("a.el"), 1);
    assert_eq!(engine.fetcher().request_count("b.el"), 2);
    assert!(mirror.moved_files().is_empty());
    assert_eq!(ledger_revision(&mirror).as_deref(), Some("42"));
}

#[test]
fn test_confirmed_resync_proceeds() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().revision("7").file("a.el"))
        .file("a.el", "A");
    let engine = engine(remote);
    engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    let mut hooks = RecordingHooks {
        confirm_answer: true,
        ..RecordingHooks::default()
    };
    let report = engine.sync(&request(&mirror), &mut hooks).unwrap();

    assert_eq!(hooks.prompts.len(), 1);
    assert!(hooks.prompts[0].contains("revision 7"));
    assert!(!report.short_circuited);
    assert_eq!(report.unchanged, 1);
}

#[test]
fn test_mask_selects_subtree_and_prunes_others() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().dir("docs/").dir("src/"))
        .page("docs/", ListingPage::new().file("a.txt"))
        .page("src/", ListingPage::new().file("b.txt"))
        .file("docs/a.txt", "docs")
        .file("src/b.txt", "src");
    let engine = engine(remote);

    let req = request(&mirror).with_mask(FileMask::parse("docs").unwrap());
    let report = engine.sync(&req, &mut NoHooks).unwrap();

    assert_eq!(report.added, vec!["docs/a.txt".to_string()]);
    assert!(!mirror.exists("src"));
    assert_eq!(engine.fetcher().request_count("src/"), 0);
    assert_eq!(engine.fetcher().request_count("src/b.txt"), 0);
}

#[test]
fn test_mask_skips_files_at_matching_level() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().file("a.el").file("a.elc").file("README"))
        .file("a.el", "A")
        .file("a.elc", "compiled")
        .file("README", "readme");
    let engine = engine(remote);

    let req = request(&mirror).with_mask(FileMask::parse("*.el").unwrap());
    let report = engine.sync(&req, &mut NoHooks).unwrap();

    assert_eq!(report.added, vec!["a.el".to_string()]);
    assert_eq!(report.masked, 2);
    assert_eq!(engine.fetcher().request_count("a.elc"), 0);
}

#[test]
fn test_leftover_moved_file_blocks_sync_without_requests() {
    let mirror = TestMirror::new();
    mirror.write("report.moved", "old");
    let remote = FakeRemote::new(BASE).page("", ListingPage::new().file("a.el"));
    let engine = engine(remote);

    let err = engine.sync(&request(&mirror), &mut NoHooks).unwrap_err();

    match err {
        Error::PendingBackups { files, .. } => {
            assert_eq!(files, vec![mirror.path("report.moved")]);
        }
        other => panic!("expected PendingBackups, got {other}"),
    }
    assert!(engine.fetcher().requests().is_empty());
}

#[test]
fn test_revision_mismatch_aborts_and_leaves_ledger_absent() {
    let mirror = TestMirror::new();
    let mut ledger = RevisionLedger::new();
    ledger.record(FIXTURE_SOURCE, "40", BASE);
    ledger.save(&RevisionLedger::path_for(mirror.root())).unwrap();

    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().revision("42").file("root.el").dir("util/"))
        .page("util/", ListingPage::new().revision("41").file("u.el"))
        .file("root.el", "root")
        .file("util/u.el", "util");
    let engine = engine(remote);

    let err = engine.sync(&request(&mirror), &mut NoHooks).unwrap_err();

    match err {
        Error::RevisionMismatch {
            url,
            expected,
            found,
        } => {
            assert_eq!(url, format!("{BASE}util/"));
            assert_eq!(expected, "42");
            assert_eq!(found, "41");
        }
        other => panic!("expected RevisionMismatch, got {other}"),
    }
    mirror.assert_file("root.el", "root");
    assert!(!mirror.exists("util/u.el"));
    assert_eq!(ledger_revision(&mirror), None);
}

#[test]
fn test_child_without_revision_is_a_mismatch() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().revision("42").dir("util/"))
        .page("util/", ListingPage::new().file("u.el"))
        .file("util/u.el", "util");
    let engine = engine(remote);

    let err = engine.sync(&request(&mirror), &mut NoHooks).unwrap_err();
    assert!(matches!(err, Error::RevisionMismatch { found, .. } if found == "<none>"));
}

#[test]
fn test_root_fetch_failure_keeps_previous_ledger() {
    let mirror = TestMirror::new();
    let mut ledger = RevisionLedger::new();
    ledger.record(FIXTURE_SOURCE, "40", BASE);
    ledger.save(&RevisionLedger::path_for(mirror.root())).unwrap();

    let remote = FakeRemote::new(BASE).failing("");
    let engine = engine(remote);

    let err = engine.sync(&request(&mirror), &mut NoHooks).unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(ledger_revision(&mirror).as_deref(), Some("40"));
}

#[test]
fn test_file_fetch_failure_aborts_after_committed_files() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page(
            "",
            ListingPage::new().revision("9").file("a.el").file("b.el").file("c.el"),
        )
        .file("a.el", "A")
        .failing("b.el")
        .file("c.el", "C");
    let engine = engine(remote);

    let err = engine.sync(&request(&mirror), &mut NoHooks).unwrap_err();

    assert!(matches!(err, Error::HttpStatus { ref url, .. } if url.ends_with("b.el")));
    mirror.assert_file("a.el", "A");
    assert!(!mirror.exists("b.el"));
    assert!(!mirror.exists("c.el"));
    assert_eq!(ledger_revision(&mirror), None);
    let leftovers: Vec<_> = std::fs::read_dir(mirror.root())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty(), "staged downloads left behind");
}

#[test]
fn test_review_hook_can_reject_downloads() {
    let mirror = TestMirror::new();
    mirror.write("a.el", "old");
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().file("a.el").file("b.el"))
        .file("a.el", "new")
        .file("b.el", "B");
    let engine = engine(remote);

    let mut hooks = RecordingHooks {
        reject_reviews: true,
        ..RecordingHooks::default()
    };
    let report = engine.sync(&request(&mirror), &mut hooks).unwrap();

    assert_eq!(report.rejected, 2);
    assert_eq!(report.replaced(), 0);
    mirror.assert_file("a.el", "old");
    assert!(!mirror.exists("b.el"));
    assert!(mirror.moved_files().is_empty());
}

#[test]
fn test_same_file_name_listed_twice_is_fetched_once() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().file("a.el").file("a.el?rev=2"))
        .file("a.el", "A")
        .file("a.el?rev=2", "B");
    let engine = engine(remote);

    let report = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(report.added, vec!["a.el".to_string()]);
    assert!(report.updated.is_empty());
    mirror.assert_file("a.el", "A");
    assert!(mirror.moved_files().is_empty());
    assert_eq!(engine.fetcher().request_count("a.el?rev=2"), 0);

    let second = engine.sync(&request(&mirror), &mut NoHooks).unwrap();
    assert_eq!(second.replaced(), 0);
    assert!(mirror.moved_files().is_empty());
}

#[test]
fn test_directory_links_with_query_are_followed() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().dir("sub/?pathrev=5"))
        .page(
            "sub/?pathrev=5",
            ListingPage::new().file("u.el").dir("deeper/?pathrev=5"),
        )
        .page("sub/deeper/?pathrev=5", ListingPage::new().file("v.el"))
        .file("sub/u.el", "U")
        .file("sub/deeper/v.el", "V");
    let engine = engine(remote);

    let report = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(
        report.added,
        vec!["sub/u.el".to_string(), "sub/deeper/v.el".to_string()]
    );
    mirror.assert_file("sub/u.el", "U");
    mirror.assert_file("sub/deeper/v.el", "V");
    assert_eq!(engine.fetcher().request_count("sub/?pathrev=5"), 1);
    assert_eq!(engine.fetcher().request_count("sub/deeper/?pathrev=5"), 1);
}

#[test]
fn test_non_recursive_sync_stays_at_root() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().file("a.el").dir("lisp/"))
        .page("lisp/", ListingPage::new().file("b.el"))
        .file("a.el", "A")
        .file("lisp/b.el", "B");
    let engine = engine(remote);

    let report = engine
        .sync(&request(&mirror).recursive(false), &mut NoHooks)
        .unwrap();

    assert_eq!(report.added, vec!["a.el".to_string()]);
    assert_eq!(engine.fetcher().request_count("lisp/"), 0);
}

#[test]
fn test_root_page_is_fetched_once() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().revision("1").file("a.el"))
        .file("a.el", "A");
    let engine = engine(remote);

    engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(engine.fetcher().request_count(""), 1);
}

#[test]
fn test_empty_listing_is_not_an_error() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE).page("", ListingPage::new());
    let engine = engine(remote);

    let report = engine.sync(&request(&mirror), &mut NoHooks).unwrap();

    assert_eq!(report.replaced(), 0);
    assert_eq!(report.revision, None);
    assert_eq!(ledger_revision(&mirror), None);
}

#[test]
fn test_remote_names_colliding_with_bookkeeping_are_ignored() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page(
            "",
            ListingPage::new().file("trap.moved").file(".mirror-ledger.toml"),
        )
        .file("trap.moved", "x")
        .file(".mirror-ledger.toml", "x");
    let engine = engine(remote);

    let mut hooks = RecordingHooks::default();
    let report = engine.sync(&request(&mirror), &mut hooks).unwrap();

    assert_eq!(report.replaced(), 0);
    assert!(!mirror.exists("trap.moved"));
    let ignored = hooks
        .events
        .iter()
        .filter(|e| matches!(e, MirrorEvent::Ignored { .. }))
        .count();
    assert_eq!(ignored, 2);
}

#[test]
fn test_unknown_source_is_config_error() {
    let mirror = TestMirror::new();
    let engine = engine(FakeRemote::new(BASE));

    let req = SyncRequest::new("nonexistent", BASE, mirror.root());
    let err = engine.sync(&req, &mut NoHooks).unwrap_err();

    assert!(matches!(err, Error::UnknownSource { .. }));
    assert!(engine.fetcher().requests().is_empty());
}

#[test]
fn test_relative_root_is_rejected() {
    let engine = engine(FakeRemote::new(BASE));
    let req = SyncRequest::new(FIXTURE_SOURCE, BASE, "relative/mirror");

    let err = engine.sync(&req, &mut NoHooks).unwrap_err();
    assert!(matches!(err, Error::InvalidRoot { .. }));
}

#[test]
fn test_missing_root_directory_is_created() {
    let mirror = TestMirror::new();
    let remote = FakeRemote::new(BASE)
        .page("", ListingPage::new().file("a.el"))
        .file("a.el", "A");
    let engine = engine(remote);

    let req = SyncRequest::new(FIXTURE_SOURCE, BASE, mirror.path("nested/root"));
    engine.sync(&req, &mut NoHooks).unwrap();

    mirror.assert_file("nested/root/a.el", "A");
}
