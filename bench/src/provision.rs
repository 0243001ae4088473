//! Idempotent hierarchical path provisioner.
//!
//! Two phases: walk the target path bottom-up, probing existence and queuing
//! every missing level, then create the queued directories top-down so each
//! parent exists before its child. A `SchemeNotFound` probe answer is the
//! expected "needs creation" signal; any other probe failure propagates.

use stratum_link::{Result, SchemeClient};
use tracing::debug;

/// Create every missing intermediate directory so that
/// `database/relative` exists, without touching anything at or above the
/// database root. Calling it again once the path exists performs no
/// creation calls.
pub fn ensure_path_exists<S: SchemeClient>(
    scheme: &S,
    database: &str,
    relative: &str,
) -> Result<()> {
    let database = database.trim_end_matches('/');
    let mut pending: Vec<String> = Vec::new();

    let mut remaining = relative.trim_matches('/');
    while !remaining.is_empty() && remaining != database {
        let full = join(database, remaining);
        match scheme.describe_path(&full) {
            // Everything above this level already exists.
            Ok(_) => break,
            Err(e) if e.is_not_found() => pending.push(full),
            Err(e) => return Err(e),
        }
        remaining = parent(remaining);
    }

    // Parents strictly before children.
    while let Some(dir) = pending.pop() {
        debug!(%dir, "creating namespace directory");
        scheme.make_directory(&dir)?;
    }
    Ok(())
}

/// Join the database root and a relative suffix with a single separator.
pub fn join(database: &str, relative: &str) -> String {
    format!("{}/{}", database.trim_end_matches('/'), relative.trim_matches('/'))
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use stratum_link::{EntryKind, LinkError, SchemeEntry};

    /// Scheme double that records every probe and creation call.
    struct RecordingScheme {
        dirs: RefCell<BTreeSet<String>>,
        probes: RefCell<Vec<String>>,
        creates: RefCell<Vec<String>>,
    }

    impl RecordingScheme {
        fn with_dirs(dirs: &[&str]) -> Self {
            Self {
                dirs: RefCell::new(dirs.iter().map(|s| s.to_string()).collect()),
                probes: RefCell::new(Vec::new()),
                creates: RefCell::new(Vec::new()),
            }
        }

        fn reset_counters(&self) {
            self.probes.borrow_mut().clear();
            self.creates.borrow_mut().clear();
        }
    }

    impl SchemeClient for RecordingScheme {
        fn describe_path(&self, path: &str) -> stratum_link::Result<SchemeEntry> {
            self.probes.borrow_mut().push(path.to_string());
            if self.dirs.borrow().contains(path) {
                Ok(SchemeEntry { path: path.to_string(), kind: EntryKind::Directory })
            } else {
                Err(LinkError::SchemeNotFound(path.to_string()))
            }
        }

        fn make_directory(&self, path: &str) -> stratum_link::Result<()> {
            self.creates.borrow_mut().push(path.to_string());
            self.dirs.borrow_mut().insert(path.to_string());
            Ok(())
        }
    }

    #[test]
    fn bottom_up_discovery_creates_parents_first() {
        let scheme = RecordingScheme::with_dirs(&["/Root", "/Root/a"]);
        ensure_path_exists(&scheme, "/Root", "a/b/c").unwrap();

        assert_eq!(
            *scheme.probes.borrow(),
            vec!["/Root/a/b/c", "/Root/a/b", "/Root/a"]
        );
        assert_eq!(*scheme.creates.borrow(), vec!["/Root/a/b", "/Root/a/b/c"]);
    }

    #[test]
    fn second_invocation_is_a_no_op() {
        let scheme = RecordingScheme::with_dirs(&["/Root"]);
        ensure_path_exists(&scheme, "/Root", "a/b/c").unwrap();
        scheme.reset_counters();

        ensure_path_exists(&scheme, "/Root", "a/b/c").unwrap();
        assert_eq!(scheme.probes.borrow().len(), 1);
        assert!(scheme.creates.borrow().is_empty());
    }

    #[test]
    fn trailing_separators_are_ignored() {
        let scheme = RecordingScheme::with_dirs(&["/Root"]);
        ensure_path_exists(&scheme, "/Root/", "a/b//").unwrap();
        assert_eq!(*scheme.creates.borrow(), vec!["/Root/a", "/Root/a/b"]);
    }

    #[test]
    fn empty_relative_path_does_nothing() {
        let scheme = RecordingScheme::with_dirs(&["/Root"]);
        ensure_path_exists(&scheme, "/Root", "").unwrap();
        assert!(scheme.probes.borrow().is_empty());
        assert!(scheme.creates.borrow().is_empty());
    }

    #[test]
    fn unexpected_probe_failure_propagates() {
        struct FailingScheme;
        impl SchemeClient for FailingScheme {
            fn describe_path(&self, _path: &str) -> stratum_link::Result<SchemeEntry> {
                Err(LinkError::Transient("scheme service overloaded".into()))
            }
            fn make_directory(&self, _path: &str) -> stratum_link::Result<()> {
                unreachable!("must not create after a failed probe")
            }
        }
        let err = ensure_path_exists(&FailingScheme, "/Root", "a/b").unwrap_err();
        assert!(matches!(err, LinkError::Transient(_)));
    }
}
