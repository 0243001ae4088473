use crate::error::Result;

/// What a scheme path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Table,
}

/// A resolved scheme entry.
#[derive(Debug, Clone)]
pub struct SchemeEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl SchemeEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Hierarchical-namespace operations.
///
/// `describe_path` answers existence probes: a missing entry is reported as
/// [`LinkError::SchemeNotFound`](crate::LinkError::SchemeNotFound), which the
/// provisioner treats as "needs creation". `make_directory` fails if the
/// parent directory is absent, so callers must create parents first.
pub trait SchemeClient {
    fn describe_path(&self, path: &str) -> Result<SchemeEntry>;

    fn make_directory(&self, path: &str) -> Result<()>;
}
