//! In-memory model of a recursive archive listing.
//!
//! A listing is one line per record, `<type-flag> ... <path>`, where the
//! path is the last whitespace-separated token and a `D` flag marks a
//! directory. Records are keyed by path; a record's parent is a lookup key
//! into the same tree, not an owned reference.

use std::collections::BTreeMap;

/// Type flag that marks a directory in a listing line.
pub const DIRECTORY_FLAG: &str = "D";

/// One record (directory, file, collection) of the remote archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub path: String,
    pub parent: String,
    pub is_directory: bool,
    pub is_empty: bool,
}

impl ArchiveRecord {
    pub fn new(path: &str, is_directory: bool) -> Self {
        let parent = match path.rfind('/') {
            Some(idx) => path[..idx].to_owned(),
            None => String::new(),
        };
        Self {
            path: path.to_owned(),
            parent,
            is_directory,
            // Files, collections and data sets are never empty.
            is_empty: is_directory,
        }
    }

    /// Final path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Loose substring containment, not a segment match.
    pub fn path_contains(&self, needle: &str) -> bool {
        self.path.contains(needle)
    }
}

/// Path-indexed set of [`ArchiveRecord`]s built from one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveTree {
    records: BTreeMap<String, ArchiveRecord>,
}

impl ArchiveTree {
    /// Parse listing lines into records. Blank lines are ignored.
    ///
    /// Emptiness is not derived; see [`ArchiveTree::from_listing`].
    pub fn build<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = BTreeMap::new();
        for line in lines {
            let mut tokens = line.as_ref().split_whitespace();
            let Some(flag) = tokens.next() else {
                continue;
            };
            let path = tokens.last().unwrap_or(flag);
            let record = ArchiveRecord::new(path, flag == DIRECTORY_FLAG);
            records.insert(record.path.clone(), record);
        }
        Self { records }
    }

    /// Build and derive emptiness in one step.
    pub fn from_listing<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::build(lines);
        tree.derive_emptiness();
        tree
    }

    /// Mark every directory with a non-empty descendant as non-empty.
    ///
    /// Records are visited deepest-first (longest path first), so a child is
    /// always settled before its parent and one pass suffices.
    pub fn derive_emptiness(&mut self) {
        let mut paths: Vec<String> = self.records.keys().cloned().collect();
        paths.sort_by(|a, b| b.len().cmp(&a.len()));

        for path in paths {
            let Some(record) = self.records.get_mut(&path) else {
                continue;
            };
            if !record.is_directory {
                record.is_empty = false;
            }
            if record.is_empty {
                continue;
            }
            let parent = record.parent.clone();
            if let Some(parent_record) = self.records.get_mut(&parent) {
                parent_record.is_empty = false;
            }
        }
    }

    /// Union over `needles` of the records whose path contains that needle.
    pub fn filter_by_paths<S: AsRef<str>>(&self, needles: &[S]) -> ArchiveTree {
        let records = self
            .records
            .iter()
            .filter(|(_, r)| needles.iter().any(|n| r.path_contains(n.as_ref())))
            .map(|(k, r)| (k.clone(), r.clone()))
            .collect();
        ArchiveTree { records }
    }

    pub fn get(&self, path: &str) -> Option<&ArchiveRecord> {
        self.records.get(path)
    }

    /// Direct children of `path`, in path order.
    pub fn children<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ArchiveRecord> + 'a {
        self.records.values().filter(move |r| r.parent == path && r.path != path)
    }

    /// Paths of empty directories, deepest first.
    pub fn empty_directories(&self) -> Vec<String> {
        let mut dirs: Vec<String> = self
            .records
            .values()
            .filter(|r| r.is_directory && r.is_empty)
            .map(|r| r.path.clone())
            .collect();
        dirs.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        dirs
    }

    pub fn records(&self) -> impl Iterator<Item = &ArchiveRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
