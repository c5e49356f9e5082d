//! Removal of empty archive directories.
//!
//! Interrupted runs can leave behind directories that never received a file.
//! [`clean`] lists the archive root once, narrows the tree to the variables of
//! the request, and removes empty directories deepest first.

use archivist_core::{ArchiveTree, RequestDescriptor};
use archivist_transport::ArchiveTransport;

use crate::error::PublishError;

/// Remove the empty directories below the request's variable roots.
///
/// Returns the removed (or, with `simulate`, removable) paths in the order
/// they were handled.
pub fn clean<T: ArchiveTransport + ?Sized>(
    transport: &T,
    request: &RequestDescriptor,
    simulate: bool,
) -> Result<Vec<String>, PublishError> {
    let listing = transport.list(&request.archive_root)?;
    let tree = ArchiveTree::from_listing(&listing);

    let roots: Vec<String> = request
        .variables
        .iter()
        .map(|v| request.variable_root(&v.id))
        .collect();
    let empty = tree.filter_by_paths(&roots).empty_directories();

    for dir in &empty {
        if simulate {
            tracing::info!("[simulate] rmdir {dir}");
        } else {
            transport.remove_dir(dir)?;
            tracing::info!("removed empty directory {dir}");
        }
    }
    if empty.is_empty() {
        tracing::debug!("no empty directories below {}", request.archive_root);
    }
    Ok(empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archivist_core::{VariableEntry, VariableId, DEFAULT_LAYOUT};
    use archivist_transport::{CallKind, MemoryTransport};
    use std::path::PathBuf;

    fn request() -> RequestDescriptor {
        RequestDescriptor {
            archive_root: "moose:/cdds".into(),
            layout: DEFAULT_LAYOUT.into(),
            data_version: None,
            variables: vec![VariableEntry {
                id: VariableId::new("Amon", "tas", "ap5"),
                frequency: "mon".into(),
                output_dir: PathBuf::from("/data/ap5/Amon/tas"),
                republish_withdrawn: false,
            }],
        }
    }

    fn seeded() -> MemoryTransport {
        let t = MemoryTransport::new();
        t.seed_file("moose:/cdds/ap5/Amon/tas/available/v20190909/tas.nc", 10);
        t.seed_dir("moose:/cdds/ap5/Amon/tas/embargoed/v20240101");
        t.seed_dir("moose:/cdds/ap5/Amon/pr/embargoed/v20240101");
        t
    }

    #[test]
    fn removes_empty_directories_of_requested_variables_only() {
        let t = seeded();
        let removed = clean(&t, &request(), false).expect("clean");
        assert_eq!(
            removed,
            vec![
                "moose:/cdds/ap5/Amon/tas/embargoed/v20240101".to_string(),
                "moose:/cdds/ap5/Amon/tas/embargoed".to_string(),
            ]
        );
        assert!(!t.is_dir("moose:/cdds/ap5/Amon/tas/embargoed"));
        assert!(t.is_dir("moose:/cdds/ap5/Amon/pr/embargoed/v20240101"));
        assert!(t.is_file("moose:/cdds/ap5/Amon/tas/available/v20190909/tas.nc"));
    }

    #[test]
    fn simulate_only_lists() {
        let t = seeded();
        let removed = clean(&t, &request(), true).expect("clean");
        assert_eq!(removed.len(), 2);
        assert_eq!(t.count(CallKind::RemoveDir), 0);
        assert!(t.is_dir("moose:/cdds/ap5/Amon/tas/embargoed/v20240101"));
    }
}
