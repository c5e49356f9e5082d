//! Publication request descriptor (YAML).
//!
//! ```yaml
//! archive_root: moose:/adhoc/projects/cdds/production
//! layout: "{stream}/{table}/{name}"
//! data_version: v20240315
//! variables:
//!   - table: Amon
//!     name: tas
//!     stream: ap5
//!     frequency: mon
//!     output_dir: /data/output/ap5/Amon/tas
//! ```
//!
//! The descriptor is read fresh on every invocation; nothing here is cached.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Datestamp, StreamId, VariableId};

/// Default archive layout below `archive_root`.
pub const DEFAULT_LAYOUT: &str = "{stream}/{table}/{name}";

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_owned()
}

/// One variable to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntry {
    #[serde(flatten)]
    pub id: VariableId,
    /// Output frequency label, e.g. `mon` or `6hrPt`.
    pub frequency: String,
    /// Local directory holding the variable's output files.
    pub output_dir: PathBuf,
    /// Allow a withdrawn version to be extended by appending.
    #[serde(default)]
    pub republish_withdrawn: bool,
}

/// Root of a publication request descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub archive_root: String,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_version: Option<Datestamp>,
    #[serde(default)]
    pub variables: Vec<VariableEntry>,
}

impl RequestDescriptor {
    /// Archive directory of a variable: `<archive_root>/<layout>`.
    pub fn variable_root(&self, id: &VariableId) -> String {
        format!(
            "{}/{}",
            self.archive_root.trim_end_matches('/'),
            id.expand_layout(&self.layout).trim_start_matches('/')
        )
    }

    /// Keep only the variables of `stream`.
    pub fn retain_stream(&mut self, stream: &StreamId) {
        self.variables.retain(|v| &v.id.stream == stream);
    }

    /// The datestamp for this run: `data_version` if set, else today.
    pub fn datestamp(&self) -> Datestamp {
        self.data_version.clone().unwrap_or_else(Datestamp::today)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.archive_root.trim().is_empty() {
            return Err(CoreError::InvalidRequest("archive_root is empty".into()));
        }
        for field in ["{table}", "{name}"] {
            if !self.layout.contains(field) {
                return Err(CoreError::InvalidRequest(format!(
                    "layout '{}' must contain {field}",
                    self.layout
                )));
            }
        }
        Ok(())
    }
}

/// Load a request descriptor from `path`.
///
/// Returns `CoreError::RequestNotFound` if absent,
/// `CoreError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<RequestDescriptor, CoreError> {
    if !path.exists() {
        return Err(CoreError::RequestNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let request: RequestDescriptor =
        serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
    request.validate()?;
    Ok(request)
}
