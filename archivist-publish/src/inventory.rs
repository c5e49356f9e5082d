//! Versions of a variable already held in the archive.
//!
//! Layout below a variable root: `<state>/<vYYYYMMDD>/<files>`.

use archivist_core::{ArchiveTree, Datestamp, VersionState};
use archivist_dates::{DateRangeCalculator, DateRangeError, Frequency};

use crate::error::PublishError;
use crate::planner::PublicationVersion;

/// Archive directory holding `datestamp` in `state` below `variable_root`.
pub fn version_dir(variable_root: &str, state: VersionState, datestamp: &Datestamp) -> String {
    format!("{variable_root}/{}/{datestamp}", state.dir_name())
}

/// Every non-empty datestamp directory below `variable_root`, with the date
/// range covered by its files.
///
/// Directories whose name is not a datestamp, empty directories, and
/// directories without any data file (e.g. a superseded directory holding
/// only its manifest) are skipped.
pub fn stored_versions(
    tree: &ArchiveTree,
    variable_root: &str,
    frequency: Frequency,
    calculator: &DateRangeCalculator,
) -> Result<Vec<PublicationVersion>, PublishError> {
    let mut versions = Vec::new();

    for state in VersionState::ALL {
        let state_dir = format!("{variable_root}/{}", state.dir_name());
        for record in tree.children(&state_dir).filter(|r| r.is_directory) {
            let Ok(datestamp) = record.name().parse::<Datestamp>() else {
                tracing::debug!("ignoring non-datestamp directory {}", record.path);
                continue;
            };
            if record.is_empty {
                tracing::debug!("ignoring empty version directory {}", record.path);
                continue;
            }

            let files: Vec<String> = tree
                .children(&record.path)
                .filter(|r| !r.is_directory)
                .map(|r| r.path.clone())
                .collect();

            let range = match calculator.date_range(&files, frequency) {
                Ok(range) => range,
                Err(DateRangeError::NoMatchingFiles { .. }) => {
                    tracing::debug!("no data files in {}", record.path);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            versions.push(PublicationVersion {
                datestamp,
                range,
                state,
                files,
            });
        }
    }

    versions.sort_by(|a, b| a.datestamp.cmp(&b.datestamp).then(a.state.cmp(&b.state)));
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archivist_core::Datetime360;

    const ROOT: &str = "moose:/cdds/ap5/Amon/tas";

    fn line(flag: &str, path: &str) -> String {
        format!("{flag} u g 1 0 d t z {ROOT}{path}")
    }

    fn tree() -> ArchiveTree {
        ArchiveTree::from_listing([
            line("D", ""),
            line("D", "/available"),
            line("D", "/available/v20190909"),
            line("F", "/available/v20190909/tas_Amon_M_e_r1i1p1f1_gn_196001-200912.nc"),
            line("F", "/available/v20190909/tas_Amon_M_e_r1i1p1f1_gn_201001-204912.nc"),
            line("D", "/embargoed"),
            line("D", "/embargoed/v20240101"),
            line("D", "/embargoed/scratch"),
            line("F", "/embargoed/scratch/tas_Amon_M_e_r1i1p1f1_gn_201001-204912.nc"),
            line("D", "/superseded"),
            line("D", "/superseded/v20100101"),
            line("F", "/superseded/v20100101/Amon_tas_superseded.log"),
        ])
    }

    #[test]
    fn finds_non_empty_datestamp_directories() {
        let versions =
            stored_versions(&tree(), ROOT, Frequency::Mon, &DateRangeCalculator::default())
                .expect("versions");
        assert_eq!(versions.len(), 1);
        let v = &versions[0];
        assert_eq!(v.state, VersionState::Available);
        assert_eq!(v.datestamp.to_string(), "v20190909");
        assert_eq!(v.files.len(), 2);
        assert_eq!(v.range.start, Datetime360::from_ymd(1960, 1, 1).unwrap());
        assert_eq!(v.range.end, Datetime360::from_ymd(2050, 1, 1).unwrap());
    }

    #[test]
    fn wrong_frequency_is_an_error() {
        let err = stored_versions(&tree(), ROOT, Frequency::Day, &DateRangeCalculator::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PublishError::Dates(DateRangeError::InvalidDatestamp { .. })
        ));
    }

    #[test]
    fn version_dir_layout() {
        let ds: Datestamp = "v20240315".parse().unwrap();
        assert_eq!(
            version_dir(ROOT, VersionState::Embargoed, &ds),
            "moose:/cdds/ap5/Amon/tas/embargoed/v20240315"
        );
    }
}
