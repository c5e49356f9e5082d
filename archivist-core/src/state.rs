//! Publication lifecycle of an archived version.
//!
//! Every allowed edge lives in [`VersionState::predecessors`]; callers ask
//! [`can_transition`] rather than matching on state pairs themselves.
//!
//! | state      | can_be_put | inform | valid predecessors     |
//! |------------|------------|--------|------------------------|
//! | Embargoed  | yes        | no     | none (initial only)    |
//! | Available  | no         | yes    | Embargoed, Withdrawn   |
//! | Withdrawn  | no         | yes    | Available, Superseded  |
//! | Superseded | no         | no     | Available              |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of one published version of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionState {
    Embargoed,
    Available,
    Withdrawn,
    Superseded,
}

impl VersionState {
    pub const ALL: [VersionState; 4] = [
        VersionState::Embargoed,
        VersionState::Available,
        VersionState::Withdrawn,
        VersionState::Superseded,
    ];

    /// Whether new files may be written into a version in this state.
    pub fn can_be_put(self) -> bool {
        matches!(self, VersionState::Embargoed)
    }

    /// Whether entering this state must be announced downstream.
    pub fn inform(self) -> bool {
        matches!(self, VersionState::Available | VersionState::Withdrawn)
    }

    /// States from which this state may be entered.
    pub fn predecessors(self) -> &'static [VersionState] {
        match self {
            VersionState::Embargoed => &[],
            VersionState::Available => &[VersionState::Embargoed, VersionState::Withdrawn],
            VersionState::Withdrawn => &[VersionState::Available, VersionState::Superseded],
            VersionState::Superseded => &[VersionState::Available],
        }
    }

    /// Directory name used for this state in the archive layout.
    pub fn dir_name(self) -> &'static str {
        match self {
            VersionState::Embargoed => "embargoed",
            VersionState::Available => "available",
            VersionState::Withdrawn => "withdrawn",
            VersionState::Superseded => "superseded",
        }
    }
}

/// `true` iff `from` is a valid predecessor of `to`.
pub fn can_transition(from: VersionState, to: VersionState) -> bool {
    to.predecessors().contains(&from)
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for VersionState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "embargoed" => Ok(VersionState::Embargoed),
            "available" => Ok(VersionState::Available),
            "withdrawn" => Ok(VersionState::Withdrawn),
            "superseded" => Ok(VersionState::Superseded),
            other => Err(CoreError::UnknownState(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn only_embargoed_accepts_writes() {
        let writable: Vec<_> = VersionState::ALL
            .into_iter()
            .filter(|s| s.can_be_put())
            .collect();
        assert_eq!(writable, vec![VersionState::Embargoed]);
    }

    #[rstest]
    #[case(VersionState::Embargoed, false)]
    #[case(VersionState::Available, true)]
    #[case(VersionState::Withdrawn, true)]
    #[case(VersionState::Superseded, false)]
    fn inform_flags(#[case] state: VersionState, #[case] announced: bool) {
        assert_eq!(state.inform(), announced, "{state}");
    }

    #[test]
    fn transition_table() {
        use VersionState::*;
        let allowed = [
            (Embargoed, Available),
            (Withdrawn, Available),
            (Available, Withdrawn),
            (Superseded, Withdrawn),
            (Available, Superseded),
        ];
        for from in VersionState::ALL {
            for to in VersionState::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(can_transition(from, to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn embargoed_is_never_re_entered() {
        for from in VersionState::ALL {
            assert!(!can_transition(from, VersionState::Embargoed));
        }
    }

    #[test]
    fn dir_name_round_trips_through_from_str() {
        for state in VersionState::ALL {
            assert_eq!(state.dir_name().parse::<VersionState>().unwrap(), state);
        }
        assert!(matches!(
            "published".parse::<VersionState>(),
            Err(CoreError::UnknownState(_))
        ));
    }
}
