//! Domain types for archive publication.
//!
//! Archive paths are plain slash-separated strings (they name objects in the
//! remote archive, not the local filesystem). Local data files use `PathBuf`.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A MIP table identifier, e.g. `Amon`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableName(pub String);

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TableName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A variable name inside a table, e.g. `tas`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariableName(pub String);

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for VariableName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A model output stream identifier, e.g. `ap5`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamId(pub String);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identity of one published output variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariableId {
    pub table: TableName,
    pub name: VariableName,
    pub stream: StreamId,
}

impl VariableId {
    pub fn new(table: &str, name: &str, stream: &str) -> Self {
        Self {
            table: TableName::from(table),
            name: VariableName::from(name),
            stream: StreamId::from(stream),
        }
    }

    /// Expand a layout template (`{stream}`, `{table}`, `{name}`) for this variable.
    pub fn expand_layout(&self, layout: &str) -> String {
        layout
            .replace("{stream}", &self.stream.0)
            .replace("{table}", &self.table.0)
            .replace("{name}", &self.name.0)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table, self.name)
    }
}

// ---------------------------------------------------------------------------
// Datestamp
// ---------------------------------------------------------------------------

const DATESTAMP_FORMAT: &str = "v%Y%m%d";

/// A publication version identifier of the form `vYYYYMMDD`.
///
/// Ordering follows the underlying calendar date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Datestamp(NaiveDate);

impl Datestamp {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Datestamp for the current UTC date.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for Datestamp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATESTAMP_FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidDatestamp {
                value: s.to_owned(),
            })
    }
}

impl TryFrom<String> for Datestamp {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Datestamp> for String {
    fn from(d: Datestamp) -> Self {
        d.to_string()
    }
}

impl fmt::Display for Datestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATESTAMP_FORMAT))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(TableName::from("Amon").to_string(), "Amon");
        assert_eq!(VariableName::from("tas").to_string(), "tas");
        assert_eq!(StreamId::from("ap5").to_string(), "ap5");
    }

    #[test]
    fn variable_id_display_is_table_slash_name() {
        let id = VariableId::new("Amon", "tas", "ap5");
        assert_eq!(id.to_string(), "Amon/tas");
    }

    #[test]
    fn expand_layout_substitutes_all_facets() {
        let id = VariableId::new("Amon", "tas", "ap5");
        assert_eq!(id.expand_layout("{stream}/{table}/{name}"), "ap5/Amon/tas");
        assert_eq!(id.expand_layout("fixed/{name}"), "fixed/tas");
    }

    #[test]
    fn datestamp_parse_and_display() {
        let d: Datestamp = "v20190909".parse().expect("parse");
        assert_eq!(d.to_string(), "v20190909");
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2019, 9, 9).unwrap());
    }

    #[test]
    fn datestamp_rejects_malformed_values() {
        for bad in ["20190909", "v2019099", "vabcdefgh", "v20191332", ""] {
            let err = bad.parse::<Datestamp>().unwrap_err();
            assert!(matches!(err, CoreError::InvalidDatestamp { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn datestamp_ordering_follows_date() {
        let a: Datestamp = "v20190909".parse().unwrap();
        let b: Datestamp = "v20191010".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn datestamp_serde_as_string() {
        let d: Datestamp = "v20240315".parse().unwrap();
        let yaml = serde_yaml::to_string(&d).expect("serialize");
        assert_eq!(yaml.trim(), "v20240315");
        let back: Datestamp = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, d);
    }
}
