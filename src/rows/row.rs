//! Versioned rows.
//!
//! A row is nothing but up to three record handles; its state is derived
//! from which handles are present and whether original and current point
//! at the same record. State is never stored separately, so it cannot
//! drift from the handles.

use crate::error::{Error, Result};
use crate::rows::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowVersion {
    Original,
    Current,
    Proposed,
    /// Proposed if an edit is open, Current otherwise.
    Default,
}

impl fmt::Display for RowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowState {
    Detached,
    Unchanged,
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub(crate) original: Option<Record>,
    pub(crate) current: Option<Record>,
    pub(crate) proposed: Option<Record>,
}

impl Row {
    pub fn state(&self) -> RowState {
        match (self.original, self.current) {
            (None, None) => RowState::Detached,
            (None, Some(_)) => RowState::Added,
            (Some(_), None) => RowState::Deleted,
            (Some(original), Some(current)) => {
                if original == current && self.proposed.is_none() {
                    RowState::Unchanged
                } else {
                    RowState::Modified
                }
            }
        }
    }

    pub fn record_for_version(&self, version: RowVersion) -> Result<Record> {
        let slot = match version {
            RowVersion::Original => self.original,
            RowVersion::Current => self.current,
            RowVersion::Proposed => self.proposed,
            RowVersion::Default => self.proposed.or(self.current),
        };
        slot.ok_or(Error::VersionNotFound(version))
    }

    pub fn has_version(&self, version: RowVersion) -> bool {
        self.record_for_version(version).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_states() {
        let detached = Row::default();
        assert_eq!(detached.state(), RowState::Detached);

        let added = Row {
            current: Some(Record(0)),
            ..Row::default()
        };
        assert_eq!(added.state(), RowState::Added);

        let unchanged = Row {
            original: Some(Record(0)),
            current: Some(Record(0)),
            proposed: None,
        };
        assert_eq!(unchanged.state(), RowState::Unchanged);

        let modified = Row {
            original: Some(Record(0)),
            current: Some(Record(1)),
            proposed: None,
        };
        assert_eq!(modified.state(), RowState::Modified);

        let deleted = Row {
            original: Some(Record(0)),
            current: None,
            proposed: None,
        };
        assert_eq!(deleted.state(), RowState::Deleted);
    }

    #[test]
    fn test_default_version_prefers_proposed() {
        let mut row = Row {
            original: Some(Record(0)),
            current: Some(Record(0)),
            proposed: None,
        };
        assert_eq!(row.record_for_version(RowVersion::Default), Ok(Record(0)));
        row.proposed = Some(Record(1));
        assert_eq!(row.record_for_version(RowVersion::Default), Ok(Record(1)));
    }

    #[test]
    fn test_missing_version_is_an_error() {
        let added = Row {
            current: Some(Record(0)),
            ..Row::default()
        };
        assert_eq!(
            added.record_for_version(RowVersion::Original),
            Err(Error::VersionNotFound(RowVersion::Original))
        );
        assert!(!added.has_version(RowVersion::Proposed));
        assert!(added.has_version(RowVersion::Default));
    }
}
