use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Index of a cross-reference record in the public ledger's record table.
///
/// Assigned monotonically by the public contract at reservation time and
/// immutable afterwards. The authoritative value always comes from the
/// reservation call's own return value, never from a count read beforehand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec#{}", self.0)
    }
}

/// Domain entity identifier: the catalog item a record refers to.
///
/// For Add operations it is assigned by the private ledger after the fact;
/// for Edit operations the caller supplies it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.trim().is_empty() {
            return Err(TypeError::EmptySubject);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, TypeError> {
        Self::parse(&s)
    }
}

impl From<SubjectId> for String {
    fn from(s: SubjectId) -> String {
        s.0
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
