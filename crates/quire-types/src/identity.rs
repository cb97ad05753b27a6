use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::names::{validate_document_name, validate_user_name};

/// Identity of a user who owns documents, authors commits, or requests merges.
///
/// Authentication happens outside the engine; a `UserId` is simply a
/// validated name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(name: &str) -> Result<Self, TypeError> {
        validate_user_name(name).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a document, unique per owner.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentName(String);

impl DocumentName {
    pub fn new(name: &str) -> Result<Self, TypeError> {
        validate_document_name(name).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DocumentName> for String {
    fn from(name: DocumentName) -> Self {
        name.0
    }
}

impl fmt::Debug for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentName({})", self.0)
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unique key of a document: `(owner, name)`.
///
/// Commit graph nodes are indexed by `(DocumentRef, CommitId)`, so this key
/// is also how a merge commit refers to a parent in another document's log.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentRef {
    pub owner: UserId,
    pub name: DocumentName,
}

impl DocumentRef {
    pub fn new(owner: UserId, name: DocumentName) -> Self {
        Self { owner, name }
    }

    /// Validate and build a key from raw strings.
    pub fn parse(owner: &str, name: &str) -> Result<Self, TypeError> {
        Ok(Self {
            owner: UserId::new(owner)?,
            name: DocumentName::new(name)?,
        })
    }

    /// The same document name under a different owner (the key of a fork).
    pub fn with_owner(&self, owner: UserId) -> Self {
        Self {
            owner,
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
