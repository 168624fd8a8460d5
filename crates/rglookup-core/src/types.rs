//! Core types for rglookup

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Graph node label classifying what a lookup returns.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Publication,
    Dataset,
    Grant,
    Researcher,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Publication,
        EntityKind::Dataset,
        EntityKind::Grant,
        EntityKind::Researcher,
    ];

    /// The node label, also the path segment.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Publication => "publication",
            Self::Dataset => "dataset",
            Self::Grant => "grant",
            Self::Researcher => "researcher",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == s)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// External identifier scheme.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Doi,
    Purl,
    Orcid,
}

impl IdentifierKind {
    pub const ALL: [IdentifierKind; 3] =
        [IdentifierKind::Doi, IdentifierKind::Purl, IdentifierKind::Orcid];

    /// The node property holding this identifier, also the path segment.
    pub fn property(&self) -> &'static str {
        match self {
            Self::Doi => "doi",
            Self::Purl => "purl",
            Self::Orcid => "orcid",
        }
    }

    pub fn from_property(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.property() == s)
    }

    /// Upper-case name used in user-facing messages ("DOI contains invalid symbols").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Doi => "DOI",
            Self::Purl => "PURL",
            Self::Orcid => "ORCID",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

/// One lookup call. Lives only for the duration of the response.
#[derive(Clone, Debug)]
pub struct LookupRequest {
    /// Log correlation only.
    pub id: Uuid,
    pub entity: EntityKind,
    pub identifier: IdentifierKind,
    /// Already URL-decoded.
    pub raw_value: String,
}

impl LookupRequest {
    pub fn new(entity: EntityKind, identifier: IdentifierKind, raw_value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity,
            identifier,
            raw_value: raw_value.into(),
        }
    }
}
