//! Query catalog - maps (entity, identifier) pairs to fixed query templates
//!
//! Built once at startup and shared read-only. Pattern text is a compile-time
//! constant; the identifier only ever travels as the template's parameter.

use rglookup_core::{CatalogEntry, EntityKind, IdentifierKind};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchMode {
    /// Property equals the parameter.
    Exact,
    /// The parameter is a regular expression the whole property must match.
    Pattern,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryTemplate {
    pub entity: EntityKind,
    pub identifier: IdentifierKind,
    pub pattern: &'static str,
    pub parameter_name: &'static str,
    /// Result column holding the matched node.
    pub column: &'static str,
    /// Name of the JSON array in the response.
    pub result_field: &'static str,
    pub match_mode: MatchMode,
}

impl QueryTemplate {
    /// Property echoed back alongside `key` and `title`.
    pub fn identifier_field(&self) -> &'static str {
        self.identifier.property()
    }

    /// Route path with the identifier as a placeholder.
    pub fn path(&self) -> String {
        format!(
            "/lookup/{}/{}/{{{}}}",
            self.entity.label(),
            self.identifier.property(),
            self.parameter_name
        )
    }
}

const STANDARD: [QueryTemplate; 4] = [
    QueryTemplate {
        entity: EntityKind::Publication,
        identifier: IdentifierKind::Doi,
        pattern: "MATCH (n:publication) WHERE n.doi =~ $doi RETURN n",
        parameter_name: "doi",
        column: "n",
        result_field: "publications",
        match_mode: MatchMode::Pattern,
    },
    QueryTemplate {
        entity: EntityKind::Dataset,
        identifier: IdentifierKind::Doi,
        pattern: "MATCH (n:dataset) WHERE n.doi =~ $doi RETURN n",
        parameter_name: "doi",
        column: "n",
        result_field: "datasets",
        match_mode: MatchMode::Pattern,
    },
    QueryTemplate {
        entity: EntityKind::Grant,
        identifier: IdentifierKind::Purl,
        pattern: "MATCH (n:grant) WHERE n.purl = $purl RETURN n",
        parameter_name: "purl",
        column: "n",
        result_field: "grants",
        match_mode: MatchMode::Exact,
    },
    QueryTemplate {
        entity: EntityKind::Researcher,
        identifier: IdentifierKind::Orcid,
        pattern: "MATCH (n:researcher) WHERE n.orcid = $orcid RETURN n",
        parameter_name: "orcid",
        column: "n",
        result_field: "researchers",
        match_mode: MatchMode::Exact,
    },
];

/// Immutable (entity, identifier) -> template map.
#[derive(Clone, Debug)]
pub struct QueryCatalog {
    templates: BTreeMap<(EntityKind, IdentifierKind), QueryTemplate>,
}

impl QueryCatalog {
    /// The four supported lookups.
    pub fn standard() -> Self {
        Self {
            templates: STANDARD
                .iter()
                .map(|t| ((t.entity, t.identifier), *t))
                .collect(),
        }
    }

    pub fn resolve(&self, entity: EntityKind, identifier: IdentifierKind) -> Option<&QueryTemplate> {
        self.templates.get(&(entity, identifier))
    }

    pub fn templates(&self) -> impl Iterator<Item = &QueryTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.templates()
            .map(|t| CatalogEntry {
                path: t.path(),
                entity: t.entity,
                identifier: t.identifier,
                field: t.result_field.to_string(),
                exact: t.match_mode == MatchMode::Exact,
            })
            .collect()
    }
}

impl Default for QueryCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
