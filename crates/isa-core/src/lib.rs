#![deny(missing_docs)]
#![doc = "Core metadata model and error types shared by the ISA study-design crates."]

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;

pub use errors::{ErrorInfo, IsaError};

/// Term drawn from a controlled vocabulary, optionally pinned to its source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct OntologyAnnotation {
    /// Human readable term.
    pub term: String,
    /// Name of the ontology the term was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_source: Option<String>,
    /// Accession of the term within its source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_accession: Option<String>,
}

impl OntologyAnnotation {
    /// Creates a free-text annotation without source information.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            term_source: None,
            term_accession: None,
        }
    }

    /// Attaches the ontology source and accession of the term.
    pub fn with_source(
        mut self,
        term_source: impl Into<String>,
        term_accession: impl Into<String>,
    ) -> Self {
        self.term_source = Some(term_source.into());
        self.term_accession = Some(term_accession.into());
        self
    }
}

impl fmt::Display for OntologyAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.term)
    }
}

/// Independent variable of a study design.
///
/// Two factors are the same factor iff their name and type are equal. The type
/// is hashable and totally ordered so it can key both hash and tree maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudyFactor {
    /// Factor name, e.g. `AGENT`.
    pub name: String,
    /// Category of the factor, e.g. `perturbation agent`.
    pub factor_type: OntologyAnnotation,
}

impl StudyFactor {
    /// Creates a factor from a name and a free-text type term.
    pub fn new(name: impl Into<String>, factor_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factor_type: OntologyAnnotation::new(factor_type),
        }
    }

    /// Creates a factor from a name and a full ontology annotation.
    pub fn with_annotation(name: impl Into<String>, factor_type: OntologyAnnotation) -> Self {
        Self {
            name: name.into(),
            factor_type,
        }
    }

    /// Checks that the factor carries a usable name and type.
    pub fn validate(&self) -> Result<(), IsaError> {
        if self.name.trim().is_empty() {
            return Err(IsaError::Model(
                ErrorInfo::new("isa_core.factor_name", "study factor missing name")
                    .with_context("factor_type", self.factor_type.term.clone()),
            ));
        }
        if self.factor_type.term.trim().is_empty() {
            return Err(IsaError::Model(
                ErrorInfo::new("isa_core.factor_type", "study factor missing type")
                    .with_context("name", self.name.clone()),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for StudyFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StudyFactor(name={}, factor_type={})",
            self.name, self.factor_type
        )
    }
}
