//! Process-wide constant tables: intervention categories and base factors.

use std::fmt;

use isa_core::StudyFactor;
use serde::{Deserialize, Serialize};

/// Category of intervention a treatment belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionType {
    /// Sentinel for subjects that receive no intervention.
    #[default]
    NoTreatment,
    /// Chemical intervention.
    Chemical,
    /// Behavioural intervention.
    Behavioural,
    /// Surgical intervention.
    Surgical,
    /// Radiological intervention.
    Radiological,
    /// Biological intervention.
    Biological,
    /// Dietary intervention.
    Dietary,
    /// Physical intervention.
    Physical,
    /// Any other intervention.
    Other,
}

impl InterventionType {
    /// Human readable label used in canonical forms.
    pub const fn label(self) -> &'static str {
        match self {
            InterventionType::NoTreatment => "no treatment",
            InterventionType::Chemical => "chemical intervention",
            InterventionType::Behavioural => "behavioural intervention",
            InterventionType::Surgical => "surgical intervention",
            InterventionType::Radiological => "radiological intervention",
            InterventionType::Biological => "biological intervention",
            InterventionType::Dietary => "dietary intervention",
            InterventionType::Physical => "physical intervention",
            InterventionType::Other => "other intervention",
        }
    }
}

impl fmt::Display for InterventionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registered intervention categories keyed by their table name.
pub static INTERVENTIONS: [(&str, InterventionType); 8] = [
    ("CHEMICAL", InterventionType::Chemical),
    ("BEHAVIOURAL", InterventionType::Behavioural),
    ("SURGICAL", InterventionType::Surgical),
    ("RADIOLOGICAL", InterventionType::Radiological),
    ("BIOLOGICAL", InterventionType::Biological),
    ("DIETARY", InterventionType::Dietary),
    ("PHYSICAL", InterventionType::Physical),
    ("OTHER", InterventionType::Other),
];

/// Looks up an intervention category by its table key, e.g. `CHEMICAL`.
pub fn intervention(key: &str) -> Option<InterventionType> {
    INTERVENTIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
}

/// Canonical factor identity used when callers need a default factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseFactor {
    /// Factor name.
    pub name: &'static str,
    /// Factor type term.
    pub factor_type: &'static str,
    /// Whether values of this factor usually carry a unit.
    pub has_unit: bool,
}

impl BaseFactor {
    /// Builds the corresponding study factor.
    pub fn study_factor(&self) -> StudyFactor {
        StudyFactor::new(self.name, self.factor_type)
    }
}

/// The three canonical factors: agent, intensity and duration.
pub static BASE_FACTORS: [BaseFactor; 3] = [
    BaseFactor {
        name: "AGENT",
        factor_type: "perturbation agent",
        has_unit: false,
    },
    BaseFactor {
        name: "INTENSITY",
        factor_type: "intensity",
        has_unit: true,
    },
    BaseFactor {
        name: "DURATION",
        factor_type: "time",
        has_unit: true,
    },
];
