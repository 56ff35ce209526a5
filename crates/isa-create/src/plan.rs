use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use isa_core::errors::{ErrorInfo, IsaError};
use isa_core::StudyFactor;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::InterventionType;
use crate::factory::TreatmentFactory;
use crate::hash::stable_hash_string;
use crate::scalar::Scalar;
use crate::sequence::TreatmentSequence;
use crate::serde::{from_yaml_slice, to_yaml_string};

/// One factor of a design plan and its candidate values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorSpec {
    /// Factor name.
    pub name: String,
    /// Factor type term.
    #[serde(rename = "type")]
    pub factor_type: String,
    /// Unit attached to every value of the factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Candidate values.
    #[serde(default)]
    pub values: Vec<Scalar>,
}

impl FactorSpec {
    /// The study factor this entry describes.
    pub fn study_factor(&self) -> StudyFactor {
        StudyFactor::new(self.name.clone(), self.factor_type.clone())
    }
}

/// Declarative description of a full factorial study design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignPlan {
    /// Intervention type of every generated treatment.
    #[serde(default = "DesignPlan::default_intervention_type")]
    pub intervention_type: InterventionType,
    /// Size of the cohort following the design.
    #[serde(default)]
    pub subject_count: u32,
    /// Factors in design order.
    pub factors: Vec<FactorSpec>,
}

impl DesignPlan {
    const fn default_intervention_type() -> InterventionType {
        InterventionType::Chemical
    }

    /// Returns the deterministic hash associated with the plan contents.
    pub fn plan_hash(&self) -> Result<String, IsaError> {
        stable_hash_string(self)
    }

    /// Produces a YAML representation of the plan.
    pub fn to_yaml_string(&self) -> Result<String, IsaError> {
        to_yaml_string(self)
    }

    /// Checks every factor identity.
    ///
    /// A plan must name at least one factor: an empty `factors` list is
    /// treated as a truncated file rather than a one-treatment design. Entries
    /// repeating a factor are merged, so they may not declare different units.
    pub fn validate(&self) -> Result<(), IsaError> {
        if self.factors.is_empty() {
            return Err(IsaError::Serde(
                ErrorInfo::new("isa_create.plan_factors", "design plan declares no factors")
                    .with_hint("add at least one entry under `factors`"),
            ));
        }
        let mut units: BTreeMap<StudyFactor, &str> = BTreeMap::new();
        for entry in &self.factors {
            let factor = entry.study_factor();
            factor.validate()?;
            let Some(unit) = entry.unit.as_deref() else {
                continue;
            };
            match units.get(&factor) {
                Some(previous) if *previous != unit => {
                    return Err(IsaError::Serde(
                        ErrorInfo::new(
                            "isa_create.plan_unit_conflict",
                            "factor is declared with different units",
                        )
                        .with_context("factor", factor.name.clone())
                        .with_context("first", *previous)
                        .with_context("second", unit),
                    ));
                }
                Some(_) => {}
                None => {
                    units.insert(factor, unit);
                }
            }
        }
        Ok(())
    }

    /// Builds a factory holding every factor of the plan.
    pub fn factory(&self) -> Result<TreatmentFactory, IsaError> {
        self.validate()?;
        let mut factory = TreatmentFactory::new(self.intervention_type);
        for entry in &self.factors {
            if entry.values.is_empty() {
                warn!(
                    factor = %entry.name,
                    "factor has no candidate values, the design will be empty"
                );
            }
            let factor = entry.study_factor();
            if let Some(unit) = &entry.unit {
                factory.set_factor_unit(factor.clone(), unit.clone());
            }
            factory.add_factor_value(factor, entry.values.clone());
        }
        Ok(factory)
    }

    /// Sequence administering every treatment of the full factorial at the first rank.
    pub fn full_factorial_sequence(&self) -> Result<TreatmentSequence, IsaError> {
        let design = self.factory()?.compute_full_factorial_design();
        Ok(TreatmentSequence::from_ranked(design)?.with_subject_count(self.subject_count))
    }
}

/// Loads a design plan from a YAML file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<DesignPlan, IsaError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| {
        IsaError::Serde(
            ErrorInfo::new("isa_create.plan_read", err.to_string())
                .with_context("path", plan_path.display().to_string()),
        )
    })?;
    let plan: DesignPlan = from_yaml_slice(&bytes)?;
    plan.validate()?;
    debug!(
        path = %plan_path.display(),
        factors = plan.factors.len(),
        intervention = %plan.intervention_type,
        "loaded design plan"
    );
    Ok(plan)
}
