use std::fmt;

use isa_core::StudyFactor;
use serde::{Deserialize, Serialize};

use crate::constants::InterventionType;
use crate::factor::FactorValue;
use crate::hash::fingerprint;

/// A specific combination of factor values applied to subjects.
///
/// Identity is structural over the intervention type and the factor values
/// *in construction order*: the same values supplied in another order form a
/// different treatment. Duplicate or conflicting factors are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Treatment {
    #[serde(default)]
    treatment_type: InterventionType,
    #[serde(default)]
    factor_values: Vec<FactorValue>,
}

impl Treatment {
    /// Creates a treatment of the given intervention type.
    pub fn new(
        treatment_type: InterventionType,
        factor_values: impl IntoIterator<Item = FactorValue>,
    ) -> Self {
        Self {
            treatment_type,
            factor_values: factor_values.into_iter().collect(),
        }
    }

    /// Creates a treatment tagged with the `NO_TREATMENT` sentinel.
    pub fn untreated(factor_values: impl IntoIterator<Item = FactorValue>) -> Self {
        Self::new(InterventionType::NoTreatment, factor_values)
    }

    /// Intervention category of the treatment.
    pub fn treatment_type(&self) -> InterventionType {
        self.treatment_type
    }

    /// Factor values in construction order.
    pub fn factor_values(&self) -> &[FactorValue] {
        &self.factor_values
    }

    /// First factor value recorded for `factor`.
    pub fn factor_value(&self, factor: &StudyFactor) -> Option<&FactorValue> {
        self.factor_values
            .iter()
            .find(|value| value.factor_name() == factor)
    }

    /// Number of factor values.
    pub fn len(&self) -> usize {
        self.factor_values.len()
    }

    /// Whether the treatment carries no factor values.
    pub fn is_empty(&self) -> bool {
        self.factor_values.is_empty()
    }

    /// Deterministic textual form of the treatment.
    pub fn canonical_form(&self) -> String {
        self.to_string()
    }

    /// Stable 64-bit identifier, equal for equal treatments across processes.
    pub fn fingerprint(&self) -> u64 {
        fingerprint(self)
    }
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Treatment(factor_type={}, factor_values=(", self.treatment_type)?;
        for (idx, value) in self.factor_values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "))")
    }
}
