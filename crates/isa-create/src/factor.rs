use std::fmt;

use isa_core::StudyFactor;
use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// Value taken by a study factor, with an optional unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactorValue {
    factor_name: StudyFactor,
    value: Scalar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
}

impl FactorValue {
    /// Creates a unitless factor value.
    pub fn new(factor_name: StudyFactor, value: impl Into<Scalar>) -> Self {
        Self {
            factor_name,
            value: value.into(),
            unit: None,
        }
    }

    /// Creates a factor value measured in `unit`.
    pub fn with_unit(
        factor_name: StudyFactor,
        value: impl Into<Scalar>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            factor_name,
            value: value.into(),
            unit: Some(unit.into()),
        }
    }

    /// Factor this value belongs to.
    pub fn factor_name(&self) -> &StudyFactor {
        &self.factor_name
    }

    /// The value itself.
    pub fn value(&self) -> &Scalar {
        &self.value
    }

    /// Unit of the value, if any.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

impl fmt::Display for FactorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FactorValue(factor_name={}, value={}, unit={})",
            self.factor_name,
            self.value,
            self.unit.as_deref().unwrap_or("None")
        )
    }
}
