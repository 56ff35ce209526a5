use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use isa_core::errors::{ErrorInfo, IsaError};
use isa_core::StudyFactor;
use tracing::debug;

use crate::constants::InterventionType;
use crate::factor::FactorValue;
use crate::scalar::Scalar;
use crate::treatment::Treatment;

/// Normalized set of candidate values for one factor.
///
/// Built from a single scalar or any finite collection of scalars so that
/// [`TreatmentFactory::add_factor_value`] accepts both shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateValues(BTreeSet<Scalar>);

impl CandidateValues {
    /// Returns the normalized set.
    pub fn into_set(self) -> BTreeSet<Scalar> {
        self.0
    }
}

impl From<Scalar> for CandidateValues {
    fn from(value: Scalar) -> Self {
        Self(BTreeSet::from([value]))
    }
}

impl From<&str> for CandidateValues {
    fn from(value: &str) -> Self {
        Scalar::from(value).into()
    }
}

impl From<String> for CandidateValues {
    fn from(value: String) -> Self {
        Scalar::from(value).into()
    }
}

impl From<i64> for CandidateValues {
    fn from(value: i64) -> Self {
        Scalar::from(value).into()
    }
}

impl From<i32> for CandidateValues {
    fn from(value: i32) -> Self {
        Scalar::from(value).into()
    }
}

impl From<f64> for CandidateValues {
    fn from(value: f64) -> Self {
        Scalar::from(value).into()
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for CandidateValues {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for CandidateValues {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Into<Scalar>> From<BTreeSet<T>> for CandidateValues {
    fn from(values: BTreeSet<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Into<Scalar>> From<HashSet<T>> for CandidateValues {
    fn from(values: HashSet<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Into<Scalar>> FromIterator<T> for CandidateValues {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Candidate values registered for one factor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FactorCandidates {
    /// Unit attached to every generated value of this factor.
    pub unit: Option<String>,
    /// Candidate values.
    pub values: BTreeSet<Scalar>,
}

/// Accumulates candidate values per factor and expands them into treatments.
///
/// Factors keep the position of their first registration; values are only
/// ever added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreatmentFactory {
    intervention_type: InterventionType,
    factors: IndexMap<StudyFactor, FactorCandidates>,
}

impl Default for TreatmentFactory {
    fn default() -> Self {
        Self::new(InterventionType::Chemical)
    }
}

impl TreatmentFactory {
    /// Creates an empty factory producing treatments of `intervention_type`.
    pub fn new(intervention_type: InterventionType) -> Self {
        Self {
            intervention_type,
            factors: IndexMap::new(),
        }
    }

    /// Intervention type stamped on every generated treatment.
    pub fn intervention_type(&self) -> InterventionType {
        self.intervention_type
    }

    /// Registered factors in insertion order.
    pub fn factors(&self) -> &IndexMap<StudyFactor, FactorCandidates> {
        &self.factors
    }

    /// Candidate values registered for `factor`.
    pub fn values_for(&self, factor: &StudyFactor) -> Option<&BTreeSet<Scalar>> {
        self.factors.get(factor).map(|entry| &entry.values)
    }

    /// Registers one or more candidate values for `factor`.
    ///
    /// Values are unioned with anything already registered. An empty
    /// collection still registers the factor, which empties the design.
    pub fn add_factor_value(&mut self, factor: StudyFactor, values: impl Into<CandidateValues>) {
        let values = values.into().into_set();
        self.factors.entry(factor).or_default().values.extend(values);
    }

    /// Sets the unit attached to generated values of `factor`.
    ///
    /// Registers the factor if needed; a later call replaces the unit.
    pub fn set_factor_unit(&mut self, factor: StudyFactor, unit: impl Into<String>) {
        self.factors.entry(factor).or_default().unit = Some(unit.into());
    }

    /// Unit attached to generated values of `factor`.
    pub fn factor_unit(&self, factor: &StudyFactor) -> Option<&str> {
        self.factors.get(factor).and_then(|entry| entry.unit.as_deref())
    }

    /// Number of treatments the full factorial design contains.
    pub fn design_size(&self) -> Result<usize, IsaError> {
        self.factors.iter().try_fold(1usize, |acc, (factor, entry)| {
            acc.checked_mul(entry.values.len()).ok_or_else(|| {
                IsaError::Design(
                    ErrorInfo::new(
                        "isa_create.design_size_overflow",
                        "full factorial design size overflows usize",
                    )
                    .with_context("factor", factor.name.clone())
                    .with_context("factors", self.factors.len().to_string()),
                )
            })
        })
    }

    /// Expands the registered candidates into every treatment combination.
    ///
    /// Each treatment holds one value per factor in factor-insertion order.
    /// Any factor without candidates yields the empty set; a factory without
    /// factors yields a single treatment with no factor values.
    pub fn compute_full_factorial_design(&self) -> BTreeSet<Treatment> {
        let mut design = BTreeSet::new();
        let empty = self
            .factors
            .iter()
            .find(|(_, entry)| entry.values.is_empty());
        if let Some((empty, _)) = empty {
            debug!(
                factor = %empty.name,
                "factor has no candidate values, full factorial design is empty"
            );
            return design;
        }
        let mut current = Vec::with_capacity(self.factors.len());
        self.expand(0, &mut current, &mut design);
        debug!(
            intervention = %self.intervention_type,
            factors = self.factors.len(),
            treatments = design.len(),
            "computed full factorial design"
        );
        design
    }

    fn expand(
        &self,
        idx: usize,
        current: &mut Vec<FactorValue>,
        design: &mut BTreeSet<Treatment>,
    ) {
        let Some((factor, entry)) = self.factors.get_index(idx) else {
            design.insert(Treatment::new(self.intervention_type, current.iter().cloned()));
            return;
        };
        for value in &entry.values {
            let factor_value = match &entry.unit {
                Some(unit) => FactorValue::with_unit(factor.clone(), value.clone(), unit),
                None => FactorValue::new(factor.clone(), value.clone()),
            };
            current.push(factor_value);
            self.expand(idx + 1, current, design);
            current.pop();
        }
    }
}
