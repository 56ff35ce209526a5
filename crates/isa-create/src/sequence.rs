use std::collections::{BTreeMap, BTreeSet, HashSet};

use isa_core::errors::{ErrorInfo, IsaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::hash::stable_hash_string;
use crate::treatment::Treatment;

/// Ordinal administration position; equal ranks run concurrently.
pub type Rank = u32;

/// Rank assigned to treatments supplied without one.
pub const DEFAULT_RANK: Rank = 1;

const INVALID_INPUT: &str = "isa_create.invalid_ranked_treatments";

fn invalid_info(shape: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(INVALID_INPUT, "invalid ranked-treatments input")
        .with_context("shape", shape)
        .with_hint("expected a treatment, a (treatment, rank) pair, or a collection of them")
}

fn invalid_input(shape: impl Into<String>) -> IsaError {
    IsaError::Design(invalid_info(shape))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(number) => format!("number {number}"),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of length {}", items.len()),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
    }
}

/// Any accepted shape of ranked-treatments input, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RankedTreatments {
    /// No treatments.
    #[default]
    Empty,
    /// A single treatment, ranked first.
    Single(Treatment),
    /// Treatments without ranks, each ranked first.
    Unranked(Vec<Treatment>),
    /// Explicit (treatment, rank) pairs.
    Ranked(Vec<(Treatment, Rank)>),
}

impl RankedTreatments {
    /// Normalizes the input into a set of (treatment, rank) pairs.
    pub fn normalize(self) -> Result<BTreeSet<(Treatment, Rank)>, IsaError> {
        match self {
            RankedTreatments::Empty => Ok(BTreeSet::new()),
            RankedTreatments::Single(treatment) => Ok(BTreeSet::from([(treatment, DEFAULT_RANK)])),
            RankedTreatments::Unranked(treatments) => Ok(treatments
                .into_iter()
                .map(|treatment| (treatment, DEFAULT_RANK))
                .collect()),
            RankedTreatments::Ranked(pairs) => {
                if pairs.iter().any(|(_, rank)| *rank == 0) {
                    return Err(invalid_input("(treatment, 0) pair"));
                }
                Ok(pairs.into_iter().collect())
            }
        }
    }

    /// Interprets dynamically shaped JSON input.
    ///
    /// Accepts `null`, a treatment object, or an array whose items are
    /// treatment objects, `[treatment, rank]` pairs or `{"treatment", "rank"}`
    /// objects. Anything else is rejected, naming the offending shape.
    pub fn from_json(value: &Value) -> Result<Self, IsaError> {
        match value {
            Value::Null => Ok(RankedTreatments::Empty),
            Value::Object(_) => match json_item(value).map_err(IsaError::Design)? {
                (treatment, None) => Ok(RankedTreatments::Single(treatment)),
                (treatment, Some(rank)) => Ok(RankedTreatments::Ranked(vec![(treatment, rank)])),
            },
            Value::Array(items) => {
                let mut pairs = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    let (treatment, rank) = json_item(item).map_err(|info| {
                        IsaError::Design(info.with_context("position", position.to_string()))
                    })?;
                    pairs.push((treatment, rank.unwrap_or(DEFAULT_RANK)));
                }
                Ok(RankedTreatments::Ranked(pairs))
            }
            other => Err(invalid_input(describe(other))),
        }
    }
}

fn json_treatment(value: &Value) -> Result<Treatment, ErrorInfo> {
    let looks_like_treatment = value
        .as_object()
        .is_some_and(|map| map.contains_key("treatment_type") || map.contains_key("factor_values"));
    if !looks_like_treatment {
        return Err(invalid_info(describe(value)));
    }
    serde_json::from_value(value.clone())
        .map_err(|err| invalid_info(describe(value)).with_context("detail", err.to_string()))
}

fn json_rank(value: &Value) -> Result<Rank, ErrorInfo> {
    value
        .as_u64()
        .filter(|rank| *rank > 0)
        .and_then(|rank| Rank::try_from(rank).ok())
        .ok_or_else(|| invalid_info(format!("rank {value}")))
}

fn json_item(value: &Value) -> Result<(Treatment, Option<Rank>), ErrorInfo> {
    match value {
        Value::Array(pair) if pair.len() == 2 => {
            Ok((json_treatment(&pair[0])?, Some(json_rank(&pair[1])?)))
        }
        Value::Object(map) => match map.get("treatment") {
            Some(treatment) => {
                let rank = match map.get("rank") {
                    Some(rank) => json_rank(rank)?,
                    None => DEFAULT_RANK,
                };
                Ok((json_treatment(treatment)?, Some(rank)))
            }
            None => Ok((json_treatment(value)?, None)),
        },
        other => Err(invalid_info(describe(other))),
    }
}

impl From<Treatment> for RankedTreatments {
    fn from(treatment: Treatment) -> Self {
        RankedTreatments::Single(treatment)
    }
}

impl From<Vec<Treatment>> for RankedTreatments {
    fn from(treatments: Vec<Treatment>) -> Self {
        RankedTreatments::Unranked(treatments)
    }
}

impl<const N: usize> From<[Treatment; N]> for RankedTreatments {
    fn from(treatments: [Treatment; N]) -> Self {
        RankedTreatments::Unranked(treatments.into())
    }
}

impl From<BTreeSet<Treatment>> for RankedTreatments {
    fn from(treatments: BTreeSet<Treatment>) -> Self {
        RankedTreatments::Unranked(treatments.into_iter().collect())
    }
}

impl From<Vec<(Treatment, Rank)>> for RankedTreatments {
    fn from(pairs: Vec<(Treatment, Rank)>) -> Self {
        RankedTreatments::Ranked(pairs)
    }
}

impl<const N: usize> From<[(Treatment, Rank); N]> for RankedTreatments {
    fn from(pairs: [(Treatment, Rank); N]) -> Self {
        RankedTreatments::Ranked(pairs.into())
    }
}

impl From<BTreeSet<(Treatment, Rank)>> for RankedTreatments {
    fn from(pairs: BTreeSet<(Treatment, Rank)>) -> Self {
        RankedTreatments::Ranked(pairs.into_iter().collect())
    }
}

impl From<HashSet<(Treatment, Rank)>> for RankedTreatments {
    fn from(pairs: HashSet<(Treatment, Rank)>) -> Self {
        RankedTreatments::Ranked(pairs.into_iter().collect())
    }
}

impl From<TreatmentSequence> for RankedTreatments {
    fn from(sequence: TreatmentSequence) -> Self {
        RankedTreatments::Ranked(sequence.ranked_treatments.into_iter().collect())
    }
}

impl From<&TreatmentSequence> for RankedTreatments {
    fn from(sequence: &TreatmentSequence) -> Self {
        RankedTreatments::Ranked(sequence.ranked_treatments.iter().cloned().collect())
    }
}

/// Reads a serialized sequence, or `None` when `value` has another shape.
fn json_sequence(value: &Value) -> Result<Option<TreatmentSequence>, IsaError> {
    let is_record = value
        .as_object()
        .is_some_and(|map| map.contains_key("ranked_treatments"));
    if !is_record {
        return Ok(None);
    }
    serde_json::from_value(value.clone()).map(Some).map_err(|err| {
        IsaError::Design(invalid_info(describe(value)).with_context("detail", err.to_string()))
    })
}

#[derive(Deserialize)]
struct SequenceRecord {
    #[serde(default)]
    ranked_treatments: Vec<(Treatment, Rank)>,
    #[serde(default)]
    subject_count: u32,
}

impl TryFrom<SequenceRecord> for TreatmentSequence {
    type Error = IsaError;

    fn try_from(record: SequenceRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            ranked_treatments: RankedTreatments::Ranked(record.ranked_treatments).normalize()?,
            subject_count: record.subject_count,
        })
    }
}

/// Administration plan for a cohort: ranked treatments plus the cohort size.
///
/// Ranks carry no uniqueness constraint. Several treatments at one rank are
/// given concurrently; one treatment at several ranks is given repeatedly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SequenceRecord")]
pub struct TreatmentSequence {
    ranked_treatments: BTreeSet<(Treatment, Rank)>,
    subject_count: u32,
}

impl TreatmentSequence {
    /// Creates an empty sequence for an empty cohort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence from any accepted ranked-treatments shape.
    pub fn from_ranked(input: impl Into<RankedTreatments>) -> Result<Self, IsaError> {
        Ok(Self {
            ranked_treatments: input.into().normalize()?,
            subject_count: 0,
        })
    }

    /// Creates a sequence from JSON: a serialized sequence or any ranked-treatments shape.
    pub fn from_json_value(value: &Value) -> Result<Self, IsaError> {
        match json_sequence(value)? {
            Some(sequence) => Ok(sequence),
            None => Self::from_ranked(RankedTreatments::from_json(value)?),
        }
    }

    /// Sets the cohort size.
    pub fn with_subject_count(mut self, subject_count: u32) -> Self {
        self.subject_count = subject_count;
        self
    }

    /// The normalized set of (treatment, rank) pairs.
    pub fn ranked_treatments(&self) -> &BTreeSet<(Treatment, Rank)> {
        &self.ranked_treatments
    }

    /// Replaces every ranked treatment. The sequence is untouched on error.
    pub fn set_ranked_treatments(
        &mut self,
        input: impl Into<RankedTreatments>,
    ) -> Result<(), IsaError> {
        let ranked = input.into().normalize()?;
        debug!(
            previous = self.ranked_treatments.len(),
            replacement = ranked.len(),
            "replacing ranked treatments"
        );
        self.ranked_treatments = ranked;
        Ok(())
    }

    /// Replaces every ranked treatment from dynamically shaped JSON input.
    ///
    /// A serialized sequence contributes only its ranked treatments; the
    /// subject count stays as it is.
    pub fn set_ranked_treatments_json(&mut self, value: &Value) -> Result<(), IsaError> {
        match json_sequence(value)? {
            Some(sequence) => self.set_ranked_treatments(sequence),
            None => self.set_ranked_treatments(RankedTreatments::from_json(value)?),
        }
    }

    /// Adds `treatment` at the first rank. Returns whether the pair was new.
    pub fn add_treatment(&mut self, treatment: Treatment) -> bool {
        self.ranked_treatments.insert((treatment, DEFAULT_RANK))
    }

    /// Adds `treatment` at `rank`. Returns whether the pair was new.
    pub fn add_ranked_treatment(
        &mut self,
        treatment: Treatment,
        rank: Rank,
    ) -> Result<bool, IsaError> {
        if rank == 0 {
            return Err(invalid_input("(treatment, 0) pair"));
        }
        Ok(self.ranked_treatments.insert((treatment, rank)))
    }

    /// Whether `treatment` is administered at `rank`.
    pub fn contains(&self, treatment: &Treatment, rank: Rank) -> bool {
        self.ranked_treatments
            .iter()
            .any(|(candidate, candidate_rank)| *candidate_rank == rank && candidate == treatment)
    }

    /// Treatments administered at `rank`.
    pub fn treatments_at(&self, rank: Rank) -> impl Iterator<Item = &Treatment> + '_ {
        self.ranked_treatments
            .iter()
            .filter(move |(_, candidate)| *candidate == rank)
            .map(|(treatment, _)| treatment)
    }

    /// Distinct ranks in use.
    pub fn ranks(&self) -> BTreeSet<Rank> {
        self.ranked_treatments.iter().map(|(_, rank)| *rank).collect()
    }

    /// Treatments grouped by ascending rank.
    pub fn schedule(&self) -> BTreeMap<Rank, Vec<&Treatment>> {
        let mut schedule: BTreeMap<Rank, Vec<&Treatment>> = BTreeMap::new();
        for (treatment, rank) in &self.ranked_treatments {
            schedule.entry(*rank).or_default().push(treatment);
        }
        schedule
    }

    /// Number of (treatment, rank) pairs.
    pub fn len(&self) -> usize {
        self.ranked_treatments.len()
    }

    /// Whether the sequence holds no treatments.
    pub fn is_empty(&self) -> bool {
        self.ranked_treatments.is_empty()
    }

    /// Size of the cohort following this plan.
    pub fn subject_count(&self) -> u32 {
        self.subject_count
    }

    /// Sets the size of the cohort following this plan.
    pub fn set_subject_count(&mut self, subject_count: u32) {
        self.subject_count = subject_count;
    }

    /// Stable SHA256 digest of the sequence contents.
    pub fn digest(&self) -> Result<String, IsaError> {
        stable_hash_string(self)
    }
}
