#![deny(missing_docs)]
#![doc = "Study design generation: treatments, full factorial designs and treatment sequences."]

/// Intervention categories and base factor tables.
pub mod constants;
/// Factor values.
pub mod factor;
/// Candidate registration and full factorial expansion.
pub mod factory;
/// Stable hashing helpers.
pub mod hash;
/// Declarative design plans.
pub mod plan;
/// Text and numeric factor values.
pub mod scalar;
/// Ranked treatment sequences.
pub mod sequence;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// Treatments.
pub mod treatment;

pub use constants::{intervention, BaseFactor, InterventionType, BASE_FACTORS, INTERVENTIONS};
pub use factor::FactorValue;
pub use factory::{CandidateValues, FactorCandidates, TreatmentFactory};
pub use hash::{fingerprint, stable_hash_string};
pub use plan::{load_plan, DesignPlan, FactorSpec};
pub use scalar::{Number, Scalar};
pub use sequence::{Rank, RankedTreatments, TreatmentSequence, DEFAULT_RANK};
pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
pub use treatment::Treatment;

pub use isa_core::{ErrorInfo, IsaError, OntologyAnnotation, StudyFactor};
