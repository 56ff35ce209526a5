use std::collections::{BTreeSet, HashSet};

use isa_create::{
    FactorValue, InterventionType, IsaError, Rank, RankedTreatments, Treatment, TreatmentFactory,
    TreatmentSequence, BASE_FACTORS,
};
use serde_json::json;

fn treatment(duration: &str) -> Treatment {
    Treatment::new(
        InterventionType::Chemical,
        vec![
            FactorValue::new(BASE_FACTORS[0].study_factor(), "crack"),
            FactorValue::new(BASE_FACTORS[1].study_factor(), "low"),
            FactorValue::new(BASE_FACTORS[2].study_factor(), duration),
        ],
    )
}

fn invalid_shape(err: &IsaError) -> &str {
    assert!(matches!(err, IsaError::Design(_)));
    assert_eq!(err.info().code, "isa_create.invalid_ranked_treatments");
    err.info().context.get("shape").map(String::as_str).unwrap()
}

#[test]
fn empty_sequence() {
    let sequence = TreatmentSequence::new();
    assert!(sequence.is_empty());
    assert_eq!(sequence.subject_count(), 0);
}

#[test]
fn single_treatment_is_ranked_first() {
    let t = treatment("short");
    let sequence = TreatmentSequence::from_ranked(t.clone()).unwrap();
    assert_eq!(sequence.ranked_treatments(), &BTreeSet::from([(t, 1)]));
}

#[test]
fn unranked_list_is_ranked_first() {
    let treatments = vec![treatment("short"), treatment("long")];
    let sequence = TreatmentSequence::from_ranked(treatments.clone()).unwrap();
    assert!(sequence.contains(&treatments[0], 1));
    assert!(sequence.contains(&treatments[1], 1));
    assert_eq!(sequence.len(), 2);
}

#[test]
fn ranked_pairs_are_kept_regardless_of_order() {
    let (t1, t2) = (treatment("short"), treatment("long"));
    let forward: Vec<(Treatment, Rank)> = vec![(t1.clone(), 2), (t2.clone(), 1)];
    let backward: Vec<(Treatment, Rank)> = vec![(t2.clone(), 1), (t1.clone(), 2)];
    let forward = TreatmentSequence::from_ranked(forward).unwrap();
    let backward = TreatmentSequence::from_ranked(backward).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(
        forward.ranked_treatments(),
        &BTreeSet::from([(t1, 2), (t2, 1)])
    );
}

#[test]
fn existing_set_and_sequence_are_copied() {
    let pairs: HashSet<(Treatment, Rank)> = [(treatment("short"), 1), (treatment("long"), 3)]
        .into_iter()
        .collect();
    let from_set = TreatmentSequence::from_ranked(pairs).unwrap();
    let copy = TreatmentSequence::from_ranked(&from_set).unwrap();
    assert_eq!(copy.ranked_treatments(), from_set.ranked_treatments());
}

#[test]
fn add_treatment_defaults_to_rank_one_and_is_idempotent() {
    let t = treatment("short");
    let mut sequence = TreatmentSequence::new();
    assert!(sequence.add_treatment(t.clone()));
    assert!(!sequence.add_treatment(t.clone()));
    assert_eq!(sequence.ranked_treatments(), &BTreeSet::from([(t, 1)]));
}

#[test]
fn concurrent_and_repeated_administration() {
    let (t1, t2) = (treatment("short"), treatment("long"));
    let mut sequence = TreatmentSequence::new();
    sequence.add_ranked_treatment(t1.clone(), 1).unwrap();
    sequence.add_ranked_treatment(t2.clone(), 1).unwrap();
    sequence.add_ranked_treatment(t1.clone(), 3).unwrap();

    assert_eq!(sequence.len(), 3);
    assert_eq!(sequence.treatments_at(1).count(), 2);
    assert_eq!(sequence.ranks(), BTreeSet::from([1, 3]));
    let schedule = sequence.schedule();
    assert_eq!(schedule.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(schedule[&3], vec![&t1]);
}

#[test]
fn rank_zero_is_rejected() {
    let mut sequence = TreatmentSequence::new();
    let err = sequence
        .add_ranked_treatment(treatment("short"), 0)
        .unwrap_err();
    assert_eq!(invalid_shape(&err), "(treatment, 0) pair");
    assert!(sequence.is_empty());

    let pairs: Vec<(Treatment, Rank)> = vec![(treatment("short"), 0)];
    let err = TreatmentSequence::from_ranked(pairs).unwrap_err();
    assert_eq!(invalid_shape(&err), "(treatment, 0) pair");
}

#[test]
fn setter_replaces_the_whole_set() {
    let (t1, t2) = (treatment("short"), treatment("long"));
    let mut sequence = TreatmentSequence::from_ranked(treatment("medium")).unwrap();
    let pairs: Vec<(Treatment, Rank)> = vec![(t1.clone(), 2), (t2.clone(), 1)];
    sequence.set_ranked_treatments(pairs).unwrap();
    assert_eq!(
        sequence.ranked_treatments(),
        &BTreeSet::from([(t1, 2), (t2, 1)])
    );
}

#[test]
fn setter_accepts_every_construction_shape() {
    let (t1, t2) = (treatment("short"), treatment("long"));
    let mut sequence = TreatmentSequence::from_ranked(treatment("medium"))
        .unwrap()
        .with_subject_count(7);

    sequence.set_ranked_treatments(t1.clone()).unwrap();
    assert_eq!(sequence.ranked_treatments(), &BTreeSet::from([(t1.clone(), 1)]));

    sequence
        .set_ranked_treatments(BTreeSet::from([t1.clone(), t2.clone()]))
        .unwrap();
    assert_eq!(
        sequence.ranked_treatments(),
        &BTreeSet::from([(t1.clone(), 1), (t2.clone(), 1)])
    );

    sequence.set_ranked_treatments([t2.clone()]).unwrap();
    assert_eq!(sequence.ranked_treatments(), &BTreeSet::from([(t2.clone(), 1)]));

    let pairs: Vec<(Treatment, Rank)> = vec![(t1.clone(), 3), (t2.clone(), 2)];
    let other = TreatmentSequence::from_ranked(pairs).unwrap().with_subject_count(99);
    sequence.set_ranked_treatments(&other).unwrap();
    assert_eq!(sequence.ranked_treatments(), other.ranked_treatments());
    assert_eq!(sequence.subject_count(), 7);

    sequence.set_ranked_treatments(RankedTreatments::Empty).unwrap();
    assert!(sequence.is_empty());
    assert_eq!(sequence.subject_count(), 7);
}

#[test]
fn json_setter_takes_ranked_treatments_from_a_serialized_sequence() {
    let (t1, t2) = (treatment("short"), treatment("long"));
    let pairs: Vec<(Treatment, Rank)> = vec![(t1.clone(), 1), (t2.clone(), 2)];
    let source = TreatmentSequence::from_ranked(pairs).unwrap().with_subject_count(3);
    let value = serde_json::to_value(&source).unwrap();

    let mut sequence = TreatmentSequence::new().with_subject_count(40);
    sequence.set_ranked_treatments_json(&value).unwrap();
    assert_eq!(sequence.ranked_treatments(), source.ranked_treatments());
    assert_eq!(sequence.subject_count(), 40);
    assert_eq!(TreatmentSequence::from_json_value(&value).unwrap(), source);

    let t_json = serde_json::to_value(&t1).unwrap();
    let bad = json!({ "ranked_treatments": [[t_json, 0]], "subject_count": 1 });
    let err = sequence.set_ranked_treatments_json(&bad).unwrap_err();
    assert_eq!(
        invalid_shape(&err),
        "object with keys [ranked_treatments, subject_count]"
    );
    assert_eq!(sequence.ranked_treatments(), source.ranked_treatments());
}

#[test]
fn non_finite_values_cannot_be_digested() {
    let dose = FactorValue::new(BASE_FACTORS[1].study_factor(), f64::INFINITY);
    let mut sequence = TreatmentSequence::new();
    sequence.add_treatment(Treatment::new(InterventionType::Chemical, [dose]));
    let err = sequence.digest().unwrap_err();
    assert!(matches!(err, IsaError::Serde(_)));
    assert!(serde_json::to_value(&sequence).is_err());
}

#[test]
fn failed_setter_leaves_sequence_untouched() {
    let t = treatment("short");
    let mut sequence = TreatmentSequence::from_ranked(t.clone()).unwrap();
    let pairs: Vec<(Treatment, Rank)> = vec![(treatment("long"), 0)];
    assert!(sequence.set_ranked_treatments(pairs).is_err());
    assert_eq!(sequence.ranked_treatments(), &BTreeSet::from([(t, 1)]));
}

#[test]
fn subject_count_is_independent_of_treatments() {
    let mut sequence = TreatmentSequence::new().with_subject_count(5);
    sequence.set_subject_count(20);
    assert_eq!(sequence.subject_count(), 20);
    assert!(sequence.is_empty());
}

#[test]
fn full_factorial_feeds_a_sequence() {
    let mut factory = TreatmentFactory::default();
    factory.add_factor_value(BASE_FACTORS[0].study_factor(), ["cocaine", "crack"]);
    factory.add_factor_value(BASE_FACTORS[2].study_factor(), ["short", "long"]);
    let design = factory.compute_full_factorial_design();
    let sequence = TreatmentSequence::from_ranked(design.clone()).unwrap();
    assert_eq!(sequence.len(), design.len());
    assert!(design.iter().all(|t| sequence.contains(t, 1)));
}

#[test]
fn json_shapes_are_normalized() {
    let (t1, t2) = (treatment("short"), treatment("long"));
    let t1_json = serde_json::to_value(&t1).unwrap();
    let t2_json = serde_json::to_value(&t2).unwrap();

    let single = TreatmentSequence::from_json_value(&t1_json).unwrap();
    assert_eq!(single.ranked_treatments(), &BTreeSet::from([(t1.clone(), 1)]));

    let mixed = TreatmentSequence::from_json_value(&json!([
        t1_json.clone(),
        [t2_json.clone(), 2],
        { "treatment": t1_json.clone(), "rank": 4 },
    ]))
    .unwrap();
    assert_eq!(
        mixed.ranked_treatments(),
        &BTreeSet::from([(t1.clone(), 1), (t2.clone(), 2), (t1.clone(), 4)])
    );

    assert!(TreatmentSequence::from_json_value(&json!(null))
        .unwrap()
        .is_empty());
}

#[test]
fn json_sequence_round_trip_keeps_subject_count() {
    let pairs: Vec<(Treatment, Rank)> = vec![(treatment("short"), 2)];
    let mut sequence = TreatmentSequence::from_ranked(pairs)
        .unwrap()
        .with_subject_count(12);
    sequence.add_treatment(treatment("long"));
    let value = serde_json::to_value(&sequence).unwrap();
    let restored = TreatmentSequence::from_json_value(&value).unwrap();
    assert_eq!(restored, sequence);
    assert_eq!(restored.digest().unwrap(), sequence.digest().unwrap());
}

#[test]
fn invalid_json_shapes_are_named() {
    let err = TreatmentSequence::from_json_value(&json!("crack")).unwrap_err();
    assert_eq!(invalid_shape(&err), "string");

    let err = TreatmentSequence::from_json_value(&json!(7)).unwrap_err();
    assert_eq!(invalid_shape(&err), "number 7");

    let err = TreatmentSequence::from_json_value(&json!({ "dose": 5 })).unwrap_err();
    assert_eq!(invalid_shape(&err), "object with keys [dose]");

    let t_json = serde_json::to_value(treatment("short")).unwrap();
    let err = TreatmentSequence::from_json_value(&json!([t_json.clone(), [t_json, -1]]))
        .unwrap_err();
    assert_eq!(invalid_shape(&err), "rank -1");
    assert_eq!(
        err.info().context.get("position").map(String::as_str),
        Some("1")
    );
}

#[test]
fn json_setter_rejects_without_mutation() {
    let t = treatment("short");
    let mut sequence = TreatmentSequence::from_ranked(t.clone()).unwrap();
    let err = sequence
        .set_ranked_treatments_json(&json!([true]))
        .unwrap_err();
    assert_eq!(invalid_shape(&err), "boolean");
    assert_eq!(sequence.ranked_treatments(), &BTreeSet::from([(t, 1)]));

    sequence.set_ranked_treatments_json(&json!([])).unwrap();
    assert!(sequence.is_empty());
}

#[test]
fn ranked_treatments_input_defaults_to_empty() {
    assert_eq!(RankedTreatments::default().normalize().unwrap(), BTreeSet::new());
}
