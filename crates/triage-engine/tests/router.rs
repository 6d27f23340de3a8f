mod common;

use std::sync::Arc;

use common::{fixture_dir, fixture_registry, stub_partition, strings, StubClassifier, TestEmbedder};
use triage_core::models::demographics::Sex;
use triage_core::models::features::EncodingStrategy;
use triage_engine::encode::CategoricalEncoder;
use triage_engine::router::{ModelRegistry, Partition, RegistryHandle};
use triage_model::bundle::{bundle_path, ArtifactMetadata};
use triage_model::error::ArtifactLoadError;

#[test]
fn routes_each_sex_to_its_own_partition() {
    let registry = fixture_registry();
    let male = registry.route(Sex::Male);
    let female = registry.route(Sex::Female);

    assert_eq!(male.sex(), Sex::Male);
    assert_eq!(female.sex(), Sex::Female);
    assert!(male.labels().iter().any(|l| l == "Stroke"));
    assert!(!female.labels().iter().any(|l| l == "Stroke"));
    assert_eq!(male.encoder().strategy(), EncodingStrategy::Categorical);
    assert_eq!(registry.partitions().count(), 2);
}

#[test]
fn both_partitions_are_required() {
    let (male, _) = stub_partition(Sex::Male, &["A", "B"], StubClassifier::new(vec![0.5, 0.5]));
    let err = ModelRegistry::from_partitions([male]).err().unwrap();
    assert!(matches!(err, ArtifactLoadError::MissingPartition(Sex::Female)));
}

#[test]
fn missing_bundle_file_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        bundle_path(&fixture_dir(), Sex::Male),
        bundle_path(dir.path(), Sex::Male),
    )
    .unwrap();
    let err = ModelRegistry::load(dir.path(), None).err().unwrap();
    assert!(matches!(err, ArtifactLoadError::Io { .. }));
}

#[test]
fn partition_rejects_encoder_classifier_mismatch() {
    let labels = ["A", "B"];
    let err = Partition::new(
        Sex::Male,
        strings(&labels),
        Box::new(StubClassifier::new(vec![0.5, 0.5, 0.0])),
        Box::new(
            CategoricalEncoder::new(&strings(&[""]), strings(&["low"]), strings(&["male"]))
                .unwrap(),
        ),
        ArtifactMetadata::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, ArtifactLoadError::InvalidClassifier(_)));
}

#[test]
fn semantic_bundle_loads_with_embedder() {
    let dir = tempfile::tempdir().unwrap();
    let weights = vec![vec![0.0; 7]; 2];
    for sex in Sex::ALL {
        let bundle = serde_json::json!({
            "format_version": 1,
            "partition": sex,
            "labels": ["A", "B"],
            "feature_count": 7,
            "encoding": {
                "strategy": "semantic",
                "embedding_dimension": 4,
                "severity_vocabulary": ["high", "low", "medium"],
                "sex_vocabulary": [sex]
            },
            "classifier": { "type": "linear", "weights": weights, "bias": [0.0, 0.0] }
        });
        std::fs::write(bundle_path(dir.path(), sex), bundle.to_string()).unwrap();
    }

    assert!(ModelRegistry::load(dir.path(), None).is_err());

    let registry = ModelRegistry::load(dir.path(), Some(Arc::new(TestEmbedder::new(4)))).unwrap();
    assert_eq!(
        registry.route(Sex::Female).encoder().strategy(),
        EncodingStrategy::Semantic
    );
}

#[test]
fn handle_swaps_registry_without_disturbing_snapshots() {
    let handle = RegistryHandle::new(fixture_registry());
    let before = handle.current();

    let (male, _) = stub_partition(Sex::Male, &["Only"], StubClassifier::new(vec![1.0]));
    let (female, _) = stub_partition(Sex::Female, &["Only"], StubClassifier::new(vec![1.0]));
    let previous = handle.replace(ModelRegistry::from_partitions([male, female]).unwrap());

    assert!(Arc::ptr_eq(&before, &previous));
    assert_eq!(before.route(Sex::Male).labels().len(), 4);
    assert_eq!(handle.current().route(Sex::Male).labels(), ["Only".to_string()]);
}
