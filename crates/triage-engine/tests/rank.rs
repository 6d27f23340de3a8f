mod common;

use common::strings;
use triage_engine::error::InferenceError;
use triage_engine::rank::{format_confidence, RankingAssembler};

#[test]
fn sorts_descending_and_keeps_label_order_on_ties() {
    let labels = strings(&["A", "B", "C", "D"]);
    let ranked = RankingAssembler::new(5)
        .rank(&labels, &[0.2, 0.4, 0.2, 0.2])
        .unwrap();

    let order: Vec<&str> = ranked.iter().map(|r| r.condition.as_str()).collect();
    assert_eq!(order, vec!["B", "A", "C", "D"]);
    assert!(ranked.windows(2).all(|w| w[0].probability >= w[1].probability));
    assert_eq!(ranked[0].label_index, 1);
}

#[test]
fn top_k_is_clamped() {
    let labels = strings(&["A", "B", "C"]);
    let probs = [0.5, 0.3, 0.2];
    assert_eq!(RankingAssembler::new(2).rank(&labels, &probs).unwrap().len(), 2);
    assert_eq!(RankingAssembler::new(10).rank(&labels, &probs).unwrap().len(), 3);
    assert_eq!(RankingAssembler::new(0).rank(&labels, &probs).unwrap().len(), 1);
}

#[test]
fn rejects_wrong_length() {
    let err = RankingAssembler::default()
        .rank(&strings(&["A", "B"]), &[1.0])
        .unwrap_err();
    assert!(matches!(
        err,
        InferenceError::LabelMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn rejects_distributions_that_do_not_sum_to_one() {
    let labels = strings(&["A", "B"]);
    assert!(matches!(
        RankingAssembler::default().rank(&labels, &[0.5, 0.4]),
        Err(InferenceError::InvalidDistribution(_))
    ));
    assert!(matches!(
        RankingAssembler::default().rank(&labels, &[f64::NAN, 1.0]),
        Err(InferenceError::InvalidDistribution(_))
    ));
    // Within tolerance.
    assert!(RankingAssembler::default().rank(&labels, &[0.5, 0.5004]).is_ok());
}

#[test]
fn confidence_has_one_decimal() {
    assert_eq!(format_confidence(0.82), "82.0%");
    assert_eq!(format_confidence(0.8200000000000001), "82.0%");
    assert_eq!(format_confidence(0.12345), "12.3%");
    assert_eq!(format_confidence(1.0), "100.0%");
    assert_eq!(format_confidence(0.0), "0.0%");
}
