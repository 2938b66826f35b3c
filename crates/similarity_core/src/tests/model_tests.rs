use super::*;

#[test]
fn base_curve_rises_then_saturates() {
    assert_eq!(base_similarity(0.0), 40.0);
    assert_eq!(base_similarity(0.5), 42.5);
    assert_eq!(base_similarity(1.0), 45.0);
    assert_eq!(base_similarity(11.0), 95.0);
    assert_eq!(base_similarity(20.0), 95.0);
}

#[test]
fn clamp_keeps_values_in_percentage_range() {
    assert_eq!(clamp_similarity(-3.0), Some(0.0));
    assert_eq!(clamp_similarity(57.25), Some(57.25));
    assert_eq!(clamp_similarity(140.0), Some(100.0));
    assert_eq!(clamp_similarity(f64::INFINITY), Some(100.0));
    assert_eq!(clamp_similarity(f64::NAN), None);
}

#[test]
fn verdict_waits_for_a_positive_measurement() {
    assert_eq!(Verdict::from_similarity(0.0, 75.0), None);
    assert_eq!(Verdict::from_similarity(74.99, 75.0), Some(Verdict::Fail));
    assert_eq!(Verdict::from_similarity(75.0, 75.0), Some(Verdict::Pass));
    assert_eq!(Verdict::from_similarity(60.0, 55.0), Some(Verdict::Pass));
    assert_eq!(Verdict::Pass.label(), "PASS");
}

#[test]
fn bands_split_at_fifty_and_seventy_five() {
    let threshold = DEFAULT_PASS_THRESHOLD;
    assert_eq!(SimilarityBand::of(0.0, threshold), SimilarityBand::Low);
    assert_eq!(SimilarityBand::of(49.9, threshold), SimilarityBand::Low);
    assert_eq!(SimilarityBand::of(50.0, threshold), SimilarityBand::Medium);
    assert_eq!(SimilarityBand::of(74.9, threshold), SimilarityBand::Medium);
    assert_eq!(SimilarityBand::of(75.0, threshold), SimilarityBand::High);
}

#[test]
fn high_band_follows_a_custom_pass_threshold() {
    for similarity in [40.0, 45.0, 60.0, 90.0] {
        let passes = Verdict::from_similarity(similarity, 40.0) == Some(Verdict::Pass);
        assert!(passes);
        assert_eq!(SimilarityBand::of(similarity, 40.0), SimilarityBand::High);
    }
    assert_eq!(SimilarityBand::of(39.0, 40.0), SimilarityBand::Low);
    assert_eq!(SimilarityBand::of(80.0, 90.0), SimilarityBand::Medium);
}
