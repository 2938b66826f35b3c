use super::*;
use rand_chacha::ChaCha8Rng;

#[tokio::test]
async fn flat_source_reproduces_base_curve() {
    let mut source = SyntheticSource::flat();
    for k in 1..=40 {
        let elapsed = 0.5 * k as f64;
        let value = source.measure(elapsed).await.expect("measure");
        assert_eq!(value, base_similarity(elapsed));
    }
}

#[tokio::test]
async fn perturbation_stays_within_amplitude() {
    let mut source = SyntheticSource::new(ChaCha8Rng::seed_from_u64(42), 5.0);
    let mut saw_below = false;
    let mut saw_above = false;
    for _ in 0..500 {
        let value = source.measure(2.0).await.expect("measure");
        let delta = value - base_similarity(2.0);
        assert!((-5.0..=5.0).contains(&delta), "delta {delta} out of range");
        saw_below |= delta < 0.0;
        saw_above |= delta > 0.0;
    }
    assert!(saw_below && saw_above);
}

#[tokio::test]
async fn seeded_sources_are_reproducible() {
    let mut first = SyntheticSource::seeded(7);
    let mut second = SyntheticSource::seeded(7);
    for k in 1..=10 {
        let elapsed = k as f64;
        assert_eq!(
            first.measure(elapsed).await.expect("first"),
            second.measure(elapsed).await.expect("second")
        );
    }
}

#[test]
fn negative_amplitude_is_treated_as_magnitude() {
    let source = SyntheticSource::seeded(1).with_amplitude(-12.0);
    assert_eq!(source.amplitude(), 12.0);
}
