// tests/scoring_ranking.rs
//
// Score bounds, ranking monotonicity and cap on seeded random inputs,
// plus threshold pins.

mod common;

use common::article;
use esg_news_aggregator::analyze::{
    select, KeywordLists, Scorer, ENTERPRISE_GRADE_THRESHOLD, MIN_RELEVANCE_SCORE,
};
use esg_news_aggregator::ProviderId;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn vocab() -> Vec<String> {
    let k = KeywordLists::default();
    let mut v: Vec<String> = k.domain.into_iter().chain(k.high_value).chain(k.secondary).collect();
    v.extend(["weather", "football", "markets", "totally", "tax"].map(String::from));
    v
}

#[test]
fn composite_stays_in_unit_interval() {
    let scorer = Scorer::default();
    let words = vocab();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..300 {
        let n = rng.random_range(0..200);
        let body: Vec<&str> = (0..n).map(|_| words[rng.random_range(0..words.len())].as_str()).collect();
        let body = body.join(" ");
        let provider = ProviderId::ALL[rng.random_range(0..5)];
        let mut a = article(provider, "Headline", &body, "https://x.example");
        a.credibility = rng.random_range(-1.0..3.0);

        let s = scorer.score(a, "carbon tax petrochemical sabic emissions");
        for v in [s.relevance_score, s.domain_score, s.impact_score, s.composite_score] {
            assert!((0.0..=1.0).contains(&v), "out of range: {v}");
        }
        assert_eq!(s.enterprise_grade, s.composite_score > ENTERPRISE_GRADE_THRESHOLD);
    }
}

#[test]
fn select_is_sorted_capped_and_thresholded() {
    let scorer = Scorer::default();
    let words = vocab();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..100 {
        let n = rng.random_range(0..60);
        let scored: Vec<_> = (0..n)
            .map(|i| {
                let k = rng.random_range(0..6);
                let body: Vec<&str> = (0..k).map(|_| words[rng.random_range(0..words.len())].as_str()).collect();
                let mut a = article(ProviderId::ALL[i % 5], &format!("t{i}"), &body.join(" "), "");
                a.credibility = rng.random_range(0.0..1.0);
                scorer.score(a, "carbon tax")
            })
            .collect();
        let cap = rng.random_range(1..30);
        let out = select(scored, MIN_RELEVANCE_SCORE, cap);

        assert!(out.len() <= cap);
        assert!(out.iter().all(|a| a.composite_score > MIN_RELEVANCE_SCORE));
        assert!(out.windows(2).all(|w| w[0].composite_score >= w[1].composite_score));
    }
}

#[test]
fn current_threshold_pins() {
    assert_eq!(MIN_RELEVANCE_SCORE, 0.25);
    assert_eq!(ENTERPRISE_GRADE_THRESHOLD, 0.4);
}
