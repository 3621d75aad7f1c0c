// tests/aggregate_fanout.rs
//
// Coordinator behaviour with in-memory providers:
// - partial failure tolerance
// - total failure → AllProvidersFailed
// - cross-provider near-duplicate (first-seen wins)
// - empty topic never reaches a provider
// - per-provider timeout and panics are contained

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{article, FailingProvider, PanickingProvider, SlowProvider, StaticProvider};
use esg_news_aggregator::analyze::{Scorer, MIN_RELEVANCE_SCORE};
use esg_news_aggregator::{
    AggregateError, AggregateOptions, Aggregator, ArticleProvider, ProviderId, QueryContext,
    QuotaTracker,
};

fn aggregator(providers: Vec<Arc<dyn ArticleProvider>>) -> Aggregator {
    Aggregator::new(providers, Arc::new(QuotaTracker::new()), Scorer::default())
}

#[tokio::test]
async fn partial_failure_keeps_successful_providers() {
    let guardian = StaticProvider::new(
        ProviderId::Guardian,
        vec![
            article(ProviderId::Guardian, "Carbon tax hits petrochemical margins", "esg pressure", "https://g.example/1"),
            article(ProviderId::Guardian, "Polymer makers weigh carbon border levy", "cbam", "https://g.example/2"),
        ],
    );
    let gnews = StaticProvider::new(
        ProviderId::GNews,
        vec![article(ProviderId::GNews, "Borouge expands polyethylene output", "chemical industry", "https://gn.example/1")],
    );
    let failing: Vec<Arc<FailingProvider>> = [ProviderId::Nyt, ProviderId::NewsApi, ProviderId::NewsData]
        .into_iter()
        .map(|id| Arc::new(FailingProvider::new(id)))
        .collect();

    let mut providers: Vec<Arc<dyn ArticleProvider>> = vec![Arc::new(guardian)];
    providers.push(failing[0].clone());
    providers.push(failing[1].clone());
    providers.push(Arc::new(gnews));
    providers.push(failing[2].clone());

    let agg = aggregator(providers);
    let ctx = QueryContext::new("carbon tax petrochemical", 18, 25).unwrap();
    let res = agg.aggregate(&ctx).await.expect("partial failure must succeed");

    assert!(!res.articles.is_empty());
    assert!(res
        .articles
        .iter()
        .all(|a| matches!(a.article.provider, ProviderId::Guardian | ProviderId::GNews)));
    for f in &failing {
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    assert_eq!(res.provider_results.len(), 5);
    let errs = res.provider_results.iter().filter(|p| p.error.is_some()).count();
    assert_eq!(errs, 3);
    assert_eq!(res.stats.total_providers_configured, 5);
    assert_eq!(res.stats.raw_count, 3);
    assert!(!res.stats.meets_target);
    // configured order is preserved in the summaries
    let order: Vec<ProviderId> = res.provider_results.iter().map(|p| p.provider).collect();
    assert_eq!(
        order,
        vec![ProviderId::Guardian, ProviderId::Nyt, ProviderId::NewsApi, ProviderId::GNews, ProviderId::NewsData]
    );
}

#[tokio::test]
async fn all_failed_is_a_single_error() {
    let providers: Vec<Arc<dyn ArticleProvider>> = ProviderId::ALL
        .into_iter()
        .map(|id| Arc::new(FailingProvider::new(id)) as Arc<dyn ArticleProvider>)
        .collect();
    let agg = aggregator(providers);

    let err = agg
        .aggregate_topic("carbon tax", AggregateOptions::default())
        .await
        .unwrap_err();
    match err {
        AggregateError::AllProvidersFailed(failures) => {
            assert_eq!(failures.len(), 5);
            assert!(failures.iter().all(|f| f.kind == "provider_unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_successes_are_not_total_failure() {
    let providers: Vec<Arc<dyn ArticleProvider>> = vec![
        Arc::new(FailingProvider::new(ProviderId::Guardian)),
        Arc::new(StaticProvider::new(ProviderId::Nyt, Vec::new())),
    ];
    let res = aggregator(providers)
        .aggregate_topic("esg", AggregateOptions::default())
        .await
        .expect("one provider succeeded with zero articles");
    assert!(res.articles.is_empty());
    assert_eq!(res.stats.final_count, 0);
    assert_eq!(res.stats.quality_score, 0.0);
}

#[tokio::test]
async fn sabic_near_duplicate_across_providers_keeps_first_seen() {
    let title_a = "SABIC carbon tax pressure grows on gulf petrochemical exporters as eu border levy nears";
    let title_b = "SABIC carbon tax pressure grows on gulf petrochemical exporters as eu border levy nears analysts";

    let mut sabic = article(ProviderId::Guardian, title_a, "Producers brace for the levy", "https://g.example/sabic");
    sabic.credibility = 0.9;
    let guardian = StaticProvider::new(
        ProviderId::Guardian,
        vec![
            article(ProviderId::Guardian, "Weather in London", "rain", "https://g.example/w"),
            sabic.clone(),
            article(ProviderId::Guardian, "Petrochemical sector carbon disclosure rules", "esg governance", "https://g.example/d"),
        ],
    );
    let nyt = StaticProvider::new(
        ProviderId::Nyt,
        vec![article(ProviderId::Nyt, title_b, "Producers brace for the levy", "https://nyt.example/other-url")],
    );

    let agg = aggregator(vec![Arc::new(guardian), Arc::new(nyt)]);
    let topic = "carbon tax petrochemical";
    let res = agg
        .aggregate(&QueryContext::new(topic, 18, 25).unwrap())
        .await
        .unwrap();

    let sabics: Vec<_> = res
        .articles
        .iter()
        .filter(|a| a.article.title.contains("SABIC"))
        .collect();
    assert_eq!(sabics.len(), 1);
    assert_eq!(sabics[0].article.provider, ProviderId::Guardian);
    assert_eq!(sabics[0].article.url, "https://g.example/sabic");

    let expected = Scorer::default().score(sabic, topic).composite_score;
    assert!((sabics[0].composite_score - expected).abs() < 1e-6);
    assert!(res.articles.iter().all(|a| a.composite_score > MIN_RELEVANCE_SCORE));
}

#[tokio::test]
async fn empty_topic_invokes_no_provider() {
    let p = Arc::new(StaticProvider::new(ProviderId::Guardian, Vec::new()));
    let calls = Arc::clone(&p.calls);
    let agg = aggregator(vec![p]);

    let err = agg
        .aggregate_topic("   ", AggregateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AggregateError::InvalidQuery(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cap_and_target_come_from_options() {
    let many: Vec<_> = (0..10)
        .map(|i| {
            article(
                ProviderId::Guardian,
                &format!("Story {i} about carbon tax in region {i}"),
                "petrochemical esg",
                &format!("https://g.example/{i}"),
            )
        })
        .collect();
    let agg = aggregator(vec![Arc::new(StaticProvider::new(ProviderId::Guardian, many))]);
    let res = agg
        .aggregate_topic(
            "carbon tax",
            AggregateOptions {
                target_count: Some(3),
                max_count: Some(4),
            },
        )
        .await
        .unwrap();
    assert_eq!(res.articles.len(), 4);
    assert!(res.stats.meets_target);
    assert!(res
        .articles
        .windows(2)
        .all(|w| w[0].composite_score >= w[1].composite_score));
}

#[tokio::test(start_paused = true)]
async fn timed_out_provider_is_unavailable_and_siblings_survive() {
    let slow = SlowProvider {
        id: ProviderId::NewsData,
        delay: Duration::from_secs(60),
        limit: Duration::from_secs(2),
    };
    let ok = StaticProvider::new(
        ProviderId::Guardian,
        vec![article(ProviderId::Guardian, "Carbon tax news", "esg", "https://g.example/1")],
    );
    let agg = aggregator(vec![Arc::new(ok), Arc::new(slow)]);
    let res = agg
        .aggregate_topic("carbon tax", AggregateOptions::default())
        .await
        .unwrap();

    let slow_summary = res
        .provider_results
        .iter()
        .find(|p| p.provider == ProviderId::NewsData)
        .unwrap();
    let msg = slow_summary.error.as_deref().unwrap();
    assert!(msg.contains("timed out"), "{msg}");
    assert_eq!(res.articles.len(), 1);
}

#[tokio::test]
async fn panicking_provider_is_contained() {
    let ok = StaticProvider::new(
        ProviderId::Nyt,
        vec![article(ProviderId::Nyt, "Carbon tax news", "esg", "https://n.example/1")],
    );
    let agg = aggregator(vec![Arc::new(PanickingProvider(ProviderId::GNews)), Arc::new(ok)]);
    let res = agg
        .aggregate_topic("carbon tax", AggregateOptions::default())
        .await
        .unwrap();
    assert!(res.provider_results[0].error.is_some());
    assert_eq!(res.articles.len(), 1);
}
