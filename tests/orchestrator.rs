//! Batching, pacing and per-site isolation of a full run.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{crawler, crawler_with, site, BrokenRenderer, FakeWeb};
use dealcrawl::config::{Config, CrawlConfig};
use dealcrawl::fetch::Renderer;
use dealcrawl::models::Site;
use dealcrawl::{run_crawl, CatalogError, CrawlError, CrawlOrchestrator, SiteOutcome};

const PROMO: &str = r#"<h2 class="promo">Kesäale jopa -50%</h2>"#;

fn shops(count: usize) -> (Vec<Site>, FakeWeb) {
    let mut web = FakeWeb::default();
    let mut sites = Vec::new();
    for i in 0..count {
        let url = format!("https://shop{i}.example/");
        web = web.page(&url, "<p>Uusi mallisto saapunut.</p>");
        sites.push(site(&format!("shop{i}"), &url));
    }
    (sites, web)
}

#[tokio::test(start_paused = true)]
async fn test_failing_sites_do_not_affect_siblings() {
    let web = Arc::new(
        FakeWeb::default()
            .page("https://hyva.example/", PROMO)
            .panics_on("rikki.example")
            .hangs_on("jumissa.example"),
    );
    let sites = vec![
        site("rikki", "https://rikki.example/"),
        site("hyva", "https://hyva.example/"),
        site("jumissa", "https://jumissa.example/"),
        site("poissa", "https://poissa.example/"),
    ];

    let report = CrawlOrchestrator::new(crawler(web, None)).run(&sites).await;

    let ids: Vec<&str> = report.outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["rikki", "hyva", "jumissa", "poissa"]);
    assert_eq!(report.count("deals"), 1);
    assert_eq!(report.count("failed"), 3);
    assert!(report.outcome("rikki").is_some_and(SiteOutcome::is_failed));
    match report.outcome("jumissa") {
        Some(SiteOutcome::Failed { reason }) => assert!(reason.contains("timed out")),
        other => panic!("expected timeout, got {other:?}"),
    }

    assert_eq!(report.result.deals.len(), 1);
    assert_eq!(report.result.deals[0].site_id, "hyva");
}

#[tokio::test(start_paused = true)]
async fn test_static_batches_are_bounded_and_paced() {
    let (sites, web) = shops(7);
    let web = Arc::new(web.latency(Duration::from_millis(100)));
    let orchestrator = CrawlOrchestrator::new(crawler(web.clone(), None));

    let start = tokio::time::Instant::now();
    let report = orchestrator.run(&sites).await;
    let elapsed = start.elapsed();

    assert_eq!(report.count("empty"), 7);
    assert_eq!(web.max_in_flight(), 5);
    // two batches of fetches plus one pause between them
    assert!(elapsed >= Duration::from_millis(1200), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1300), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_rendering_runs_use_smaller_batches() {
    let (sites, web) = shops(7);
    let web = Arc::new(web.latency(Duration::from_millis(100)));
    let renderer = Arc::new(BrokenRenderer::default());
    let orchestrator = CrawlOrchestrator::new(crawler(
        web.clone(),
        Some(renderer.clone() as Arc<dyn Renderer>),
    ));

    let start = tokio::time::Instant::now();
    orchestrator.run(&sites).await;
    let elapsed = start.elapsed();
    orchestrator.close().await;

    assert_eq!(web.max_in_flight(), 3);
    // three batches, two pauses
    assert!(elapsed >= Duration::from_millis(2300), "elapsed {elapsed:?}");
    assert_eq!(renderer.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_result_orders_percentages_first_across_sites() {
    let web = Arc::new(
        FakeWeb::default()
            .page(
                "https://eka.example/",
                r#"<h2 class="campaign">Uudet kevään kampanjat ovat täällä</h2>"#,
            )
            .page("https://toka.example/", PROMO),
    );
    let sites = vec![
        site("eka", "https://eka.example/"),
        site("toka", "https://toka.example/"),
    ];
    let config = CrawlConfig {
        batch_size_static: 1,
        ..CrawlConfig::default()
    };

    let result = CrawlOrchestrator::new(crawler_with(web, None, config))
        .run(&sites)
        .await
        .result;

    let ids: Vec<&str> = result.deals.iter().map(|d| d.site_id.as_str()).collect();
    assert_eq!(ids, vec!["toka", "eka"]);
    assert!(result.deals[0].has_percentage());
}

#[tokio::test]
async fn test_missing_catalog_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("stores.json");

    let err = run_crawl(&missing, &Config::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::Catalog(CatalogError::Io { .. })));
}

#[tokio::test]
async fn test_malformed_catalog_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stores.json");
    std::fs::write(&path, r#"{"id": "not-a-list"}"#).unwrap();

    let err = run_crawl(&path, &Config::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::Catalog(CatalogError::Parse { .. })));
}
