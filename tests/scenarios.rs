//! End-to-end site crawls against synthetic pages.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{crawler, site, BrokenRenderer, FakeWeb};
use dealcrawl::fetch::Renderer;
use dealcrawl::SiteOutcome;

#[tokio::test(start_paused = true)]
async fn test_promo_heading_on_main_page() {
    let web = Arc::new(FakeWeb::default().page(
        "https://kauppa.example/",
        r#"<html><body>
            <nav><a href="/">Etusivu</a></nav>
            <h2 class="promo">Kesäale jopa -50%</h2>
            <p>Tervetuloa ostoksille.</p>
        </body></html>"#,
    ));
    let outcome = crawler(web, None)
        .crawl(&site("kauppa", "https://kauppa.example/"))
        .await;

    let deals = outcome.deals();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].site_id, "kauppa");
    assert!(deals[0].description.contains("Kesäale"));
    assert_eq!(deals[0].percentage.as_deref(), Some("50%"));
    assert_eq!(deals[0].url, "https://kauppa.example/");
}

#[tokio::test(start_paused = true)]
async fn test_terms_of_sale_link_is_ignored() {
    let web = Arc::new(FakeWeb::default().page(
        "https://kauppa.example/",
        r#"<footer><a href="/sale">Terms of Sale</a></footer>"#,
    ));
    let outcome = crawler(web.clone(), None)
        .crawl(&site("kauppa", "https://kauppa.example/"))
        .await;

    assert_eq!(outcome, SiteOutcome::Empty);
    assert_eq!(web.requested(), vec!["https://kauppa.example/".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_deal_found_on_discovered_outlet_page() {
    let web = Arc::new(
        FakeWeb::default()
            .page(
                "https://kauppa.example/",
                r#"<h1>Tervetuloa</h1><p>Uusi mallisto saapunut.</p><a href="/outlet">Outlet</a>"#,
            )
            .page(
                "https://kauppa.example/outlet",
                r#"<div class="promo-banner"><h2>Outlet jopa -40% kaikesta</h2></div>"#,
            ),
    );
    let outcome = crawler(web, None)
        .crawl(&site("kauppa", "https://kauppa.example/"))
        .await;

    let deals = outcome.deals();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].url, "https://kauppa.example/outlet");
    assert_eq!(deals[0].percentage.as_deref(), Some("40%"));
}

#[tokio::test(start_paused = true)]
async fn test_render_domain_falls_back_to_static_fetch() {
    let web = Arc::new(FakeWeb::default().page(
        "https://www.zara.com/fi/",
        r#"<h2 class="promo">Ale -30% valituista tuotteista</h2>"#,
    ));
    let renderer = Arc::new(BrokenRenderer::default());
    let crawler = crawler(web.clone(), Some(renderer.clone() as Arc<dyn Renderer>));

    let outcome = crawler.crawl(&site("zara", "https://www.zara.com/fi/")).await;

    assert_eq!(renderer.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(web.requested(), vec!["https://www.zara.com/fi/".to_string()]);
    assert_eq!(outcome.deals().len(), 1);
    assert_eq!(outcome.deals()[0].percentage.as_deref(), Some("30%"));
}

#[tokio::test(start_paused = true)]
async fn test_render_domain_without_engine() {
    let web = Arc::new(FakeWeb::default().page(
        "https://www.zara.com/fi/",
        r#"<h2 class="promo">Ale -30% valituista tuotteista</h2>"#,
    ));
    let outcome = crawler(web, None)
        .crawl(&site("zara", "https://www.zara.com/fi/"))
        .await;
    assert_eq!(outcome.deals().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unlisted_domain_skips_renderer() {
    let web = Arc::new(FakeWeb::default().page(
        "https://kauppa.example/",
        r#"<h2 class="promo">Kesäale jopa -50%</h2>"#,
    ));
    let renderer = Arc::new(BrokenRenderer::default());
    let outcome = crawler(web, Some(renderer.clone() as Arc<dyn Renderer>))
        .crawl(&site("kauppa", "https://kauppa.example/"))
        .await;

    assert_eq!(renderer.attempts.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.deals().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_site_reports_reason() {
    let web = Arc::new(FakeWeb::default());
    let outcome = crawler(web, None)
        .crawl(&site("kauppa", "https://kauppa.example/"))
        .await;
    match outcome {
        SiteOutcome::Failed { reason } => assert!(reason.contains("404")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_cookie_banner_and_legal_text_rejected() {
    let web = Arc::new(FakeWeb::default().page(
        "https://kauppa.example/",
        r#"<div class="cookie-banner promo">Käytämme evästeitä. Hyväksy evästeet saadaksesi -10% alennuksen</div>
           <h2>Toimitusehdot ja palautukset</h2>"#,
    ));
    let outcome = crawler(web, None)
        .crawl(&site("kauppa", "https://kauppa.example/"))
        .await;
    assert_eq!(outcome, SiteOutcome::Empty);
}
