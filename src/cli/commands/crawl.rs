//! Crawl commands.

use std::path::Path;

use anyhow::Context;
use console::style;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::crawler::{build_crawler, run_crawl, CrawlReport, SiteOutcome};
use crate::models::Deal;

use super::helpers::{truncate, write_json};

/// Crawl the whole catalog and write the result.
pub async fn cmd_crawl(
    config: &Config,
    catalog: &Path,
    output: Option<&Path>,
    allow_rendering: bool,
) -> anyhow::Result<()> {
    let report = run_crawl(catalog, config, allow_rendering)
        .await
        .with_context(|| format!("crawl of {} could not start", catalog.display()))?;

    write_json(&report.result, output).await?;
    print_summary(&report, output);
    Ok(())
}

/// Crawl one site and print what it yields.
pub async fn cmd_site(
    config: &Config,
    catalog: &Path,
    id: &str,
    allow_rendering: bool,
) -> anyhow::Result<()> {
    let catalog = Catalog::from_path(catalog)?;
    let Some(site) = catalog.get(id) else {
        anyhow::bail!("no site '{}' in catalog", id);
    };

    let crawler = build_crawler(config, allow_rendering).await?;
    let outcome = crawler.crawl(site).await;
    crawler.fetcher().close().await;

    println!(
        "\n{} ({}) {}",
        style(&site.name).bold(),
        site.category.as_str(),
        style(&site.url).dim()
    );
    match &outcome {
        SiteOutcome::Deals(deals) => print_deals(deals),
        SiteOutcome::Empty => println!("{} No deals found", style("!").yellow()),
        SiteOutcome::Failed { reason } => {
            println!("{} Crawl failed: {}", style("✗").red(), reason)
        }
    }
    Ok(())
}

fn print_deals(deals: &[Deal]) {
    println!("{}", "-".repeat(80));
    println!("{:<6} {:<45} URL", "%", "Description");
    println!("{}", "-".repeat(80));
    for deal in deals {
        println!(
            "{:<6} {:<45} {}",
            deal.percentage.as_deref().unwrap_or("-"),
            truncate(&deal.description, 44),
            deal.url
        );
    }
}

/// Run summary on stderr so stdout stays valid JSON.
fn print_summary(report: &CrawlReport, output: Option<&Path>) {
    eprintln!(
        "\n{} Found {} deals across {} sites",
        style("✓").green(),
        style(report.result.deals.len()).bold(),
        report.outcomes.len()
    );
    eprintln!(
        "  Last crawled: {}",
        report.result.last_crawled.format("%Y-%m-%d %H:%M:%S UTC")
    );
    eprintln!(
        "  Sites: {} with deals, {} empty, {} failed",
        report.count("deals"),
        report.count("empty"),
        report.count("failed")
    );
    for (id, reason) in report.failures() {
        eprintln!("  {} {}: {}", style("✗").red(), id, style(reason).dim());
    }
    if let Some(path) = output {
        eprintln!("  Written to {}", path.display());
    }
}
