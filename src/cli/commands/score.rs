//! Heuristic inspection.

use anyhow::Context;
use console::style;

use crate::config::Config;
use crate::extract::SourceLocation;

/// Print the score breakdown for `text`.
pub fn cmd_score(config: &Config, text: &str) -> anyhow::Result<()> {
    let heuristics = config.heuristics()?;
    let scorer = heuristics.scorer();
    let breakdown = scorer.breakdown(text);

    println!(
        "{}",
        serde_json::to_string_pretty(&breakdown).context("failed to serialize breakdown")?
    );

    let percentage = breakdown
        .percentage
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| "none".to_string());
    println!("\n{} {}", style("Percentage:").cyan(), percentage);
    println!(
        "{} {}",
        style("False positive:").cyan(),
        if breakdown.false_positive {
            style("yes").red()
        } else {
            style("no").green()
        }
    );

    for location in [SourceLocation::Heading, SourceLocation::ProductCard] {
        let threshold = scorer.policy().threshold(location);
        let verdict = if breakdown.total >= threshold {
            style("accepted").green()
        } else {
            style("rejected").red()
        };
        println!(
            "{} {} (score {} vs threshold {})",
            style(format!("As {}:", location.as_str())).cyan(),
            verdict,
            breakdown.total,
            threshold
        );
    }
    Ok(())
}
