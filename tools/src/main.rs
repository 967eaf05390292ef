//! portfolio-runner: headless batch runner for the survey allocation pipeline.
//!
//! Usage:
//!   portfolio-runner --input survey_raw.csv --output final_portfolio.csv
//!   portfolio-runner --input survey_raw.csv --data-dir ./data
//!
//! Without --data-dir the built-in survey tables are used.

use anyhow::Result;
use portfolio_core::{
    config::PortfolioConfig,
    engine::{BatchReport, PortfolioEngine},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input = parse_arg(&args, "--input").unwrap_or("survey_raw.csv");
    let output = parse_arg(&args, "--output").unwrap_or("final_portfolio.csv");
    let data_dir = parse_arg(&args, "--data-dir");

    println!("portfolio-runner");
    println!("  input:     {input}");
    println!("  output:    {output}");
    println!("  data_dir:  {}", data_dir.unwrap_or("(built-in tables)"));
    println!();

    let config = match data_dir {
        Some(dir) => {
            log::info!("Loading tables from {dir}");
            PortfolioConfig::load(dir)?
        }
        None => PortfolioConfig::reference(),
    };
    let engine = PortfolioEngine::new(config)?;
    let report = engine.run_files(input, output)?;

    println!(" FINAL PORTFOLIO GENERATED SUCCESSFULLY");
    println!();
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!("=== RUN SUMMARY ===");
    println!("  run_id:            {}", report.run_id);
    println!("  rows read:         {}", report.rows_read);
    println!("  rejected (ingest): {}", report.rejected_at_ingest.len());
    println!("  respondents:       {}", report.respondents);
    println!("  unmapped labels:   {}", report.unmapped_labels);
    println!("  skipped (no rule): {}", report.missing_rule.len());
    println!("  rows written:      {}", report.rows_written);

    let skipped: Vec<_> = report.rejected_at_ingest.iter().chain(&report.missing_rule).collect();
    if !skipped.is_empty() {
        println!();
        println!("=== SKIPPED RESPONDENTS ===");
        for s in skipped {
            println!("  {}: {}", s.investor_id, s.reason);
        }
    }
}

fn parse_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
