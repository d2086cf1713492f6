// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, to stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Run the crawl
// 4. Print the report and exit with a proper code
//    (0 = every page OK, 1 = some pages failed, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CrawlArgs};
use link_spider::{CrawlResult, PageStatus, Spider};

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays clean
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link_spider=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => handle_crawl(&args).await,
    }
}

async fn handle_crawl(args: &CrawlArgs) -> Result<i32> {
    let config = args.to_config()?;
    let spider = Spider::new(config).context("could not set up the crawler")?;

    let results = if args.ignore_robots {
        spider.crawl(None).await
    } else {
        spider.run().await
    };

    print_results(&results, args.json)?;

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    Ok(if failed > 0 { 1 } else { 0 })
}

fn print_results(results: &[CrawlResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_table(results);
    }
    Ok(())
}

fn print_table(results: &[CrawlResult]) {
    println!("{:<60} {:<15} {:>7} {:>9}", "URL", "STATUS", "LINKS", "ADMITTED");
    println!("{}", "=".repeat(94));

    for result in results {
        let url_display = if result.url.chars().count() > 57 {
            format!("{}...", result.url.chars().take(57).collect::<String>())
        } else {
            result.url.clone()
        };

        println!(
            "{:<60} {:<15} {:>7} {:>9}",
            url_display,
            format_status(&result.status),
            result.links_found,
            result.links_admitted
        );
    }

    println!();

    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    println!("📊 Summary:");
    println!("   ✅ OK: {}", ok_count);
    println!("   ❌ Failed: {}", results.len() - ok_count);
    println!("   📋 Pages crawled: {}", results.len());
}

fn format_status(status: &PageStatus) -> &'static str {
    match status {
        PageStatus::Ok => "✅ OK",
        PageStatus::Redirect(_) => "🔀 REDIRECT",
        PageStatus::Broken => "❌ BROKEN",
        PageStatus::Timeout => "⏱️  TIMEOUT",
        PageStatus::SslError => "🔒 SSL ERROR",
        PageStatus::TooManyRedirects => "🔁 REDIRECT LOOP",
        PageStatus::DnsError => "🌐 DNS ERROR",
        PageStatus::Error => "⚠️  ERROR",
    }
}
