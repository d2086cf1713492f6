// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things). The parsed arguments are
// turned into a SpiderConfig, which is all the library needs.
// =============================================================================

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

use link_spider::crawl::{SpiderConfig, DEFAULT_USER_AGENT, DEFAULT_WORKERS};

#[derive(Parser, Debug)]
#[command(
    name = "link-spider",
    version,
    about = "Crawl a website, staying on its host and respecting robots.txt",
    long_about = "link-spider crawls a website depth-first, following only links on the same \
                  host (optionally its subdomains), never visiting a page twice and skipping \
                  anything the root host's robots.txt disallows for its user-agent. \
                  With --include-subdomains the root's robots.txt also governs subdomain pages."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and report every page visited
    ///
    /// Example: link-spider crawl https://example.com --max-pages 100
    Crawl(CrawlArgs),
}

#[derive(clap::Args, Debug)]
pub struct CrawlArgs {
    /// URL to start crawling from (e.g., https://example.com)
    pub root_url: String,

    /// Also crawl subdomains of the root host
    #[arg(long)]
    pub include_subdomains: bool,

    /// User-agent sent with requests and checked against robots.txt
    #[arg(long, env = "LINK_SPIDER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Number of concurrent fetch workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Stop after fetching this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Do not fetch or apply robots.txt
    #[arg(long)]
    pub ignore_robots: bool,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    pub fn to_config(&self) -> Result<SpiderConfig> {
        let mut config = SpiderConfig::new(&self.root_url)?;
        config.include_subdomains = self.include_subdomains;
        config.user_agent = self.user_agent.clone();
        config.workers = self.workers.max(1);
        config.max_pages = self.max_pages;
        config.timeout = Duration::from_secs(self.timeout_secs);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crawl_args() {
        let cli = Cli::parse_from([
            "link-spider",
            "crawl",
            "https://example.com",
            "--include-subdomains",
            "--workers",
            "8",
            "--max-pages",
            "50",
            "--json",
        ]);

        let Commands::Crawl(args) = cli.command;
        assert!(args.include_subdomains);
        assert!(args.json);
        assert!(!args.ignore_robots);

        let config = args.to_config().unwrap();
        assert_eq!(config.workers, 8);
        assert_eq!(config.max_pages, Some(50));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_root_is_an_error() {
        let cli = Cli::parse_from(["link-spider", "crawl", "not-a-url"]);
        let Commands::Crawl(args) = cli.command;
        assert!(args.to_config().is_err());
    }
}
