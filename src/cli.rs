//! Command-line arguments
//!
//! Flags override values from the config file, which override defaults.

use crate::config::Config;
use crate::model::TimeDisplay;
use clap::Parser;
use std::path::PathBuf;

/// Terminal UI for managing Kargo cluster analysis templates
#[derive(Debug, Parser)]
#[command(name = "analysis-templates-tui", version, about)]
pub struct Cli {
    /// Kargo API base URL (e.g. https://kargo.example.com)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token for the Kargo API
    #[arg(long, env = "KARGO_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Rows per table page
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Show creation dates in local time instead of UTC
    #[arg(long)]
    pub local_time: bool,

    /// Use a built-in in-memory backend with sample templates
    #[arg(long)]
    pub demo: bool,

    /// Log file path
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write the effective configuration to the config file
    #[arg(long)]
    pub save_config: bool,
}

impl Cli {
    /// Layer the flags on top of `config`
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(ref url) = self.api_url {
            config.api_url = url.clone();
        }
        if let Some(ref token) = self.token {
            config.token = Some(token.clone());
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size.max(1);
        }
        if self.local_time {
            config.time_display = TimeDisplay::Local;
        }
        if let Some(ref path) = self.log_file {
            config.log_file = Some(path.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "analysis-templates-tui",
            "--api-url",
            "https://kargo.example.com",
            "--page-size",
            "0",
            "--local-time",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.api_url, "https://kargo.example.com");
        assert_eq!(config.page_size, 1);
        assert_eq!(config.time_display, TimeDisplay::Local);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let cli = Cli::parse_from(["analysis-templates-tui", "-vv", "--demo"]);
        let base = Config {
            page_size: 25,
            ..Config::default()
        };
        let config = cli.apply(base.clone());

        assert_eq!(config.page_size, 25);
        assert_eq!(config.api_url, base.api_url);
        assert_eq!(cli.verbose, 2);
        assert!(cli.demo);
    }
}
