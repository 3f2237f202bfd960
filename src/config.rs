// ABOUTME: Resolved runtime settings built from flags and environment
// ABOUTME: Decides export platform, backend endpoint and local paths

use crate::cli::{Cli, PlatformChoice};
use crate::platform::Platform;
use crate::storage::Paths;
use crate::Result;

pub struct Settings {
    pub api_base: String,
    pub anon_key: String,
    pub platform: Platform,
    pub paths: Paths,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Settings {
            api_base: cli.api_base.clone(),
            anon_key: cli.anon_key.clone().unwrap_or_default(),
            platform: resolve_platform(cli.platform, cli.user_agent.as_deref()),
            paths: Paths::new(cli.download_dir.clone())?,
        })
    }
}

pub fn resolve_platform(choice: PlatformChoice, user_agent: Option<&str>) -> Platform {
    match choice {
        PlatformChoice::Limited => Platform::Limited,
        PlatformChoice::Standard => Platform::Standard,
        PlatformChoice::Auto => user_agent
            .map(Platform::from_user_agent)
            .unwrap_or_else(Platform::current),
    }
}

/// Default log filter for a `-v` count; `RUST_LOG` takes precedence.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
