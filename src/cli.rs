//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use geoip2_update::{ConfigError, UpdaterConfig};

/// Keep local GeoIP2 / GeoLite2 databases up to date.
///
/// Checks every configured edition against the download service and only
/// downloads editions whose remote version changed since the last run.
#[derive(Parser, Debug)]
#[command(name = "geoip2-update")]
#[command(author, version, about)]
pub struct Args {
    /// JSON configuration file (`license_key`, `dir`, `editions`, `tmp_dir`, `base_url`)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// License key for the download service
    #[arg(long, env = "GEOIP2_LICENSE_KEY", hide_env_values = true)]
    pub license_key: Option<String>,

    /// Destination directory holding one sub-directory per edition
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Directory for downloaded archives and extraction (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub tmp_dir: Option<PathBuf>,

    /// Edition to update (repeatable, replaces the configured list)
    #[arg(long = "edition", value_name = "ID")]
    pub editions: Vec<String>,

    /// Download endpoint override
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Disable download progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Loads the configuration file, if any, then applies flag overrides.
    pub fn build_config(&self) -> Result<UpdaterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => UpdaterConfig::from_file(path)?,
            None => UpdaterConfig::new("", ""),
        };

        if let Some(license_key) = &self.license_key {
            config.license_key.clone_from(license_key);
        }
        if let Some(dir) = &self.dir {
            config.dir.clone_from(dir);
        }
        if let Some(tmp_dir) = &self.tmp_dir {
            config.tmp_dir = Some(tmp_dir.clone());
        }
        if !self.editions.is_empty() {
            config = config.with_editions(self.editions.iter().cloned());
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }

        Ok(config)
    }
}
