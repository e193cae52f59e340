use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::DEFAULT_TOLERANCE;
use tally_ingest::assembler::DEFAULT_OUTLIER_MULTIPLIER;
use tally_ingest::{DateOrder, ExtractOptions, ParseOptions};

use crate::state::{ensure_tally_home, tally_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractOptions,
    pub parse: ParseSection,
    pub reconcile: ReconcileSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSection {
    /// "MD" or "DM"
    pub date_order: DateOrder,
    pub outlier_multiplier: f64,
}

impl Default for ParseSection {
    fn default() -> Self {
        Self {
            date_order: DateOrder::MonthFirst,
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSection {
    pub tolerance: f64,
}

impl Default for ReconcileSection {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// off, error, warn, info, debug, trace
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            extract: self.extract.clone(),
            date_order: self.parse.date_order,
            outlier_multiplier: self.parse.outlier_multiplier,
        }
    }

    /// Configured level, raised by each `-v`
    pub fn log_level(&self, verbose: u8) -> LevelFilter {
        let configured = self.log.level.parse().unwrap_or(LevelFilter::Warn);
        let requested = match verbose {
            0 => LevelFilter::Off,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        configured.max(requested)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("config.toml"))
}

/// Load the config at `path` (or the default location). A missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Write `cfg` to `path`, or to the default location under the tally home.
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf> {
    let p = match path {
        Some(p) => {
            if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            }
            p.to_path_buf()
        }
        None => ensure_tally_home()?.join("config.toml"),
    };
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

/// Write a default config unless one already exists. Returns the path and whether it was written.
pub fn init_config(path: Option<&Path>) -> Result<(PathBuf, bool)> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        return Ok((p, false));
    }
    let written = save_config(&Config::default(), path)?;
    Ok((written, true))
}
