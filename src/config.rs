// src/config.rs
use crate::orderbook::TOP_DEPTH;
use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: General,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct General {
    pub json_logs: bool, // structured JSON logs to stdout
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Write top-of-book snapshots to stdout as they are emitted. Turning
    /// this off keeps the counters but silences output for timing runs.
    pub print: bool,
    /// Levels per side shown in rendered snapshots. The engine tracks ten;
    /// rendering may show fewer.
    pub depth: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            print: true,
            depth: TOP_DEPTH,
        }
    }
}

impl AppConfig {
    pub fn from_file(p: &Path) -> anyhow::Result<Self> {
        let s = fs::read_to_string(p).with_context(|| format!("read config {}", p.display()))?;
        let cfg: AppConfig = toml::from_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.snapshot.depth == 0 || self.snapshot.depth > TOP_DEPTH {
            anyhow::bail!("snapshot.depth must be in [1, {TOP_DEPTH}]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_sections() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert!(!cfg.general.json_logs);
        assert!(cfg.snapshot.print);
        assert_eq!(cfg.snapshot.depth, TOP_DEPTH);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_overrides() {
        let cfg: AppConfig = toml::from_str(
            "[general]\njson_logs = true\n\n[snapshot]\nprint = false\ndepth = 5\n",
        )
        .unwrap();
        assert!(cfg.general.json_logs);
        assert!(!cfg.snapshot.print);
        assert_eq!(cfg.snapshot.depth, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_depth() {
        let cfg: AppConfig = toml::from_str("[snapshot]\ndepth = 0\n").unwrap();
        assert!(cfg.validate().is_err());
        let cfg: AppConfig = toml::from_str("[snapshot]\ndepth = 11\n").unwrap();
        assert!(cfg.validate().is_err());
    }
}
