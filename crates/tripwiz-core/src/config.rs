// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tripwiz_text::ScoringConfig;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:5173/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Page that share links point at.
    pub share_base_url: String,
    pub scoring: ScoringConfig,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl WizardConfig {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join(CONFIG_FILE_NAME)
    }

    /// Loads the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "[Config] No config file, using defaults: path={}",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: WizardConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("[Config] Loaded: path={}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        info!("[Config] Saved: path={}", path.display());
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Parsed share page URL. `None` (with a warning) when it does not parse.
    pub fn share_base(&self) -> Option<Url> {
        match Url::parse(self.share_base_url.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(
                    "[Config] Ignoring invalid share_base_url {:?}: {}",
                    self.share_base_url, e
                );
                None
            }
        }
    }
}
