// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading and resolution.
//!
//! The config file is JSON; every field has a default so a partial file is
//! valid. Secrets are never read from the file when the matching
//! environment variable is set.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "AUTOAPPLY_CONFIG";
/// Env var holding the Airtable personal access token.
pub const AIRTABLE_KEY_ENV: &str = "AIRTABLE_API_KEY";
/// Env var overriding the Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "AUTOAPPLY_CHROMIUM_PATH";

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: ApplicantProfile,
    pub browser: BrowserSettings,
    pub timeouts: Timeouts,
    pub flow: FlowSettings,
    pub provider: ProviderConfig,
    pub linkedin: LinkedInSettings,
    pub listing: ListingSettings,
    /// Result log location. Defaults to `~/.autoapply/applications.jsonl`.
    pub log_path: Option<PathBuf>,
}

/// Personal details typed into application forms.
///
/// Empty fields are never typed; the filler leaves such controls alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub website_url: String,
    pub expected_salary: String,
    pub years_experience: String,
    pub city: String,
    pub resume_path: PathBuf,
}

impl Default for ApplicantProfile {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            linkedin_url: String::new(),
            github_url: String::new(),
            website_url: String::new(),
            expected_salary: String::new(),
            years_experience: String::new(),
            city: String::new(),
            resume_path: PathBuf::from("resume.pdf"),
        }
    }
}

/// Browser launch options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Persistent profile directory (keeps session cookies between runs).
    pub user_data_dir: Option<PathBuf>,
    pub chromium_path: Option<PathBuf>,
    /// Extra command-line switches.
    pub args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: None,
            chromium_path: None,
            args: Vec::new(),
        }
    }
}

/// Wait budgets, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub navigation_ms: u64,
    /// Optional probes (autofill helper, confirmation dialogs).
    pub probe_ms: u64,
    /// The "Apply Now" control on an intermediate listing page.
    pub apply_button_ms: u64,
    /// The "Easy Apply" control on a LinkedIn job card.
    pub easy_apply_ms: u64,
    /// Wait for a new tab after clicking through.
    pub popup_ms: u64,
    /// Pause after navigation so late-rendered controls appear.
    pub settle_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 30_000,
            probe_ms: 5_000,
            apply_button_ms: 7_000,
            easy_apply_ms: 3_000,
            popup_ms: 5_000,
            settle_ms: 1_500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    /// Maximum advancing transitions in one multi-step wizard.
    pub max_steps: u32,
    /// Maximum submitted applications per run.
    pub max_applications: usize,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            max_steps: 10,
            max_applications: 10,
        }
    }
}

/// The applicant-tracking system whose forms the resolver looks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: String,
    /// Substring a resolved URL must contain.
    pub domain_marker: String,
    /// Substring of the application form's `action` attribute.
    pub apply_path: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "Greenhouse".to_string(),
            domain_marker: "greenhouse.io".to_string(),
            apply_path: "job_app".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Bare substring match of the domain marker against a URL.
    pub fn matches(&self, url: &str) -> bool {
        !self.domain_marker.is_empty() && url.contains(&self.domain_marker)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInSettings {
    pub search_url: String,
    pub location: String,
}

impl Default for LinkedInSettings {
    fn default() -> Self {
        Self {
            search_url: "https://www.linkedin.com/jobs/search/".to_string(),
            location: "United States".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSettings {
    pub remoteok_url: String,
    pub airtable: AirtableSettings,
    pub request_timeout_ms: u64,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            remoteok_url: "https://remoteok.com/api".to_string(),
            airtable: AirtableSettings::default(),
            request_timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirtableSettings {
    pub api_base: String,
    pub base_id: String,
    pub table_id: String,
    pub view: String,
    pub page_size: u32,
    /// Prefer the `AIRTABLE_API_KEY` env var.
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.airtable.com".to_string(),
            base_id: String::new(),
            table_id: String::new(),
            view: "Grid view".to_string(),
            page_size: 10,
            api_key: String::new(),
        }
    }
}

impl AppConfig {
    /// Load the configuration, returning it with the file it came from.
    ///
    /// Resolution order: explicit path, `AUTOAPPLY_CONFIG`, `./autoapply.json`,
    /// `~/.autoapply/config.json`, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = resolve_config_path(explicit);
        let mut config = match &path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok((config, path))
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config JSON: {}", path.display()))
    }

    /// Apply secret and path overrides from the environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(AIRTABLE_KEY_ENV) {
            if !key.trim().is_empty() {
                self.listing.airtable.api_key = key;
            }
        }
        if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
            if !p.trim().is_empty() {
                self.browser.chromium_path = Some(PathBuf::from(p));
            }
        }
    }

    /// The result log path, defaulting under the home directory.
    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| home_dir().join("applications.jsonl"))
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let cwd = PathBuf::from("autoapply.json");
    if cwd.exists() {
        return Some(cwd);
    }

    let home = home_dir().join("config.json");
    home.exists().then_some(home)
}

/// `~/.autoapply`, or `/tmp/.autoapply` when no home directory is known.
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".autoapply")
}
