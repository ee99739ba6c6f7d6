//! Configuration loading and management

use crate::core::query::TableView;
use crate::core::store::EntityResource;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::api_base`]
pub const API_BASE_ENV: &str = "RECORDS_API_BASE";

/// Environment variable overriding [`ClientConfig::timeout_secs`]
pub const TIMEOUT_ENV: &str = "RECORDS_TIMEOUT_SECS";

fn default_api_base() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    8
}

fn default_searchable_fields() -> Vec<String> {
    vec!["name".to_string()]
}

/// Configuration for one list view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Display label (e.g., "Supplier")
    pub singular: String,

    /// Collection path on the remote API (e.g., "suppliers");
    /// defaults to the lower-cased plural of `singular`
    #[serde(default)]
    pub entity: Option<String>,

    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Fields matched by the search box
    #[serde(default = "default_searchable_fields")]
    pub searchable_fields: Vec<String>,
}

impl ViewConfig {
    /// Collection path, derived from `singular` when not set
    pub fn entity_path(&self) -> String {
        match &self.entity {
            Some(entity) if !entity.trim().is_empty() => entity.trim_matches('/').to_string(),
            _ => pluralize(&self.singular.to_lowercase()),
        }
    }

    pub fn resource(&self) -> EntityResource {
        EntityResource::new(self.entity_path(), self.singular.clone())
    }

    pub fn table_view(&self) -> TableView {
        TableView::new(self.page_size, self.searchable_fields.iter().cloned())
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the remote entity API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout enforced by the HTTP transport
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// List views
    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply `RECORDS_API_BASE` / `RECORDS_TIMEOUT_SECS` if set
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(base) = lookup(API_BASE_ENV).filter(|b| !b.trim().is_empty()) {
            self.api_base = base;
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", TIMEOUT_ENV))?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Find a view by entity path or singular label (case-insensitive)
    pub fn view(&self, name: &str) -> Option<&ViewConfig> {
        self.views.iter().find(|v| {
            v.entity_path().eq_ignore_ascii_case(name) || v.singular.eq_ignore_ascii_case(name)
        })
    }

    /// Suppliers and debtors, as the dashboard ships them
    pub fn default_config() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            views: vec![
                ViewConfig {
                    singular: "Supplier".to_string(),
                    entity: Some("suppliers".to_string()),
                    page_size: 8,
                    searchable_fields: vec![
                        "name".to_string(),
                        "contact".to_string(),
                        "phone".to_string(),
                    ],
                },
                ViewConfig {
                    singular: "Debtor".to_string(),
                    entity: Some("debtors".to_string()),
                    page_size: 5,
                    searchable_fields: vec!["name".to_string()],
                },
            ],
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// English plural of a lower-case noun, enough for entity path names
fn pluralize(singular: &str) -> String {
    const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

    if singular.is_empty() {
        return String::new();
    }

    let before_last = singular.chars().rev().nth(1);
    if let Some(stem) = singular.strip_suffix('y') {
        if before_last.is_some_and(|c| !VOWELS.contains(&c)) {
            return format!("{}ies", stem);
        }
    }

    if ["s", "sh", "ch", "x", "z"].iter().any(|s| singular.ends_with(s)) {
        return format!("{}es", singular);
    }

    format!("{}s", singular)
}
