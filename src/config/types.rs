use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::roster::{DEFAULT_PASSCODE, DEFAULT_STAFF};
use crate::notification::{DEFAULT_CC_ADDRESS, DEFAULT_HISTORY_LIMIT};
use crate::translation::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::translation::DEFAULT_TARGET_LANGUAGE;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub desk: DeskConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
}

/// Where the durable records live
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".fixdesk")
}

/// Resolution notices
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Copied on every resolution notice
    #[serde(default = "default_cc_address")]
    pub cc_address: String,
    /// How many recent notices are kept for display
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            cc_address: default_cc_address(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_cc_address() -> String {
    DEFAULT_CC_ADDRESS.to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Values a desk starts with before anything has been stored
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeskConfig {
    #[serde(default = "default_passcode")]
    pub default_passcode: String,
    #[serde(default = "default_roster")]
    pub default_roster: Vec<String>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            default_passcode: default_passcode(),
            default_roster: default_roster(),
        }
    }
}

fn default_passcode() -> String {
    DEFAULT_PASSCODE.to_string()
}

fn default_roster() -> Vec<String> {
    DEFAULT_STAFF.iter().map(|s| s.to_string()).collect()
}

/// Translation service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TranslationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: default_model(),
            api_base: default_api_base(),
            target_language: default_target_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
